//! Application configuration
//!
//! Every section deserialises with defaults, so a config file only needs the
//! fields it overrides. The file is named by the `VERDANT_CONFIG` environment
//! variable; without it the defaults are used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::config::GrassConfig;

/// Environment variable naming the JSON config file
pub const CONFIG_ENV: &str = "VERDANT_CONFIG";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub grass: GrassConfig,
    pub ground: GroundConfig,
    pub shader_dir: ShaderDir,
    pub clear_color: ClearColor,
}

/// Directory holding the `*.wgsl` stage files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShaderDir(pub PathBuf);

impl Default for ShaderDir {
    fn default() -> Self {
        Self(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")))
    }
}

impl ShaderDir {
    /// Path of a stage file inside the directory
    pub fn join(&self, file: &str) -> PathBuf {
        self.0.join(file)
    }
}

/// Framebuffer clear color (linear RGBA)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClearColor(pub [f32; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        Self([0.2, 0.3, 0.3, 1.0])
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Grass Renderer".to_string(),
            width: 1920,
            height: 1080,
            vsync: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees; -90 looks down -Z
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    /// Initial vertical field of view in degrees
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub pitch_limit: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 6.0],
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
            zoom_min: 1.0,
            zoom_max: 45.0,
            pitch_limit: 89.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Image file for the ground; a procedural texture is used when absent
    pub texture: Option<PathBuf>,
    /// Uniform scale of the model matrix shared by ground and grass
    pub scale: f32,
    /// Texture repeats across the quad
    pub uv_scale: f32,
    /// Multiplied into the sampled color
    pub tint: [f32; 3],
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            texture: None,
            scale: 2.0,
            uv_scale: 1.0,
            tint: [1.0, 1.0, 1.0],
        }
    }
}

impl AppConfig {
    /// Load from the file named by [`CONFIG_ENV`], or defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                log::info!("Loading config from {}", Path::new(&path).display());
                Self::load(Path::new(&path))
            }
            None => {
                log::info!("{CONFIG_ENV} not set, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Parse and validate JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        if !(cam.near.is_finite() && cam.near > 0.0) {
            return Err(Error::Config(format!("camera near must be positive, got {}", cam.near)));
        }
        if !(cam.far.is_finite() && cam.far > cam.near) {
            return Err(Error::Config(format!(
                "camera far ({}) must exceed near ({})",
                cam.far, cam.near
            )));
        }
        if !(cam.zoom_min > 0.0 && cam.zoom_min <= cam.zoom_max && cam.zoom_max < 180.0) {
            return Err(Error::Config(format!(
                "camera zoom range [{}, {}] is invalid",
                cam.zoom_min, cam.zoom_max
            )));
        }
        if !(cam.pitch_limit > 0.0 && cam.pitch_limit < 90.0) {
            return Err(Error::Config(format!(
                "camera pitch_limit must be in (0, 90), got {}",
                cam.pitch_limit
            )));
        }
        if !(cam.speed >= 0.0 && cam.sensitivity >= 0.0) {
            return Err(Error::Config("camera speed and sensitivity must be non-negative".into()));
        }
        if !(self.ground.scale.is_finite() && self.ground.scale > 0.0) {
            return Err(Error::Config(format!("ground scale must be positive, got {}", self.ground.scale)));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config("window size must be non-zero".into()));
        }
        self.grass.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grass::config::{BladeSource, TessellationMode};
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.window.title, "Grass Renderer");
        assert_eq!((config.window.width, config.window.height), (1920, 1080));
        assert_eq!(config.clear_color.0, [0.2, 0.3, 0.3, 1.0]);
        assert_eq!(config.camera.position, [0.0, 1.0, 6.0]);
        assert_eq!(config.ground.scale, 2.0);
        assert!(config.shader_dir.join("grass.tese.wgsl").ends_with("shaders/grass.tese.wgsl"));
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{
                "camera": { "speed": 5.0 },
                "grass": {
                    "source": { "kind": "reference" },
                    "tessellation": { "mode": "fixed", "level": 4 }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.camera.speed, 5.0);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.grass.source, BladeSource::Reference);
        assert_eq!(config.grass.tessellation, TessellationMode::Fixed { level: 4 });
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("verdant.json");

        let mut config = AppConfig::default();
        config.window.vsync = false;
        config.ground.texture = Some("ground.png".into());
        config.grass.tessellation = TessellationMode::Fixed { level: 7 };
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            r#"{"camera": {"near": 0.0}}"#,
            r#"{"camera": {"near": 1.0, "far": 0.5}}"#,
            r#"{"camera": {"zoom_min": 0.0}}"#,
            r#"{"camera": {"zoom_min": 50.0, "zoom_max": 10.0}}"#,
            r#"{"camera": {"pitch_limit": 90.0}}"#,
            r#"{"camera": {"speed": -1.0}}"#,
            r#"{"ground": {"scale": 0.0}}"#,
            r#"{"grass": {"tessellation": {"mode": "screen_space", "min_level": 5, "max_level": 2}}}"#,
        ];
        for json in cases {
            let err = AppConfig::from_json(json).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{json}: {err}");
        }
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(AppConfig::from_json("{ not json"), Err(Error::Config(_))));
        let missing = AppConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }

    #[test]
    fn test_shipped_sample_config() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/verdant.json"));
        let config = AppConfig::load(path).unwrap();
        assert_eq!(config.window.width, 1280);
        assert!(matches!(config.grass.source, BladeSource::Procedural(field) if field.count == 20_000));
        assert!(matches!(config.grass.tessellation, TessellationMode::ScreenSpace { min_level: 2, .. }));
        assert_eq!(config.camera.near, CameraConfig::default().near);
    }
}
