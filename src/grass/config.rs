//! Grass configuration (blade source, tessellation policy, shading)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;
use crate::grass::tessellation::MAX_TESS_LEVEL;

/// Upper bound on blades so the patch buffer stays inside default storage limits
pub const MAX_BLADES: usize = 500_000;

/// User-facing grass configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    pub source: BladeSource,
    pub tessellation: TessellationMode,
    pub shading: GrassShading,
}

impl GrassConfig {
    pub fn validate(&self) -> Result<()> {
        if let BladeSource::Procedural(field) = &self.source {
            field.validate()?;
        }
        self.tessellation.validate()?;
        self.shading.validate()
    }
}

/// Where blade records come from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BladeSource {
    /// The single hand-placed blade at the origin
    Reference,
    /// Noise-clumped field from [`crate::grass::field::FieldGenerator`]
    Procedural(FieldConfig),
    /// JSON array of blade records
    File { path: PathBuf },
}

impl Default for BladeSource {
    fn default() -> Self {
        Self::Procedural(FieldConfig::default())
    }
}

/// How the tess-control stage picks a subdivision level per blade
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TessellationMode {
    /// Same level for every blade, clamped to `[1, MAX_TESS_LEVEL]`
    Fixed { level: u32 },
    /// Level grows with the blade's projected length in pixels
    ScreenSpace {
        #[serde(default = "default_min_level")]
        min_level: u32,
        #[serde(default = "default_max_level")]
        max_level: u32,
        #[serde(default = "default_pixels_per_segment")]
        pixels_per_segment: f32,
    },
}

fn default_min_level() -> u32 {
    1
}

fn default_max_level() -> u32 {
    MAX_TESS_LEVEL
}

fn default_pixels_per_segment() -> f32 {
    8.0
}

impl Default for TessellationMode {
    fn default() -> Self {
        Self::ScreenSpace {
            min_level: default_min_level(),
            max_level: default_max_level(),
            pixels_per_segment: default_pixels_per_segment(),
        }
    }
}

impl TessellationMode {
    pub fn validate(&self) -> Result<()> {
        match *self {
            // Out-of-range fixed levels are clamped, not rejected
            Self::Fixed { .. } => Ok(()),
            Self::ScreenSpace { min_level, max_level, pixels_per_segment } => {
                if min_level > max_level {
                    return Err(Error::Config(format!(
                        "tessellation min_level {min_level} exceeds max_level {max_level}"
                    )));
                }
                if !(pixels_per_segment.is_finite() && pixels_per_segment > 0.0) {
                    return Err(Error::Config(format!(
                        "tessellation pixels_per_segment must be positive, got {pixels_per_segment}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Fragment lighting parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassShading {
    /// Color at the blade root
    pub base_color: [f32; 3],
    /// Color at the blade tip
    pub tip_color: [f32; 3],
    /// Direction the light travels (world space)
    pub light_direction: [f32; 3],
    /// Ambient term in [0, 1]
    pub ambient: f32,
}

impl Default for GrassShading {
    fn default() -> Self {
        Self {
            base_color: [0.08, 0.3, 0.06],
            tip_color: [0.45, 0.72, 0.2],
            light_direction: [-0.4, -1.0, -0.3],
            ambient: 0.3,
        }
    }
}

impl GrassShading {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ambient) {
            return Err(Error::Config(format!("grass ambient must be in [0, 1], got {}", self.ambient)));
        }
        let [x, y, z] = self.light_direction;
        let len_sq = x * x + y * y + z * z;
        if !(len_sq.is_finite() && len_sq > 0.0) {
            return Err(Error::Config("grass light_direction must be a non-zero vector".into()));
        }
        Ok(())
    }
}

/// Procedural blade field parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Exact number of blades to place
    pub count: u32,
    /// Half size of the square patch in model space
    pub extent: f32,
    pub seed: u32,
    pub height_min: f32,
    pub height_max: f32,
    pub width_min: f32,
    pub width_max: f32,
    /// Tip lean as a fraction of blade height
    pub bend: f32,
    /// Stored in `up.w`, carried but not simulated
    pub stiffness: f32,
    /// Clump noise frequency in cycles per model unit
    pub clump_scale: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 4096,
            extent: 1.0,
            seed: 7,
            height_min: 0.06,
            height_max: 0.16,
            width_min: 0.008,
            width_max: 0.02,
            bend: 0.35,
            stiffness: 1.0,
            clump_scale: 3.0,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.count as usize > MAX_BLADES {
            return Err(Error::Config(format!(
                "field count {} exceeds the {MAX_BLADES} blade limit",
                self.count
            )));
        }
        let ranges = [
            ("extent", self.extent, self.extent),
            ("height", self.height_min, self.height_max),
            ("width", self.width_min, self.width_max),
        ];
        for (name, lo, hi) in ranges {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
                return Err(Error::Config(format!("field {name} range [{lo}, {hi}] is invalid")));
            }
        }
        if !(self.bend.is_finite() && self.bend >= 0.0) {
            return Err(Error::Config(format!("field bend must be non-negative, got {}", self.bend)));
        }
        if !self.stiffness.is_finite() || !self.clump_scale.is_finite() || self.clump_scale < 0.0 {
            return Err(Error::Config("field stiffness and clump_scale must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        GrassConfig::default().validate().unwrap();
    }

    #[test]
    fn test_source_tags() {
        let reference: BladeSource = serde_json::from_str(r#"{"kind":"reference"}"#).unwrap();
        assert_eq!(reference, BladeSource::Reference);

        let file: BladeSource =
            serde_json::from_str(r#"{"kind":"file","path":"assets/blades/reference.json"}"#).unwrap();
        assert_eq!(file, BladeSource::File { path: "assets/blades/reference.json".into() });

        let procedural: BladeSource =
            serde_json::from_str(r#"{"kind":"procedural","count":12,"seed":3}"#).unwrap();
        match procedural {
            BladeSource::Procedural(field) => {
                assert_eq!(field.count, 12);
                assert_eq!(field.seed, 3);
                assert_eq!(field.extent, FieldConfig::default().extent);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn test_tessellation_tags() {
        let fixed: TessellationMode = serde_json::from_str(r#"{"mode":"fixed","level":5}"#).unwrap();
        assert_eq!(fixed, TessellationMode::Fixed { level: 5 });

        let screen: TessellationMode =
            serde_json::from_str(r#"{"mode":"screen_space","max_level":8}"#).unwrap();
        assert_eq!(
            screen,
            TessellationMode::ScreenSpace { min_level: 1, max_level: 8, pixels_per_segment: 8.0 }
        );
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let inverted = TessellationMode::ScreenSpace { min_level: 9, max_level: 2, pixels_per_segment: 4.0 };
        assert!(inverted.validate().is_err());

        let zero_pixels = TessellationMode::ScreenSpace { min_level: 1, max_level: 2, pixels_per_segment: 0.0 };
        assert!(zero_pixels.validate().is_err());

        let field = FieldConfig { height_min: 0.5, height_max: 0.1, ..Default::default() };
        assert!(field.validate().is_err());

        let field = FieldConfig { count: MAX_BLADES as u32 + 1, ..Default::default() };
        assert!(field.validate().is_err());

        let shading = GrassShading { light_direction: [0.0; 3], ..Default::default() };
        assert!(shading.validate().is_err());

        // Fixed levels outside the range are clamped later
        assert!(TessellationMode::Fixed { level: 0 }.validate().is_ok());
    }
}
