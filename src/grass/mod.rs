//! Tessellated grass.
//!
//! Blades are packed records (`blade`) uploaded once to GPU storage. Each
//! frame the patch and control stages pick a subdivision level per blade and
//! the evaluation stage expands every blade into a curved, tapering ribbon.
//! `curve` and `tessellation` hold the host-side version of that math.

pub mod blade;
pub mod config;
pub mod curve;
pub mod field;
pub mod tessellation;

pub use blade::{load_blades, save_blades, Blade};
pub use config::{BladeSource, FieldConfig, GrassConfig, GrassShading, TessellationMode};
pub use field::FieldGenerator;
pub use tessellation::{DrawCall, MAX_TESS_LEVEL, PATCH_VERTICES, VERTICES_PER_BLADE};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::render::program::ShaderProgram;

/// Owns the grass configuration and the blades it produced
pub struct GrassSystem {
    config: GrassConfig,
    blades: Vec<Blade>,
}

impl GrassSystem {
    /// Resolve the configured blade source
    pub fn new(config: GrassConfig) -> Result<Self> {
        let blades = match &config.source {
            BladeSource::Reference => vec![Blade::reference()],
            BladeSource::Procedural(field) => FieldGenerator::new(*field).generate(),
            BladeSource::File { path } => load_blades(path)?,
        };
        if blades.len() > config::MAX_BLADES {
            return Err(Error::Blade(format!(
                "{} blades exceed the {} blade limit",
                blades.len(),
                config::MAX_BLADES
            )));
        }
        log::info!("Grass: {} blades from {} source", blades.len(), source_name(&config.source));
        Ok(Self { config, blades })
    }

    pub fn config(&self) -> &GrassConfig {
        &self.config
    }

    pub fn blades(&self) -> &[Blade] {
        &self.blades
    }

    pub fn blade_count(&self) -> u32 {
        self.blades.len() as u32
    }

    pub fn draw_call(&self) -> DrawCall {
        DrawCall::for_blade_count(self.blade_count())
    }

    /// Write the per-program constants: blade count, level policy and shading
    pub fn apply_uniforms(&self, program: &mut ShaderProgram) {
        program.set_uint("blade_count", self.blade_count());
        match self.config.tessellation {
            TessellationMode::Fixed { level } => {
                program.set_uint("screen_space", 0);
                program.set_uint("fixed_level", level);
            }
            TessellationMode::ScreenSpace { min_level, max_level, pixels_per_segment } => {
                program.set_uint("screen_space", 1);
                program.set_uint("min_level", min_level);
                program.set_uint("max_level", max_level);
                program.set_float("pixels_per_segment", pixels_per_segment);
            }
        }

        let shading = &self.config.shading;
        program.set_vec3("base_color", Vec3::from_array(shading.base_color));
        program.set_vec3("tip_color", Vec3::from_array(shading.tip_color));
        program.set_vec3("light_direction", Vec3::from_array(shading.light_direction));
        program.set_float("ambient", shading.ambient);
    }

    /// Framebuffer size used by screen-space level selection
    pub fn set_viewport(program: &mut ShaderProgram, width: u32, height: u32) {
        program.set_float("viewport_width", width as f32);
        program.set_float("viewport_height", height as f32);
    }
}

fn source_name(source: &BladeSource) -> &'static str {
    match source {
        BladeSource::Reference => "reference",
        BladeSource::Procedural(_) => "procedural",
        BladeSource::File { .. } => "file",
    }
}
