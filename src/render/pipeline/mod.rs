//! Render pipelines

pub mod grass;
pub mod ground;

pub use grass::GrassPipeline;
pub use ground::GroundPipeline;

use crate::core::config::ShaderDir;
use crate::render::program::{ShaderBuilder, ShaderError, ShaderProgram, StageKind};

/// Build the four-stage grass program from `grass.{vert,tesc,tese,frag}.wgsl`
pub fn load_grass_program(dir: &ShaderDir) -> Result<ShaderProgram, ShaderError> {
    StageKind::ALL
        .iter()
        .fold(ShaderBuilder::new("grass"), |builder, &kind| {
            builder.load(dir.join(&format!("grass{}", kind.suffix())), kind)
        })
        .build()
}

/// Build the plain ground program from `ground.{vert,frag}.wgsl`
pub fn load_ground_program(dir: &ShaderDir) -> Result<ShaderProgram, ShaderError> {
    ShaderBuilder::new("ground")
        .load(dir.join("ground.vert.wgsl"), StageKind::Vertex)
        .load(dir.join("ground.frag.wgsl"), StageKind::Fragment)
        .build()
}
