//! Textures used by the scene

pub mod depth;
pub mod ground_texture;

pub use depth::{DepthTexture, DEPTH_FORMAT};
pub use ground_texture::{load_ground_image, procedural_ground, GroundTexture};
