//! Rendering system and GPU interfaces

pub mod context;
pub mod buffer;
pub mod pipeline;
pub mod program;
pub mod texture;
pub mod renderer;

pub use renderer::{FrameStatus, SceneRenderer};
