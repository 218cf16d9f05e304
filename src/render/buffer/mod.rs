//! GPU buffer management

pub mod blade_buffer;
pub mod ground_mesh;

pub use blade_buffer::{BladeBuffers, ControlPoint};
pub use ground_mesh::{GroundMesh, GroundVertex, GROUND_VERTICES};
