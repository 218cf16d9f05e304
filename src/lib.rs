//! Verdant - real-time tessellated grass renderer

pub mod core;
pub mod grass;
pub mod render;
