//! Error types for the renderer

use thiserror::Error;

use crate::render::program::ShaderError;

/// Main error type for the renderer
#[derive(Debug, Error)]
pub enum Error {
    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("Blade data error: {0}")]
    Blade(String),

    #[error("Texture error: {0}")]
    Texture(String),
}
