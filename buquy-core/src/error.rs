/// Error types for mesh construction, scene commands and command parsing
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MeshError {
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },

    #[error("vertex index {index} out of range for {len} vertices")]
    VertexIndexOutOfRange { index: usize, len: usize },

    #[error("a face needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("no letter at index {index} (scene has {count})")]
    LetterIndexOutOfRange { index: usize, count: usize },

    #[error("scale must be a positive finite number, got {0}")]
    InvalidScale(f32),

    #[error("{command} needs finite operands")]
    NonFinite { command: &'static str },

    #[error("light direction must not be the zero vector")]
    ZeroLightDirection,

    #[error("viewport must be at least 1x1, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("cannot parse `{input}`: {message}")]
    Syntax { input: String, message: String },
}
