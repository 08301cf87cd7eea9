/// Buquy Core Library - letter meshes, lighting and a painter's-algorithm renderer
///
/// The core is host-agnostic: a `SceneState` is edited through `SceneCommand`s
/// and a `Renderer` turns it into a stream of 2D `DrawCommand`s that the
/// terminal and web front ends replay on their own surfaces.

pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod letter;
pub mod lighting;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use command::{parse_command, parse_script};
pub use config::{Attenuation, LightingParams, RenderConfig};
pub use error::{CommandError, MeshError, SceneError};
pub use geometry::{Color, Face, Mesh};
pub use letter::{Letter, LetterKind, LetterParam, LetterParams};
pub use lighting::Light;
pub use projection::{Camera, Projector, Viewport};
pub use render::{DisplayMode, DrawCommand, FrameStats, Renderer, ShadingMode};
pub use scene::{SceneCommand, SceneState};
pub use transform::{Axis, RotationState, Transform, VectorExt};
