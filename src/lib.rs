//! Soft Render: a software triangle rasterizer
//!
//! - Keyframe curves driving per-axis position and rotation
//! - Orthographic and perspective cameras with analytic inverses
//! - Welded triangle meshes with per-vertex normals
//! - Point light with Phong-Blinn shading
//! - PNG stills and looping GIF animations

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod animation;
pub mod error;
pub mod output;
pub mod rasterizer;
pub mod scene;

pub use error::{RenderError, Result};
pub use rasterizer::{Color, FrameBuffer, RenderSettings, Renderer, ShadingMode};
pub use scene::{load_scene, load_scene_from_str, save_scene, Scene, SceneFile};
