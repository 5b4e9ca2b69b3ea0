//! Software triangle rasterizer
//!
//! Features:
//! - Orthographic and perspective projection into a [-1, 1] screen cube
//! - Barycentric scan conversion over clamped bounding boxes
//! - Depth buffer with strict nearest-wins testing
//! - Silhouette, flat, barycentric, depth and Phong-Blinn shading

mod framebuffer;
mod math;
mod render;
mod shading;
mod types;

pub use framebuffer::*;
pub use math::*;
pub use render::*;
pub use shading::*;
pub use types::*;
