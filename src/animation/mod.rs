//! Keyframe curves and time-parameterized transforms

mod curve;
mod transform;

pub use curve::*;
pub use transform::*;
