//! Point light

use crate::animation::Transform;
use crate::error::{RenderError, Result};
use crate::rasterizer::Vec3;

/// Point light at the origin of its transform
#[derive(Debug, Clone)]
pub struct PointLight {
    intensity: f64,
    color: Vec3,
    pub transform: Transform,
}

impl PointLight {
    /// `intensity` must be positive, `color` channels in [0, 1].
    pub fn new(intensity: f64, color: Vec3) -> Result<Self> {
        if !intensity.is_finite() || intensity <= 0.0 {
            return Err(RenderError::InvalidLight(format!("intensity must be > 0, got {}", intensity)));
        }
        if color.to_array().iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(RenderError::InvalidLight(format!("color channels must be in [0, 1], got {:?}", color)));
        }
        Ok(Self {
            intensity,
            color,
            transform: Transform::new(),
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn position(&self, time: f64) -> Vec3 {
        self.transform.origin(time)
    }
}
