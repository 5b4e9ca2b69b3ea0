//! Camera projection models
//!
//! The camera looks down its local +Y axis. Normalized screen space keeps the
//! same axis names: x runs left to right, z runs bottom to top, and y is depth
//! (−1 at the near plane, +1 at the far plane).

use serde::{Serialize, Deserialize};
use crate::animation::Transform;
use crate::error::{RenderError, Result};
use crate::rasterizer::{Mat4, Vec3};

/// View-volume bounds in camera space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewVolume {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
}

impl ViewVolume {
    pub fn new(left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) -> Self {
        Self { left, right, bottom, top, near, far }
    }

    fn validate(&self) -> Result<()> {
        let all = [self.left, self.right, self.bottom, self.top, self.near, self.far];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(RenderError::DegenerateViewVolume(format!("non-finite bounds {:?}", self)));
        }
        if self.left == self.right {
            return Err(RenderError::DegenerateViewVolume(format!("left == right == {}", self.left)));
        }
        if self.bottom == self.top {
            return Err(RenderError::DegenerateViewVolume(format!("bottom == top == {}", self.bottom)));
        }
        if self.near == self.far {
            return Err(RenderError::DegenerateViewVolume(format!("near == far == {}", self.near)));
        }
        Ok(())
    }

    /// Maps the volume onto the [-1, 1] cube. X from (left, right), Y from
    /// (near, far), Z from (bottom, top).
    fn ortho_matrix(&self) -> Mat4 {
        let (l, r, b, t, n, f) = (self.left, self.right, self.bottom, self.top, self.near, self.far);
        let mut m = Mat4::IDENTITY;
        m.m[0][0] = 2.0 / (r - l);
        m.m[1][1] = 2.0 / (f - n);
        m.m[2][2] = 2.0 / (t - b);
        m.set_translation(Vec3::new(-(r + l) / (r - l), -(f + n) / (f - n), -(t + b) / (t - b)));
        m
    }
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self::new(-1.0, 1.0, -1.0, 1.0, 0.0, 1.0)
    }
}

/// Projection model. Defaults to orthographic, which accepts the default
/// view volume (a perspective camera needs a non-zero near plane).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Orthographic,
    Perspective,
}

#[derive(Debug, Clone)]
enum Model {
    Orthographic,
    /// Perspective matrix (before the homogeneous divide) and its inverse
    Perspective { forward: Mat4, inverse: Mat4 },
}

/// A camera with its own world placement.
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    volume: ViewVolume,
    model: Model,
    ortho: Mat4,
    ortho_inverse: Mat4,
    time: f64,
}

impl Camera {
    pub fn new(projection: Projection, volume: ViewVolume) -> Result<Self> {
        match projection {
            Projection::Orthographic => Self::orthographic(volume),
            Projection::Perspective => Self::perspective(volume),
        }
    }

    pub fn orthographic(volume: ViewVolume) -> Result<Self> {
        volume.validate()?;
        Ok(Self::with_model(volume, Model::Orthographic))
    }

    /// Fails when the near plane sits at the eye (`near == 0`).
    pub fn perspective(volume: ViewVolume) -> Result<Self> {
        volume.validate()?;
        if volume.near == 0.0 {
            return Err(RenderError::DegenerateViewVolume(
                "perspective camera needs a non-zero near plane".to_string(),
            ));
        }

        let (n, f) = (volume.near, volume.far);
        let forward = Mat4::from_rows([
            [n, 0.0, 0.0, 0.0],
            [0.0, n + f, 0.0, -n * f],
            [0.0, 0.0, n, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ]);
        let inverse = Mat4::from_rows([
            [1.0 / n, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0 / n, 0.0],
            [0.0, 1.0 / forward.m[1][3], 0.0, -forward.m[1][1] / forward.m[1][3]],
        ]);

        Ok(Self::with_model(volume, Model::Perspective { forward, inverse }))
    }

    fn with_model(volume: ViewVolume, model: Model) -> Self {
        let ortho = volume.ortho_matrix();
        let mut ortho_inverse = Mat4::IDENTITY;
        for i in 0..3 {
            ortho_inverse.m[i][i] = 1.0 / ortho.m[i][i];
            ortho_inverse.m[i][3] = -ortho_inverse.m[i][i] * ortho.m[i][3];
        }
        Self {
            transform: Transform::new(),
            volume,
            model,
            ortho,
            ortho_inverse,
            time: 0.0,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn projection(&self) -> Projection {
        match self.model {
            Model::Orthographic => Projection::Orthographic,
            Model::Perspective { .. } => Projection::Perspective,
        }
    }

    pub fn volume(&self) -> &ViewVolume {
        &self.volume
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Pin the time used by subsequent projections
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// `|scale_z / scale_x|` of the normalization matrix
    pub fn ratio(&self) -> f64 {
        (self.ortho.m[2][2] / self.ortho.m[0][0]).abs()
    }

    /// World point to normalized screen space
    pub fn project_point(&self, p: Vec3) -> Vec3 {
        let local = self.transform.apply_inverse_to_point(p, self.time);
        match &self.model {
            Model::Orthographic => self.ortho.transform_point(local),
            Model::Perspective { forward, .. } => {
                let h = forward.mul_vec4([local.x, local.y, local.z, 1.0]);
                let divided = Vec3::new(h[0] / h[3], h[1] / h[3], h[2] / h[3]);
                self.ortho.transform_point(divided)
            }
        }
    }

    /// Normalized screen space back to a world point
    pub fn project_inverse_point(&self, s: Vec3) -> Vec3 {
        let p1 = self.ortho_inverse.transform_point(s);
        let local = match &self.model {
            Model::Orthographic => p1,
            Model::Perspective { forward, inverse } => {
                // w after the forward matrix is the camera-space depth; recover it
                // from the fixed coefficients of the depth row
                let w = -forward.m[1][3] / (forward.m[1][1] - p1.y);
                let h = inverse.mul_vec4([p1.x * w, p1.y * w, p1.z * w, w]);
                Vec3::new(h[0], h[1], h[2])
            }
        };
        self.transform.apply_to_point(local, self.time)
    }

    /// Camera forward (+Y) in world space
    pub fn view_dir(&self) -> Vec3 {
        self.transform.apply_to_normal(Vec3::Y, self.time)
    }

    /// Camera origin in world space
    pub fn position(&self) -> Vec3 {
        self.transform.origin(self.time)
    }
}
