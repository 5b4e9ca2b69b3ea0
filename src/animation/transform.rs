//! Time-parameterized affine pose
//!
//! Position and rotation are six independent fields, each either a constant
//! or a keyframe curve. Rotation angles are degrees, composed as
//! `Rx * Ry * Rz`.

use std::cell::Cell;
use serde::{Serialize, Deserialize};
use super::curve::Curve;
use crate::rasterizer::{Mat4, Vec3};

/// A scalar that is either fixed or animated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    Constant(f64),
    Animated(Curve),
}

impl Field {
    pub fn resolve(&self, time: f64) -> f64 {
        match self {
            Field::Constant(v) => *v,
            Field::Animated(curve) => curve.interpolate(time),
        }
    }

    /// Last keyframe time, or `None` for a constant
    pub fn end_time(&self) -> Option<f64> {
        match self {
            Field::Constant(_) => None,
            Field::Animated(curve) => Some(curve.end_time()),
        }
    }

    fn reset(&self) {
        if let Field::Animated(curve) = self {
            curve.reset();
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::Constant(0.0)
    }
}

impl From<f64> for Field {
    fn from(v: f64) -> Self {
        Field::Constant(v)
    }
}

impl From<Curve> for Field {
    fn from(curve: Curve) -> Self {
        Field::Animated(curve)
    }
}

/// Affine pose owned by a camera, mesh or light.
///
/// The matrix for the most recent query time is cached; recomputing it
/// always gives the same result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    position: [Field; 3],
    /// Degrees about X, Y, Z
    rotation: [Field; 3],
    #[serde(skip)]
    cache: Cell<Option<(f64, Mat4)>>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, x: impl Into<Field>, y: impl Into<Field>, z: impl Into<Field>) {
        self.position = [x.into(), y.into(), z.into()];
        self.cache.set(None);
    }

    pub fn set_rotation(&mut self, x: impl Into<Field>, y: impl Into<Field>, z: impl Into<Field>) {
        self.rotation = [x.into(), y.into(), z.into()];
        self.cache.set(None);
    }

    pub fn with_position(mut self, x: impl Into<Field>, y: impl Into<Field>, z: impl Into<Field>) -> Self {
        self.set_position(x, y, z);
        self
    }

    pub fn with_rotation(mut self, x: impl Into<Field>, y: impl Into<Field>, z: impl Into<Field>) -> Self {
        self.set_rotation(x, y, z);
        self
    }

    pub fn position(&self) -> &[Field; 3] {
        &self.position
    }

    pub fn rotation(&self) -> &[Field; 3] {
        &self.rotation
    }

    /// Latest keyframe time across all animated fields
    pub fn end_time(&self) -> Option<f64> {
        self.position
            .iter()
            .chain(self.rotation.iter())
            .filter_map(Field::end_time)
            .reduce(f64::max)
    }

    /// Rewind every curve's scan cursor and drop the cached matrix
    pub fn reset(&self) {
        for field in self.position.iter().chain(self.rotation.iter()) {
            field.reset();
        }
        self.cache.set(None);
    }

    /// Local-to-world matrix at `time`
    pub fn matrix(&self, time: f64) -> Mat4 {
        if let Some((cached_time, m)) = self.cache.get() {
            if cached_time == time {
                return m;
            }
        }

        let [rx, ry, rz] = &self.rotation;
        let mut m = Mat4::rotation_x(rx.resolve(time))
            .mul(&Mat4::rotation_y(ry.resolve(time)))
            .mul(&Mat4::rotation_z(rz.resolve(time)));

        let [x, y, z] = &self.position;
        m.set_translation(Vec3::new(x.resolve(time), y.resolve(time), z.resolve(time)));

        self.cache.set(Some((time, m)));
        m
    }

    /// World-to-local matrix at `time`
    pub fn inverse(&self, time: f64) -> Mat4 {
        self.matrix(time).rigid_inverse()
    }

    pub fn apply_to_point(&self, p: Vec3, time: f64) -> Vec3 {
        self.matrix(time).transform_point(p)
    }

    pub fn apply_inverse_to_point(&self, p: Vec3, time: f64) -> Vec3 {
        self.inverse(time).transform_point(p)
    }

    /// Rotate a direction (no translation)
    pub fn apply_to_normal(&self, n: Vec3, time: f64) -> Vec3 {
        self.matrix(time).transform_vector(n)
    }

    /// World position of the local origin
    pub fn origin(&self, time: f64) -> Vec3 {
        self.matrix(time).translation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::curve::{CurveType, Keyframe};

    const EPS: f64 = 1e-9;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < EPS
    }

    fn spinning() -> Transform {
        let spin = Curve::new(vec![
            Keyframe::new(0.0, 0.0, CurveType::Linear),
            Keyframe::new(360.0, 8.0, CurveType::Linear),
        ])
        .unwrap();
        let bob = Curve::new(vec![
            Keyframe::new(3.5, 0.0, CurveType::Sine(1.0)),
            Keyframe::new(-3.5, 8.0, CurveType::Hold),
        ])
        .unwrap();
        Transform::new()
            .with_position(bob, -2.0, 0.5)
            .with_rotation(15.0, spin, 200.0)
    }

    #[test]
    fn test_identity() {
        let t = Transform::new();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(close(t.apply_to_point(p, 0.0), p));
        assert_eq!(t.matrix(4.0), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_and_rotation() {
        let t = Transform::new()
            .with_position(1.0, 2.0, 3.0)
            .with_rotation(0.0, 0.0, 90.0);
        assert!(close(t.apply_to_point(Vec3::X, 0.0), Vec3::new(1.0, 3.0, 3.0)));
        assert!(close(t.apply_to_normal(Vec3::X, 0.0), Vec3::Y));
        assert!(close(t.origin(0.0), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_rotation_order_is_x_then_y_then_z() {
        let t = Transform::new().with_rotation(90.0, 90.0, 0.0);
        // Rx(90) * Ry(90) * Z = Rx(90) * X = X
        assert!(close(t.apply_to_normal(Vec3::Z, 0.0), Vec3::X));
    }

    #[test]
    fn test_round_trip() {
        let t = spinning();
        for i in 0..40 {
            let time = i as f64 * 0.25;
            for p in [Vec3::new(0.3, -1.0, 2.0), Vec3::ZERO, Vec3::new(-5.0, 4.0, 0.1)] {
                let back = t.apply_inverse_to_point(t.apply_to_point(p, time), time);
                assert!(close(back, p));
            }
        }
    }

    #[test]
    fn test_cache_matches_recompute() {
        let t = spinning();
        let a = t.matrix(2.0);
        let b = t.matrix(2.0);
        assert_eq!(a, b);
        let _ = t.matrix(5.0);
        t.reset();
        assert_eq!(t.matrix(2.0), a);
    }

    #[test]
    fn test_animated_position() {
        let t = Transform::new().with_position(Curve::linear(&[(0.0, 0.0), (4.0, 2.0)]).unwrap(), 0.0, 0.0);
        assert!(close(t.origin(1.0), Vec3::new(2.0, 0.0, 0.0)));
        assert!(close(t.origin(3.0), Vec3::new(4.0, 0.0, 0.0)));
        assert_eq!(t.end_time(), Some(2.0));
        assert_eq!(Transform::new().end_time(), None);
    }
}
