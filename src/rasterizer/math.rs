//! Vector and matrix math for the software pipeline
//!
//! Everything is double precision: the projection chain is inverted
//! analytically and round-trips need the headroom.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector (also used for linear RGB colors in [0, 1])
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
    pub const X: Vec3 = Vec3 { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f64) -> Self {
        Self { x: v, y: v, z: v }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn len_squared(self) -> f64 {
        self.dot(self)
    }

    /// Unit vector in the same direction. A zero-length vector is returned unchanged.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 || !l.is_finite() {
            return self;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Component-wise product (color modulation)
    pub fn mul_elem(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x * other.x,
            y: self.y * other.y,
            z: self.z * other.z,
        }
    }

    pub fn min(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(a: [f64; 3]) -> Self {
        Vec3::new(a[0], a[1], a[2])
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x / s,
            y: self.y / s,
            z: self.z / s,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Row-major 4x4 matrix. Points are column vectors: `m * p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f64; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub const ZERO: Mat4 = Mat4 { m: [[0.0; 4]; 4] };

    pub fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Rotation about the X axis, angle in degrees
    pub fn rotation_x(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[1][1] = c;
        r.m[1][2] = -s;
        r.m[2][1] = s;
        r.m[2][2] = c;
        r
    }

    /// Rotation about the Y axis, angle in degrees
    pub fn rotation_y(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    /// Rotation about the Z axis, angle in degrees
    pub fn rotation_z(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        let mut r = Mat4::IDENTITY;
        r.m[0][0] = c;
        r.m[0][1] = -s;
        r.m[1][0] = s;
        r.m[1][1] = c;
        r
    }

    pub fn mul(&self, other: &Mat4) -> Mat4 {
        let mut out = Mat4::ZERO;
        for i in 0..4 {
            for j in 0..4 {
                out.m[i][j] = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        out
    }

    /// Multiply a homogeneous column vector
    pub fn mul_vec4(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (i, row) in self.m.iter().enumerate() {
            out[i] = row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3];
        }
        out
    }

    /// Transform a point (w = 1), dropping the resulting w
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let r = self.mul_vec4([p.x, p.y, p.z, 1.0]);
        Vec3::new(r[0], r[1], r[2])
    }

    /// Transform a direction by the upper 3x3 block only
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            y: m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            z: m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        }
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    pub fn set_translation(&mut self, t: Vec3) {
        self.m[0][3] = t.x;
        self.m[1][3] = t.y;
        self.m[2][3] = t.z;
    }

    /// Inverse of a rigid transform (orthonormal rotation block + translation):
    /// rotation becomes its transpose, translation becomes `-R^T t`.
    pub fn rigid_inverse(&self) -> Mat4 {
        let mut inv = Mat4::IDENTITY;
        for i in 0..3 {
            for j in 0..3 {
                inv.m[i][j] = self.m[j][i];
            }
        }
        let t = inv.transform_vector(self.translation());
        inv.set_translation(-t);
        inv
    }
}

/// Precomputed 2D barycentric setup for one screen-space triangle.
///
/// Uses the edge-function form; the denominator is twice the signed area.
#[derive(Debug, Clone, Copy)]
pub struct Barycentric {
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    inv_d: f64,
}

impl Barycentric {
    /// Area below which a triangle is treated as degenerate
    pub const DEGENERATE_EPSILON: f64 = 1e-12;

    /// Returns `None` for a zero-area (or non-finite) triangle.
    pub fn new(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<Self> {
        let d = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
        if !d.is_finite() || d.abs() < Self::DEGENERATE_EPSILON {
            return None;
        }
        Some(Self { a, b, c, inv_d: 1.0 / d })
    }

    /// Weights `(alpha, beta, gamma)` of `p` against vertices `(a, b, c)`
    pub fn weights(&self, p: (f64, f64)) -> [f64; 3] {
        let (a, b, c) = (self.a, self.b, self.c);
        let u = ((b.1 - c.1) * (p.0 - c.0) + (c.0 - b.0) * (p.1 - c.1)) * self.inv_d;
        let v = ((c.1 - a.1) * (p.0 - c.0) + (a.0 - c.0) * (p.1 - c.1)) * self.inv_d;
        [u, v, 1.0 - u - v]
    }
}

/// Inside-or-on-edge test. Shared edges are accepted by both neighbours.
pub fn weights_inside(w: [f64; 3]) -> bool {
    w.iter().all(|&x| (0.0..=1.0).contains(&x))
}

/// Normalized screen coordinate in [-1, 1] to a display pixel index (floor)
pub fn screen_to_display(s: f64, size: usize) -> f64 {
    ((s / 2.0 + 0.5) * size as f64).floor()
}

/// Display pixel index to the normalized coordinate of the pixel's center
pub fn display_to_screen(p: usize, size: usize) -> f64 {
    2.0 * (p as f64 + 0.5) / size as f64 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).len() < EPS
    }

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < EPS);
    }

    #[test]
    fn test_vec3_cross() {
        let c = Vec3::X.cross(Vec3::Y);
        assert!(close(c, Vec3::Z));
    }

    #[test]
    fn test_normalize_zero_is_unchanged() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        assert!((Vec3::new(3.0, 4.0, 0.0).normalize().len() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let r = Mat4::rotation_z(90.0);
        assert!(close(r.transform_vector(Vec3::X), Vec3::Y));
    }

    #[test]
    fn test_rigid_inverse() {
        let mut m = Mat4::rotation_x(30.0).mul(&Mat4::rotation_y(-45.0)).mul(&Mat4::rotation_z(10.0));
        m.set_translation(Vec3::new(1.0, -2.0, 3.5));
        let p = Vec3::new(0.3, 0.7, -1.1);
        let back = m.rigid_inverse().transform_point(m.transform_point(p));
        assert!(close(back, p));
        let id = m.mul(&m.rigid_inverse());
        for i in 0..4 {
            for j in 0..4 {
                assert!((id.m[i][j] - Mat4::IDENTITY.m[i][j]).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_barycentric_inside() {
        let bc = Barycentric::new((0.0, 0.0), (10.0, 0.0), (5.0, 10.0)).unwrap();
        let w = bc.weights((5.0, 3.0));
        assert!(weights_inside(w));
        assert!((w[0] + w[1] + w[2] - 1.0).abs() < EPS);
        assert!(!weights_inside(bc.weights((-1.0, 0.0))));
    }

    #[test]
    fn test_barycentric_vertices() {
        let bc = Barycentric::new((0.0, 0.0), (1.0, 0.0), (0.0, 1.0)).unwrap();
        let w = bc.weights((1.0, 0.0));
        assert!((w[1] - 1.0).abs() < EPS && w[0].abs() < EPS && w[2].abs() < EPS);
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(Barycentric::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0)).is_none());
    }

    #[test]
    fn test_display_conversions() {
        assert_eq!(screen_to_display(-1.0, 100), 0.0);
        assert_eq!(screen_to_display(0.0, 100), 50.0);
        assert!((display_to_screen(0, 100) - (-0.99)).abs() < EPS);
        assert!((display_to_screen(99, 100) - 0.99).abs() < EPS);
    }
}
