//! Static triangle meshes built from a triangle soup

use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::animation::Transform;
use crate::error::{RenderError, Result};
use crate::rasterizer::Vec3;

/// One input triangle: three corner positions plus the face normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoupTriangle {
    pub vertices: [Vec3; 3],
    pub normal: Vec3,
}

impl SoupTriangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3, normal: Vec3) -> Self {
        Self { vertices: [a, b, c], normal }
    }

    /// Face normal from the winding order (counter-clockwise = front)
    pub fn from_winding(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new(a, b, c, (b - a).cross(c - a).normalize())
    }
}

/// Phong-Blinn surface parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    /// Ambient coefficient
    pub ka: f64,
    /// Diffuse coefficient
    pub kd: f64,
    /// Specular coefficient
    pub ks: f64,
    /// Specular exponent
    pub ke: f64,
}

impl Material {
    pub fn new(diffuse_color: Vec3, specular_color: Vec3, ka: f64, kd: f64, ks: f64, ke: f64) -> Self {
        Self { diffuse_color, specular_color, ka, kd, ks, ke }
    }

    /// Colors and coefficients must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, color) in [("diffuse_color", self.diffuse_color), ("specular_color", self.specular_color)] {
            if !color.is_finite() || color.to_array().iter().any(|&c| c < 0.0) {
                return Err(RenderError::InvalidMaterial(format!("{} must be finite and >= 0, got {:?}", name, color)));
            }
        }
        for (name, k) in [("ka", self.ka), ("kd", self.kd), ("ks", self.ks), ("ke", self.ke)] {
            if !k.is_finite() || k < 0.0 {
                return Err(RenderError::InvalidMaterial(format!("{} must be finite and >= 0, got {}", name, k)));
            }
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::new(1.0, 0.0, 1.0), Vec3::ONE, 0.05, 1.0, 0.2, 100.0)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Check if a point is inside the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x
            && point.y >= self.min.y && point.y <= self.max.y
            && point.z >= self.min.z && point.z <= self.max.z
    }

    /// Expand bounds to include a point
    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }
}

/// Welded triangle mesh with a material and a world placement.
///
/// Geometry is fixed after construction; only the transform animates.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    faces: Vec<[usize; 3]>,
    face_normals: Vec<Vec3>,
    vertex_normals: Vec<Vec3>,
    pub material: Material,
    pub transform: Transform,
}

impl Mesh {
    /// Weld a triangle soup into an indexed mesh.
    ///
    /// Fails on non-finite corners or normals and on an invalid material.
    ///
    /// Corners at exactly the same position share one vertex. Each vertex normal
    /// is the normalized sum of the face normals of the triangles using it.
    pub fn from_triangles(triangles: &[SoupTriangle], material: Material) -> Result<Self> {
        material.validate()?;

        let mut vertices: Vec<Vec3> = Vec::new();
        let mut normal_sums: Vec<Vec3> = Vec::new();
        let mut faces = Vec::with_capacity(triangles.len());
        let mut face_normals = Vec::with_capacity(triangles.len());
        let mut lookup: HashMap<[u64; 3], usize> = HashMap::new();

        for (i, tri) in triangles.iter().enumerate() {
            if !tri.normal.is_finite() || tri.vertices.iter().any(|v| !v.is_finite()) {
                return Err(RenderError::InvalidGeometry(format!("triangle {} has non-finite data", i)));
            }

            let mut face = [0; 3];
            for (corner, &pos) in face.iter_mut().zip(tri.vertices.iter()) {
                let idx = *lookup.entry(weld_key(pos)).or_insert_with(|| {
                    vertices.push(pos);
                    normal_sums.push(Vec3::ZERO);
                    vertices.len() - 1
                });
                normal_sums[idx] += tri.normal;
                *corner = idx;
            }

            faces.push(face);
            face_normals.push(tri.normal);
        }

        let vertex_normals = normal_sums.into_iter().map(Vec3::normalize).collect();

        log::debug!(
            "welded {} triangles into {} vertices",
            faces.len(),
            vertices.len()
        );

        Ok(Self {
            vertices,
            faces,
            face_normals,
            vertex_normals,
            material,
            transform: Transform::new(),
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    pub fn vertex_normals(&self) -> &[Vec3] {
        &self.vertex_normals
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Local-space bounds (zero box for an empty mesh)
    pub fn bounds(&self) -> Aabb {
        let mut iter = self.vertices.iter();
        let Some(&first) = iter.next() else {
            return Aabb::default();
        };
        let mut bounds = Aabb::new(first, first);
        for &v in iter {
            bounds.expand(v);
        }
        bounds
    }
}

/// Bit pattern key; `+ 0.0` folds -0.0 into 0.0
fn weld_key(p: Vec3) -> [u64; 3] {
    [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn quad() -> Vec<SoupTriangle> {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(1.0, 0.0, 1.0);
        let d = Vec3::new(-0.0, 0.0, 1.0);
        vec![
            SoupTriangle::new(a, b, c, Vec3::new(0.0, -1.0, 0.0)),
            SoupTriangle::new(a, c, Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0)),
            SoupTriangle::new(a, c, d, Vec3::new(0.0, -1.0, 0.0)),
        ]
    }

    #[test]
    fn test_welds_shared_corners() {
        let mesh = Mesh::from_triangles(&quad(), Material::default()).unwrap();
        // (-0.0, 0, 1) welds with (0, 0, 1)
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 3);
        assert!(mesh.vertex_count() <= mesh.face_count() * 3);
        for face in mesh.faces() {
            assert!(face.iter().all(|&i| i < mesh.vertex_count()));
        }
        assert_eq!(mesh.faces()[0][0], mesh.faces()[2][0]);
        assert_eq!(mesh.faces()[1][2], mesh.faces()[2][2]);
    }

    #[test]
    fn test_vertex_normals_are_normalized_sums() {
        let mesh = Mesh::from_triangles(&quad(), Material::default()).unwrap();
        // Vertex b is only used by the first face
        let b = mesh.faces()[0][1];
        assert!((mesh.vertex_normals()[b] - Vec3::new(0.0, -1.0, 0.0)).len() < EPS);
        // Vertex a is shared by all three faces: (0,-2,-1) normalized
        let a = mesh.faces()[0][0];
        let expected = Vec3::new(0.0, -2.0, -1.0).normalize();
        assert!((mesh.vertex_normals()[a] - expected).len() < EPS);
        for n in mesh.vertex_normals() {
            assert!((n.len() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_zero_normal_sum_is_left_alone() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Z;
        let tris = [
            SoupTriangle::new(a, b, c, Vec3::Y),
            SoupTriangle::new(a, c, b, -Vec3::Y),
        ];
        let mesh = Mesh::from_triangles(&tris, Material::default()).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.vertex_normals().iter().all(|n| *n == Vec3::ZERO));
    }

    #[test]
    fn test_rejects_non_finite() {
        let tri = SoupTriangle::new(Vec3::new(f64::NAN, 0.0, 0.0), Vec3::X, Vec3::Z, Vec3::Y);
        assert!(Mesh::from_triangles(&[tri], Material::default()).is_err());
    }

    #[test]
    fn test_rejects_bad_material() {
        let mut negative_exponent = Material::default();
        negative_exponent.ke = -2.0;
        let err = Mesh::from_triangles(&quad(), negative_exponent).unwrap_err();
        assert!(matches!(err, RenderError::InvalidMaterial(_)));

        let mut nan_color = Material::default();
        nan_color.specular_color = Vec3::new(1.0, f64::NAN, 1.0);
        assert!(nan_color.validate().is_err());

        let mut negative_kd = Material::default();
        negative_kd.kd = -0.1;
        assert!(negative_kd.validate().is_err());

        assert!(Material::default().validate().is_ok());
    }

    #[test]
    fn test_bounds() {
        let mesh = Mesh::from_triangles(&quad(), Material::default()).unwrap();
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 0.0, 1.0));
        assert!(bounds.contains(Vec3::new(0.5, 0.0, 0.5)));
        assert_eq!(Mesh::from_triangles(&[], Material::default()).unwrap().bounds(), Aabb::default());
    }
}
