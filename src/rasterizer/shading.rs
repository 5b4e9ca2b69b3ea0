//! Per-pixel color strategies, one per `ShadingMode`
//!
//! The renderer walks triangles and pixels the same way for every mode and
//! hands each shader the same triangle/pixel records.

use std::f64::consts::PI;
use super::math::Vec3;
use super::types::{unit_to_channel, Color, ShadingMode};
use crate::scene::Material;

/// Color painted by `ShadingMode::None`
pub const SILHOUETTE_COLOR: Color = Color::BLACK;

/// One triangle, ready to rasterize
#[derive(Debug, Clone, Copy)]
pub struct TriangleContext<'a> {
    pub material: &'a Material,
    /// World-space corners
    pub world: [Vec3; 3],
    /// Normalized screen-space corners (x, depth, z)
    pub screen: [Vec3; 3],
    /// World-space face normal
    pub face_normal: Vec3,
    /// World-space vertex normals
    pub vertex_normals: [Vec3; 3],
}

impl TriangleContext<'_> {
    pub fn centroid(&self) -> Vec3 {
        (self.world[0] + self.world[1] + self.world[2]) / 3.0
    }

    /// Blend three per-corner values with barycentric weights
    pub fn blend(w: [f64; 3], v: [Vec3; 3]) -> Vec3 {
        v[0] * w[0] + v[1] * w[1] + v[2] * w[2]
    }
}

/// One accepted pixel
#[derive(Debug, Clone, Copy)]
pub struct PixelContext {
    /// Barycentric weights against the triangle's corners
    pub weights: [f64; 3],
    /// Interpolated normalized depth
    pub depth: f64,
}

/// Light and viewer state shared by the Phong-Blinn shaders, resolved once per frame
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub light_intensity: f64,
    pub camera_position: Vec3,
    pub ambient: Vec3,
}

impl Lighting {
    /// Phong-Blinn reflectance at `point` with unit normal `normal`, as linear RGB.
    ///
    /// A point sitting exactly on the light gets ambient only.
    pub fn phong_blinn(&self, material: &Material, point: Vec3, normal: Vec3) -> Vec3 {
        let ambient = self.ambient * material.ka;

        let to_light = self.light_position - point;
        let dist_sq = to_light.len_squared();
        if dist_sq == 0.0 {
            return ambient;
        }

        let l = to_light.normalize();
        let v = (self.camera_position - point).normalize();
        let h = (l + v).normalize();

        let cos = l.dot(normal).max(0.0);
        let irradiance = self.light_color * (self.light_intensity * cos / dist_sq);
        let diffuse = material.diffuse_color * (material.kd / PI);
        let specular = material.specular_color * (material.ks * normal.dot(h).max(0.0).powf(material.ke));

        (diffuse + specular).mul_elem(irradiance) + ambient
    }
}

/// A shading strategy
pub trait Shader {
    /// Skip triangles facing away from the camera
    fn culls_back_faces(&self) -> bool {
        true
    }

    /// Resolve visibility with the depth buffer
    fn depth_tested(&self) -> bool {
        true
    }

    /// Called once per triangle before its pixels
    fn begin_triangle(&mut self, _tri: &TriangleContext) {}

    fn shade(&self, tri: &TriangleContext, px: &PixelContext) -> Color;
}

/// Fixed color, every triangle, no visibility resolution
pub struct SilhouetteShader;

impl Shader for SilhouetteShader {
    fn culls_back_faces(&self) -> bool {
        false
    }

    fn depth_tested(&self) -> bool {
        false
    }

    fn shade(&self, _tri: &TriangleContext, _px: &PixelContext) -> Color {
        SILHOUETTE_COLOR
    }
}

/// One reflectance evaluation per face, at the centroid with the face normal
pub struct FlatShader {
    lighting: Lighting,
    face_color: Color,
}

impl FlatShader {
    pub fn new(lighting: Lighting) -> Self {
        Self { lighting, face_color: Color::BLACK }
    }
}

impl Shader for FlatShader {
    fn begin_triangle(&mut self, tri: &TriangleContext) {
        let rgb = self.lighting.phong_blinn(tri.material, tri.centroid(), tri.face_normal);
        self.face_color = Color::from_unit(rgb);
    }

    fn shade(&self, _tri: &TriangleContext, _px: &PixelContext) -> Color {
        self.face_color
    }
}

/// Full reflectance per pixel with interpolated normal and position
pub struct PhongBlinnShader {
    lighting: Lighting,
}

impl PhongBlinnShader {
    pub fn new(lighting: Lighting) -> Self {
        Self { lighting }
    }
}

impl Shader for PhongBlinnShader {
    fn shade(&self, tri: &TriangleContext, px: &PixelContext) -> Color {
        let normal = TriangleContext::blend(px.weights, tri.vertex_normals).normalize();
        let point = TriangleContext::blend(px.weights, tri.world);
        Color::from_unit(self.lighting.phong_blinn(tri.material, point, normal))
    }
}

/// Weights as RGB
pub struct BarycentricShader;

impl Shader for BarycentricShader {
    fn shade(&self, _tri: &TriangleContext, px: &PixelContext) -> Color {
        let [a, b, c] = px.weights;
        Color::from_unit(Vec3::new(a, b, c))
    }
}

/// Depth mapped onto a precomputed [min, max] range, near dark, far bright
pub struct DepthShader {
    min: f64,
    range: f64,
}

impl DepthShader {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, range: max - min }
    }
}

impl Shader for DepthShader {
    fn shade(&self, _tri: &TriangleContext, px: &PixelContext) -> Color {
        if self.range <= 0.0 {
            return Color::BLACK;
        }
        Color::gray(unit_to_channel((px.depth - self.min) / self.range))
    }
}

/// Build the shader for a mode. `depth_range` is only used by `ShadingMode::Depth`.
pub fn shader_for(mode: ShadingMode, lighting: Lighting, depth_range: (f64, f64)) -> Box<dyn Shader> {
    match mode {
        ShadingMode::None => Box::new(SilhouetteShader),
        ShadingMode::Flat => Box::new(FlatShader::new(lighting)),
        ShadingMode::Barycentric => Box::new(BarycentricShader),
        ShadingMode::Depth => Box::new(DepthShader::new(depth_range.0, depth_range.1)),
        ShadingMode::PhongBlinn => Box::new(PhongBlinnShader::new(lighting)),
    }
}
