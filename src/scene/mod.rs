//! Scene contents: camera, meshes and a point light

mod camera;
mod file;
mod light;
mod mesh;
mod primitives;
mod stl;

pub use camera::*;
pub use file::*;
pub use light::*;
pub use mesh::*;
pub use primitives::*;
pub use stl::*;

/// Everything the renderer draws in one frame.
///
/// Curves keep scan cursors, so a scene is evaluated from one thread at a
/// time. Clone it to render frames in parallel.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
    pub light: PointLight,
}

impl Scene {
    pub fn new(camera: Camera, light: PointLight) -> Self {
        Self {
            camera,
            meshes: Vec::new(),
            light,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// Latest keyframe time over every transform in the scene, 0 when nothing animates
    pub fn end_time(&self) -> f64 {
        std::iter::once(self.camera.transform())
            .chain(std::iter::once(&self.light.transform))
            .chain(self.meshes.iter().map(|m| &m.transform))
            .filter_map(|t| t.end_time())
            .fold(0.0, f64::max)
    }

    /// Rewind all curve cursors
    pub fn reset(&self) {
        self.camera.transform().reset();
        self.light.transform.reset();
        for mesh in &self.meshes {
            mesh.transform.reset();
        }
    }
}
