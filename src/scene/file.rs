//! Scene description files (RON)
//!
//! A scene file lists the output size, camera, light, meshes and shading
//! settings. `build` validates everything and produces a ready-to-render
//! `Renderer` and `Scene`.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use super::camera::{Camera, Projection, ViewVolume};
use super::light::PointLight;
use super::mesh::{Material, Mesh, SoupTriangle};
use super::primitives::{unit_cube, uv_sphere};
use super::stl::load_stl;
use super::Scene;
use crate::animation::Transform;
use crate::error::{RenderError, Result};
use crate::rasterizer::{RenderSettings, Renderer, Vec3};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDesc {
    pub projection: Projection,
    pub volume: ViewVolume,
    pub transform: Transform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightDesc {
    pub intensity: f64,
    pub color: Vec3,
    pub transform: Transform,
}

impl Default for LightDesc {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            color: Vec3::ONE,
            transform: Transform::new(),
        }
    }
}

/// Mesh geometry source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Unit cube centered on the origin
    Cube,
    /// Radius 0.5 sphere centered on the origin
    Sphere { segments: usize, rings: usize },
    /// Explicit triangle soup
    Triangles(Vec<SoupTriangle>),
    /// ASCII or binary STL model. Relative paths in a scene file are relative to that file.
    Stl(PathBuf),
}

impl Geometry {
    pub fn triangles(&self) -> Result<Vec<SoupTriangle>> {
        match self {
            Geometry::Cube => Ok(unit_cube()),
            Geometry::Sphere { segments, rings } => Ok(uv_sphere(*segments, *rings)),
            Geometry::Triangles(tris) => Ok(tris.clone()),
            Geometry::Stl(path) => load_stl(path),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDesc {
    pub geometry: Geometry,
    #[serde(default)]
    pub material: Material,
    #[serde(default)]
    pub transform: Transform,
}

/// Frame timing for animated output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationDesc {
    pub fps: f64,
    /// Seconds
    pub duration: f64,
}

/// Top-level scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub camera: CameraDesc,
    #[serde(default)]
    pub light: LightDesc,
    #[serde(default)]
    pub meshes: Vec<MeshDesc>,
    #[serde(default)]
    pub settings: RenderSettings,
    /// Present for animated scenes
    #[serde(default)]
    pub animation: Option<AnimationDesc>,
}

impl SceneFile {
    /// Validate the description and build the renderer and scene
    pub fn build(&self) -> Result<(Renderer, Scene)> {
        let renderer = Renderer::new(self.width, self.height)?;

        let camera = Camera::new(self.camera.projection, self.camera.volume)?
            .with_transform(self.camera.transform.clone());
        let light = PointLight::new(self.light.intensity, self.light.color)?
            .with_transform(self.light.transform.clone());

        let mut scene = Scene::new(camera, light);
        for (i, desc) in self.meshes.iter().enumerate() {
            let mesh = Mesh::from_triangles(&desc.geometry.triangles()?, desc.material).map_err(|e| match e {
                RenderError::InvalidGeometry(msg) => RenderError::InvalidGeometry(format!("mesh {}: {}", i, msg)),
                RenderError::InvalidMaterial(msg) => RenderError::InvalidMaterial(format!("mesh {}: {}", i, msg)),
                other => other,
            })?;
            scene.add_mesh(mesh.with_transform(desc.transform.clone()));
        }

        if let Some(anim) = self.animation {
            if !(anim.fps > 0.0) || !(anim.duration >= 0.0) {
                return Err(RenderError::InvalidDimensions(format!(
                    "animation needs fps > 0 and duration >= 0, got fps {} duration {}",
                    anim.fps, anim.duration
                )));
            }
        }

        Ok((renderer, scene))
    }

    /// Anchor relative model paths at `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for desc in &mut self.meshes {
            if let Geometry::Stl(path) = &mut desc.geometry {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut scene = load_scene_from_str(&contents)?;
    if let Some(dir) = path.parent() {
        scene.resolve_paths(dir);
    }
    log::info!(
        "loaded {}: {}x{}, {} meshes",
        path.display(),
        scene.width,
        scene.height,
        scene.meshes.len()
    );
    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &SceneFile, path: P) -> Result<()> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene from a RON string (for embedded scenes or testing)
pub fn load_scene_from_str(s: &str) -> Result<SceneFile> {
    Ok(ron::from_str(s)?)
}
