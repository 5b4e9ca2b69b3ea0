//! Core rendering functions
//! Triangle projection, bounding-box scan conversion and depth testing

use super::framebuffer::{DepthBuffer, FrameBuffer};
use super::math::{display_to_screen, screen_to_display, weights_inside, Barycentric, Vec3};
use super::shading::{shader_for, Lighting, PixelContext, Shader, TriangleContext};
use super::types::{RenderSettings, ShadingMode};
use crate::error::{RenderError, Result};
use crate::scene::{Camera, Mesh, Scene};

/// Per-frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Triangles that reached scan conversion
    pub rasterized: usize,
    /// Back faces skipped
    pub culled: usize,
    /// Zero screen-space area or non-finite projection
    pub degenerate: usize,
    /// Entirely outside the viewport
    pub offscreen: usize,
    /// Pixels written
    pub pixels: usize,
}

/// Projected vertex data for one mesh at one instant
struct MeshFrame<'a> {
    mesh: &'a Mesh,
    world: Vec<Vec3>,
    screen: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl<'a> MeshFrame<'a> {
    fn new(mesh: &'a Mesh, camera: &Camera, time: f64) -> Self {
        let m = mesh.transform.matrix(time);
        let world: Vec<Vec3> = mesh.vertices().iter().map(|&v| m.transform_point(v)).collect();
        let screen = world.iter().map(|&p| camera.project_point(p)).collect();
        let normals = mesh.vertex_normals().iter().map(|&n| m.transform_vector(n)).collect();
        Self { mesh, world, screen, normals }
    }

    fn face_normal(&self, face_idx: usize, time: f64) -> Vec3 {
        let n = self.mesh.face_normals()[face_idx].normalize();
        self.mesh.transform.apply_to_normal(n, time)
    }

    fn triangle(&self, face_idx: usize, face_normal: Vec3) -> TriangleContext<'a> {
        let mesh: &'a Mesh = self.mesh;
        let [a, b, c] = mesh.faces()[face_idx];
        TriangleContext {
            material: &mesh.material,
            world: [self.world[a], self.world[b], self.world[c]],
            screen: [self.screen[a], self.screen[b], self.screen[c]],
            face_normal,
            vertex_normals: [self.normals[a], self.normals[b], self.normals[c]],
        }
    }
}

/// Software renderer for a fixed output size
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    width: usize,
    height: usize,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "render target must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Render one frame of `scene` at `time`
    pub fn render(&self, scene: &mut Scene, settings: &RenderSettings, time: f64) -> FrameBuffer {
        self.render_with_stats(scene, settings, time).0
    }

    pub fn render_with_stats(
        &self,
        scene: &mut Scene,
        settings: &RenderSettings,
        time: f64,
    ) -> (FrameBuffer, FrameStats) {
        scene.camera.set_time(time);
        let scene = &*scene;
        let camera = &scene.camera;

        let mut fb = FrameBuffer::blank(self.width, self.height, settings.background);
        let mut depth = DepthBuffer::new(self.width, self.height);
        let mut stats = FrameStats::default();

        let lighting = Lighting {
            light_position: scene.light.position(time),
            light_color: scene.light.color(),
            light_intensity: scene.light.intensity(),
            camera_position: camera.position(),
            ambient: settings.ambient,
        };
        let view_dir = camera.view_dir();

        let frames: Vec<MeshFrame> = scene
            .meshes
            .iter()
            .map(|mesh| MeshFrame::new(mesh, camera, time))
            .collect();

        let depth_range = if settings.shading == ShadingMode::Depth {
            depth_range(&frames, view_dir, time)
        } else {
            (0.0, 0.0)
        };
        let mut shader = shader_for(settings.shading, lighting, depth_range);

        for frame in &frames {
            for face_idx in 0..frame.mesh.face_count() {
                let face_normal = frame.face_normal(face_idx, time);

                // Visible faces point toward the camera
                if shader.culls_back_faces() && face_normal.dot(view_dir) > 0.0 {
                    stats.culled += 1;
                    continue;
                }

                let tri = frame.triangle(face_idx, face_normal);
                self.rasterize_triangle(&mut fb, &mut depth, &tri, shader.as_mut(), &mut stats);
            }
        }

        log::debug!(
            "frame t={:.3} {}: {} rasterized, {} culled, {} degenerate, {} offscreen, {} pixels",
            time,
            settings.shading.label(),
            stats.rasterized,
            stats.culled,
            stats.degenerate,
            stats.offscreen,
            stats.pixels
        );

        (fb, stats)
    }

    /// Scan-convert one triangle over its clamped screen bounding box
    fn rasterize_triangle(
        &self,
        fb: &mut FrameBuffer,
        depth: &mut DepthBuffer,
        tri: &TriangleContext,
        shader: &mut dyn Shader,
        stats: &mut FrameStats,
    ) {
        let [s0, s1, s2] = tri.screen;
        if !(s0.is_finite() && s1.is_finite() && s2.is_finite()) {
            stats.degenerate += 1;
            return;
        }

        // Rasterization plane is (x, z); y is depth
        let Some(bary) = Barycentric::new((s0.x, s0.z), (s1.x, s1.z), (s2.x, s2.z)) else {
            stats.degenerate += 1;
            return;
        };

        let low = s0.min(s1).min(s2);
        let high = s0.max(s1).max(s2);
        if high.x < -1.0 || low.x > 1.0 || high.z < -1.0 || low.z > 1.0 {
            stats.offscreen += 1;
            return;
        }

        let (w, h) = (self.width, self.height);
        let min_x = clamp_index(screen_to_display(low.x, w), w);
        let max_x = clamp_index(screen_to_display(high.x, w), w);
        let min_z = clamp_index(screen_to_display(low.z, h), h);
        let max_z = clamp_index(screen_to_display(high.z, h), h);

        stats.rasterized += 1;
        shader.begin_triangle(tri);

        for j in min_z..=max_z {
            let pz = display_to_screen(j, h);
            // Screen z points up, rows count down
            let row = h - 1 - j;

            for i in min_x..=max_x {
                let weights = bary.weights((display_to_screen(i, w), pz));
                if !weights_inside(weights) {
                    continue;
                }

                let d = weights[0] * s0.y + weights[1] * s1.y + weights[2] * s2.y;
                if shader.depth_tested() {
                    if !(-1.0..=1.0).contains(&d) || !depth.test_and_set(i, row, d) {
                        continue;
                    }
                }

                let px = PixelContext { weights, depth: d };
                fb.set_pixel(i, row, shader.shade(tri, &px));
                stats.pixels += 1;
            }
        }
    }
}

/// Min and max projected depth over the corners of front-facing triangles,
/// clipped to [-1, 1]. `(0, 0)` when nothing is visible.
fn depth_range(frames: &[MeshFrame], view_dir: Vec3, time: f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for frame in frames {
        for (face_idx, face) in frame.mesh.faces().iter().enumerate() {
            if frame.face_normal(face_idx, time).dot(view_dir) > 0.0 {
                continue;
            }
            for &v in face {
                let d = frame.screen[v].y;
                if d.is_finite() {
                    let d = d.clamp(-1.0, 1.0);
                    min = min.min(d);
                    max = max.max(d);
                }
            }
        }
    }

    if min > max {
        return (0.0, 0.0);
    }
    if min == max {
        log::warn!("depth shading: all visible geometry sits at depth {}", min);
    }
    (min, max)
}

fn clamp_index(v: f64, size: usize) -> usize {
    v.clamp(0.0, (size - 1) as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Curve, Transform};
    use crate::rasterizer::{Color, SILHOUETTE_COLOR};
    use crate::scene::{Material, PointLight, SoupTriangle, ViewVolume};

    const W: usize = 40;
    const H: usize = 30;

    /// Orthographic camera at the origin looking down +Y, screen = world (x, z)
    fn ortho_scene() -> Scene {
        let camera = Camera::orthographic(ViewVolume::new(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0)).unwrap();
        let light = PointLight::new(1000.0, Vec3::ONE).unwrap();
        Scene::new(camera, light)
    }

    /// Triangle in the plane y = `depth`, facing the camera (-Y). The light in
    /// `ortho_scene` is bright enough to saturate `color`.
    fn facing(a: (f64, f64), b: (f64, f64), c: (f64, f64), depth: f64, color: Vec3) -> Mesh {
        let tri = SoupTriangle::new(
            Vec3::new(a.0, depth, a.1),
            Vec3::new(b.0, depth, b.1),
            Vec3::new(c.0, depth, c.1),
            -Vec3::Y,
        );
        let material = Material::new(color, Vec3::ZERO, 0.0, std::f64::consts::PI, 0.0, 1.0);
        Mesh::from_triangles(&[tri], material).unwrap()
    }

    fn settings(shading: ShadingMode) -> RenderSettings {
        RenderSettings {
            shading,
            background: Color::GRAY,
            ambient: Vec3::ONE,
        }
    }

    fn screen_of(i: usize, row: usize) -> (f64, f64) {
        (display_to_screen(i, W), display_to_screen(H - 1 - row, H))
    }

    #[test]
    fn test_rejects_zero_size() {
        assert!(Renderer::new(0, 10).is_err());
        assert!(Renderer::new(10, 0).is_err());
    }

    #[test]
    fn test_empty_scene_is_background() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        for mode in ShadingMode::ALL {
            let fb = renderer.render(&mut scene, &settings(mode), 0.0);
            assert_eq!(fb.count_not(Color::GRAY), 0);
        }
    }

    #[test]
    fn test_coverage_matches_barycentric_test() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        let (a, b, c) = ((-0.7, -0.6), (0.8, -0.4), (0.1, 0.75));
        scene.add_mesh(facing(a, b, c, 5.0, Vec3::new(1.0, 0.0, 0.0)));

        let fb = renderer.render(&mut scene, &settings(ShadingMode::None), 0.0);
        let bary = Barycentric::new(a, b, c).unwrap();
        let mut inside = 0;
        for row in 0..H {
            for i in 0..W {
                let expected = weights_inside(bary.weights(screen_of(i, row)));
                let painted = fb.get_pixel(i, row) == SILHOUETTE_COLOR;
                assert_eq!(expected, painted, "pixel ({}, {})", i, row);
                inside += expected as usize;
            }
        }
        assert!(inside > 100);
    }

    #[test]
    fn test_nearer_triangle_wins_in_any_order() {
        let renderer = Renderer::new(W, H).unwrap();
        let red = facing((-0.9, -0.9), (0.9, -0.9), (0.0, 0.9), 3.0, Vec3::new(1.0, 0.0, 0.0));
        let blue = facing((-0.9, 0.9), (0.0, -0.9), (0.9, 0.9), 7.0, Vec3::new(0.0, 0.0, 1.0));

        for order in [[red.clone(), blue.clone()], [blue.clone(), red.clone()]] {
            let mut scene = ortho_scene();
            for mesh in order {
                scene.add_mesh(mesh);
            }
            let fb = renderer.render(&mut scene, &settings(ShadingMode::Flat), 0.0);
            // Center overlaps both
            assert_eq!(fb.get_pixel(W / 2, H / 2), Color::new(255, 0, 0));
            for row in 0..H {
                for i in 0..W {
                    let p = screen_of(i, row);
                    let in_red = weights_inside(Barycentric::new((-0.9, -0.9), (0.9, -0.9), (0.0, 0.9)).unwrap().weights(p));
                    if in_red {
                        assert_eq!(fb.get_pixel(i, row), Color::new(255, 0, 0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_shared_edge_pixels_belong_to_both_and_first_wins_ties() {
        let renderer = Renderer::new(W, H).unwrap();
        // Shared edge b-c runs down the centers of column 20
        let x = display_to_screen(20, W);
        let left = facing((-0.8, 0.0), (x, -0.8), (x, 0.8), 5.0, Vec3::new(1.0, 0.0, 0.0));
        let right = facing((0.8, 0.0), (x, -0.8), (x, 0.8), 5.0, Vec3::new(0.0, 0.0, 1.0));
        let edge_rows: Vec<usize> = (0..H).filter(|&row| screen_of(20, row).1.abs() < 0.7).collect();
        assert!(edge_rows.len() > 10);

        // Silhouettes: each triangle alone covers the edge
        for mesh in [&left, &right] {
            let mut scene = ortho_scene();
            scene.add_mesh(mesh.clone());
            let fb = renderer.render(&mut scene, &settings(ShadingMode::None), 0.0);
            for &row in &edge_rows {
                assert_eq!(fb.get_pixel(20, row), SILHOUETTE_COLOR, "row {}", row);
            }
        }

        // Both sit at the same depth, so the first one drawn keeps the edge
        let alone = |mesh: &Mesh| {
            let mut scene = ortho_scene();
            scene.add_mesh(mesh.clone());
            renderer.render(&mut scene, &settings(ShadingMode::Flat), 0.0)
        };
        let (left_fb, right_fb) = (alone(&left), alone(&right));
        for (first, second, first_fb) in [(&left, &right, &left_fb), (&right, &left, &right_fb)] {
            let mut scene = ortho_scene();
            scene.add_mesh(first.clone());
            scene.add_mesh(second.clone());
            let fb = renderer.render(&mut scene, &settings(ShadingMode::Flat), 0.0);
            for &row in &edge_rows {
                assert_ne!(left_fb.get_pixel(20, row), right_fb.get_pixel(20, row));
                assert_eq!(fb.get_pixel(20, row), first_fb.get_pixel(20, row), "row {}", row);
            }
        }
    }

    #[test]
    fn test_back_faces_are_culled() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        let tri = SoupTriangle::new(
            Vec3::new(-0.5, 2.0, -0.5),
            Vec3::new(0.5, 2.0, -0.5),
            Vec3::new(0.0, 2.0, 0.5),
            Vec3::Y,
        );
        scene.add_mesh(Mesh::from_triangles(&[tri], Material::default()).unwrap());

        let (fb, stats) = renderer.render_with_stats(&mut scene, &settings(ShadingMode::Flat), 0.0);
        assert_eq!(stats.culled, 1);
        assert_eq!(fb.count_not(Color::GRAY), 0);

        // Silhouette mode ignores facing
        let fb = renderer.render(&mut scene, &settings(ShadingMode::None), 0.0);
        assert!(fb.count_not(Color::GRAY) > 0);
    }

    #[test]
    fn test_degenerate_and_offscreen_are_skipped() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        scene.add_mesh(facing((-0.5, 0.0), (0.0, 0.0), (0.5, 0.0), 5.0, Vec3::ONE));
        scene.add_mesh(facing((2.0, 2.0), (3.0, 2.0), (2.5, 3.0), 5.0, Vec3::ONE));
        let (fb, stats) = renderer.render_with_stats(&mut scene, &settings(ShadingMode::PhongBlinn), 0.0);
        assert_eq!(stats.degenerate, 1);
        assert_eq!(stats.offscreen, 1);
        assert_eq!(stats.pixels, 0);
        assert_eq!(fb.count_not(Color::GRAY), 0);
    }

    #[test]
    fn test_outside_depth_range_is_clipped() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        // y = 12 maps past the far plane
        scene.add_mesh(facing((-0.9, -0.9), (0.9, -0.9), (0.0, 0.9), 12.0, Vec3::ONE));
        let fb = renderer.render(&mut scene, &settings(ShadingMode::Flat), 0.0);
        assert_eq!(fb.count_not(Color::GRAY), 0);
    }

    #[test]
    fn test_barycentric_mode_colors() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        scene.add_mesh(facing((-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), 5.0, Vec3::ONE));
        let fb = renderer.render(&mut scene, &settings(ShadingMode::Barycentric), 0.0);
        // Bottom-left pixel is dominated by the first corner
        let px = fb.get_pixel(0, H - 1);
        assert!(px.r > 240 && px.g < 15 && px.b < 15);
        // Bottom-right of the covered area leans to the second corner
        let px = fb.get_pixel(W - 2, H - 1);
        assert!(px.g > px.r && px.g > px.b);
    }

    #[test]
    fn test_depth_mode_near_is_darker() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        scene.add_mesh(facing((-0.9, -0.9), (-0.1, -0.9), (-0.5, 0.9), 2.0, Vec3::ONE));
        scene.add_mesh(facing((0.1, -0.9), (0.9, -0.9), (0.5, 0.9), 8.0, Vec3::ONE));
        let fb = renderer.render(&mut scene, &settings(ShadingMode::Depth), 0.0);
        let near = fb.get_pixel(W / 4, H / 2);
        let far = fb.get_pixel(3 * W / 4, H / 2);
        assert!(near.r <= 1 && near.r == near.g && near.g == near.b);
        assert!(far.r >= 254 && far.r == far.g && far.g == far.b);
    }

    #[test]
    fn test_flat_center_brighter_than_edge() {
        let renderer = Renderer::new(64, 64).unwrap();
        let camera = Camera::perspective(ViewVolume::new(-1.0, 1.0, -1.0, 1.0, 1.0, 10.0))
            .unwrap()
            .with_transform(Transform::new().with_position(0.0, -2.0, 0.0));
        // Light directly above the triangle's center, toward the camera
        let light = PointLight::new(2.0, Vec3::ONE)
            .unwrap()
            .with_transform(Transform::new().with_position(0.0, -1.0, 0.0));
        let mut scene = Scene::new(camera, light);

        // Unit-size patch split into small triangles so flat shading varies with position
        let material = Material::new(Vec3::ONE, Vec3::ZERO, 0.0, 1.0, 0.0, 1.0);
        let mut tris = Vec::new();
        let n = 8;
        let cell = 1.0 / n as f64;
        for row in 0..n {
            for col in 0..n {
                let x0 = -0.5 + col as f64 * cell;
                let z0 = -0.5 + row as f64 * cell;
                let a = Vec3::new(x0, 0.0, z0);
                let b = Vec3::new(x0 + cell, 0.0, z0);
                let c = Vec3::new(x0 + cell, 0.0, z0 + cell);
                let d = Vec3::new(x0, 0.0, z0 + cell);
                tris.push(SoupTriangle::new(a, b, c, -Vec3::Y));
                tris.push(SoupTriangle::new(a, c, d, -Vec3::Y));
            }
        }
        scene.add_mesh(Mesh::from_triangles(&tris, material).unwrap());

        let mut s = settings(ShadingMode::Flat);
        s.ambient = Vec3::ZERO;
        let fb = renderer.render(&mut scene, &s, 0.0);
        let center = fb.get_pixel(32, 32);
        // Find the outermost painted pixel along the center row
        let edge_x = (32..64).take_while(|&x| fb.get_pixel(x, 32) != Color::GRAY).last().unwrap();
        let edge = fb.get_pixel(edge_x, 32);
        assert!(edge_x > 32);
        assert!(center.r > edge.r);

        let mut s = settings(ShadingMode::PhongBlinn);
        s.ambient = Vec3::ZERO;
        let fb = renderer.render(&mut scene, &s, 0.0);
        assert!(fb.get_pixel(32, 32).r > fb.get_pixel(edge_x, 32).r);
    }

    #[test]
    fn test_animation_moves_geometry() {
        let renderer = Renderer::new(W, H).unwrap();
        let mut scene = ortho_scene();
        let slide = Curve::linear(&[(-0.5, 0.0), (0.5, 1.0)]).unwrap();
        let mesh = facing((-0.3, -0.3), (0.3, -0.3), (0.0, 0.3), 5.0, Vec3::ONE)
            .with_transform(Transform::new().with_position(slide, 0.0, 0.0));
        scene.add_mesh(mesh);

        let s = settings(ShadingMode::None);
        let start = renderer.render(&mut scene, &s, 0.0);
        let end = renderer.render(&mut scene, &s, 1.0);
        assert_eq!(start.get_pixel(W / 4, H / 2), SILHOUETTE_COLOR);
        assert_eq!(start.get_pixel(3 * W / 4, H / 2), Color::GRAY);
        assert_eq!(end.get_pixel(3 * W / 4, H / 2), SILHOUETTE_COLOR);
        assert_eq!(end.get_pixel(W / 4, H / 2), Color::GRAY);

        // Same time, same frame
        let again = renderer.render(&mut scene, &s, 0.0);
        assert_eq!(again, start);
    }
}
