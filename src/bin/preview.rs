//! soft-render-preview: play a scene in a window
//!
//! Frames are rendered on the fly at the scene's frame rate and loop over
//! the animation. Escape closes the window.

use anyhow::{bail, Context, Result};
use macroquad::prelude::*;
use soft_render::{load_scene, FrameBuffer, RenderSettings, Renderer, Scene, VERSION};

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Soft Render Preview v{}", VERSION),
        window_width: 960,
        window_height: 720,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

struct Playback {
    renderer: Renderer,
    scene: Scene,
    settings: RenderSettings,
    fps: f64,
    duration: f64,
}

impl Playback {
    fn load(path: &str) -> Result<Self> {
        let file = load_scene(path).with_context(|| format!("loading {}", path))?;
        let (renderer, scene) = file.build().with_context(|| format!("building {}", path))?;
        if texture_size(&renderer).is_none() {
            bail!(
                "{}x{} is too large for a preview texture (max {} per side)",
                renderer.width(),
                renderer.height(),
                u16::MAX
            );
        }
        let (fps, duration) = match file.animation {
            Some(anim) => (anim.fps, anim.duration),
            None => (1.0, 0.0),
        };
        Ok(Self {
            renderer,
            scene,
            settings: file.settings,
            fps,
            duration,
        })
    }

    /// Frame index at `elapsed` seconds, wrapping at the end of the animation
    fn frame_at(&self, elapsed: f64) -> usize {
        let count = (self.fps * self.duration).floor() as usize;
        if count == 0 {
            return 0;
        }
        (elapsed * self.fps).floor() as usize % count
    }

    fn render(&mut self, frame: usize) -> FrameBuffer {
        let time = frame as f64 / self.fps;
        self.renderer.render(&mut self.scene, &self.settings, time)
    }
}

/// Texture dimensions, if both sides fit in a `u16`
fn texture_size(renderer: &Renderer) -> Option<(u16, u16)> {
    Some((u16::try_from(renderer.width()).ok()?, u16::try_from(renderer.height()).ok()?))
}

fn upload(fb: &FrameBuffer) -> Texture2D {
    // Sizes were checked in `Playback::load`
    let (w, h) = (
        u16::try_from(fb.width()).unwrap_or(u16::MAX),
        u16::try_from(fb.height()).unwrap_or(u16::MAX),
    );
    let texture = Texture2D::from_rgba8(w, h, &fb.to_rgba_bytes());
    texture.set_filter(FilterMode::Nearest);
    texture
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: soft-render-preview <scene.ron>");
        return;
    };
    let mut playback = match Playback::load(&path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{:#}", e);
            return;
        }
    };

    let start = get_time();
    let mut shown = 0;
    let mut texture = upload(&playback.render(shown));

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        let frame = playback.frame_at(get_time() - start);
        if frame != shown {
            shown = frame;
            texture = upload(&playback.render(frame));
        }

        clear_background(BLACK);

        // Fit the frame to the window, keeping its aspect ratio
        let (fb_w, fb_h) = (playback.renderer.width() as f32, playback.renderer.height() as f32);
        let scale = (screen_width() / fb_w).min(screen_height() / fb_h);
        let (draw_w, draw_h) = (fb_w * scale, fb_h * scale);
        let draw_x = (screen_width() - draw_w) * 0.5;
        let draw_y = (screen_height() - draw_h) * 0.5;

        draw_texture_ex(
            &texture,
            draw_x,
            draw_y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );

        next_frame().await;
    }
}
