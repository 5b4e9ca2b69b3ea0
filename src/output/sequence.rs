//! Animated output: a numbered PNG per frame, then a looping GIF

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};
use indicatif::{ProgressBar, ProgressStyle};
use super::sink::PixelSink;
use crate::error::{RenderError, Result};
use crate::rasterizer::{RenderSettings, Renderer};
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct SequenceOptions {
    /// Frames per second, > 0
    pub fps: f64,
    /// Seconds, >= 0
    pub duration: f64,
    /// Directory receiving `frame_NNN.png`
    pub frame_dir: PathBuf,
    pub gif_path: PathBuf,
    /// Leave the per-frame PNGs on disk after the GIF is written
    pub keep_frames: bool,
}

impl SequenceOptions {
    /// `floor(fps * duration)`
    pub fn frame_count(&self) -> Result<usize> {
        if !(self.fps > 0.0) || !self.fps.is_finite() {
            return Err(RenderError::InvalidDimensions(format!("fps must be > 0, got {}", self.fps)));
        }
        if !(self.duration >= 0.0) || !self.duration.is_finite() {
            return Err(RenderError::InvalidDimensions(format!(
                "duration must be >= 0, got {}",
                self.duration
            )));
        }
        Ok((self.fps * self.duration).floor() as usize)
    }

    /// Scene time of frame `index`
    pub fn frame_time(&self, index: usize) -> f64 {
        index as f64 / self.fps
    }

    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.frame_dir.join(format!("frame_{:03}.png", index))
    }
}

/// What `render_sequence` left on disk
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReport {
    pub frame_count: usize,
    pub gif_path: PathBuf,
    /// Per-frame PNGs still on disk (empty unless `keep_frames`)
    pub frames: Vec<PathBuf>,
}

/// Render every frame of an animation through `sink` and assemble the GIF
pub fn render_sequence(
    renderer: &Renderer,
    scene: &mut Scene,
    settings: &RenderSettings,
    options: &SequenceOptions,
    sink: &mut dyn PixelSink,
) -> Result<SequenceReport> {
    let count = options.frame_count()?;
    if count == 0 {
        return Err(RenderError::InvalidDimensions(format!(
            "{} fps over {} s gives no frames",
            options.fps, options.duration
        )));
    }

    fs::create_dir_all(&options.frame_dir)?;
    scene.reset();

    log::info!(
        "rendering {} frames at {} fps into {}",
        count,
        options.fps,
        options.frame_dir.display()
    );

    let progress = ProgressBar::new(count as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} frames")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut frames = Vec::with_capacity(count);
    for index in 0..count {
        let time = options.frame_time(index);
        let frame = renderer.render(scene, settings, time);
        sink.draw(&frame)?;

        let path = options.frame_path(index);
        sink.save(&path)?;
        frames.push(path);
        progress.inc(1);
    }
    progress.finish_and_clear();

    assemble_gif(&frames, &options.gif_path, options.fps)?;
    log::info!("wrote {}", options.gif_path.display());

    if !options.keep_frames {
        for path in frames.drain(..) {
            fs::remove_file(&path)?;
        }
    }

    Ok(SequenceReport {
        frame_count: count,
        gif_path: options.gif_path.clone(),
        frames,
    })
}

/// Milliseconds each GIF frame stays up: `max(1000 / fps, 1)`
pub fn frame_delay_ms(fps: f64) -> u32 {
    ((1000.0 / fps) as u32).max(1)
}

/// Combine image files, in order, into an infinitely looping GIF
pub fn assemble_gif(frames: &[PathBuf], path: &Path, fps: f64) -> Result<()> {
    if frames.is_empty() {
        return Err(RenderError::InvalidDimensions("no frames to assemble".to_string()));
    }
    if !(fps > 0.0) {
        return Err(RenderError::InvalidDimensions(format!("fps must be > 0, got {}", fps)));
    }

    let delay = Delay::from_numer_denom_ms(frame_delay_ms(fps), 1);
    let mut encoder = GifEncoder::new(BufWriter::new(File::create(path)?));
    encoder.set_repeat(Repeat::Infinite)?;

    for frame_path in frames {
        let rgba = image::open(frame_path)?.to_rgba8();
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
    }
    Ok(())
}
