//! soft-render: headless renderer
//!
//! Renders a RON scene to a PNG still, or to a looping GIF when the output
//! path ends in `.gif`.

mod cli;

use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::Parser;
use soft_render::output::{render_sequence, ImageSink, PixelSink, SequenceOptions};
use soft_render::load_scene;
use cli::Cli;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file = load_scene(&cli.scene).with_context(|| format!("loading {}", cli.scene.display()))?;
    let (renderer, mut scene) = file.build().with_context(|| format!("building {}", cli.scene.display()))?;

    let mut settings = file.settings.clone();
    if let Some(shading) = cli.shading {
        settings.shading = shading;
    }
    let mut sink = ImageSink::new(renderer.width(), renderer.height())?;

    if !is_gif(&cli.output) {
        let frame = renderer.render(&mut scene, &settings, cli.time);
        sink.draw(&frame)?;
        sink.save(&cli.output)
            .with_context(|| format!("writing {}", cli.output.display()))?;
        println!("Wrote {}", cli.output.display());
        return Ok(());
    }

    let animation = file.animation;
    let fps = match cli.fps.or(animation.map(|a| a.fps)) {
        Some(fps) => fps,
        None => bail!("{} has no animation section; pass --fps", cli.scene.display()),
    };
    // Without a duration, play until the last keyframe
    let duration = cli
        .duration
        .or(animation.map(|a| a.duration))
        .unwrap_or_else(|| scene.end_time());

    let frame_dir = cli.frame_dir.clone().unwrap_or_else(|| parent_dir(&cli.output));
    let options = SequenceOptions {
        fps,
        duration,
        frame_dir,
        gif_path: cli.output.clone(),
        keep_frames: cli.keep_frames,
    };

    let report = render_sequence(&renderer, &mut scene, &settings, &options, &mut sink)
        .with_context(|| format!("rendering {}", cli.output.display()))?;
    println!("Wrote {} frames to {}", report.frame_count, report.gif_path.display());
    Ok(())
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gif"))
        .unwrap_or(false)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
