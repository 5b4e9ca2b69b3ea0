// cli.rs - Command-line interface for the headless renderer
use std::path::PathBuf;
use clap::Parser;
use soft_render::ShadingMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "soft-render", version)]
#[command(about = "Render a RON scene to a PNG still or a looping GIF", long_about = None)]
pub struct Cli {
    /// Scene description (RON)
    pub scene: PathBuf,

    /// Output file; a .gif extension renders the animation
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Scene time for a still frame, in seconds
    #[arg(long, default_value_t = 0.0)]
    pub time: f64,

    /// Override the scene's shading (none, flat, barycentric, depth, phong-blinn)
    #[arg(long, value_parser = parse_shading)]
    pub shading: Option<ShadingMode>,

    /// Override the scene's frame rate
    #[arg(long)]
    pub fps: Option<f64>,

    /// Override the scene's animation length, in seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Directory for per-frame PNGs (defaults to the output's directory)
    #[arg(long)]
    pub frame_dir: Option<PathBuf>,

    /// Keep per-frame PNGs after the GIF is written
    #[arg(long, default_value = "false")]
    pub keep_frames: bool,
}

fn parse_shading(s: &str) -> Result<ShadingMode, String> {
    ShadingMode::from_label(s).ok_or_else(|| {
        let labels: Vec<&str> = ShadingMode::ALL.iter().map(|m| m.label()).collect();
        format!("unknown shading '{}', expected one of: {}", s, labels.join(", "))
    })
}
