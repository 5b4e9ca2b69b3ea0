//! Pixel sinks: destinations for finished frames

use std::path::Path;
use image::RgbImage;
use crate::error::{RenderError, Result};
use crate::rasterizer::FrameBuffer;

/// Destination for rendered frames of a fixed size
pub trait PixelSink {
    /// Copy a frame in. Fails if the frame's size differs from the sink's.
    fn draw(&mut self, frame: &FrameBuffer) -> Result<()>;

    /// Write the last drawn frame to `path`
    fn save(&self, path: &Path) -> Result<()>;
}

/// In-memory RGB image, saved in the format implied by the file extension
pub struct ImageSink {
    image: RgbImage,
}

impl ImageSink {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "image sink must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        let (w, h) = dimensions(width, height)?;
        Ok(Self { image: RgbImage::new(w, h) })
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

impl PixelSink for ImageSink {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<()> {
        let expected = (self.width(), self.height());
        let actual = (frame.width(), frame.height());
        if expected != actual {
            return Err(RenderError::ShapeMismatch { expected, actual });
        }
        self.image = frame.to_rgb_image();
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

fn dimensions(width: usize, height: usize) -> Result<(u32, u32)> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(RenderError::InvalidDimensions(format!("{}x{} is too large for an image", width, height))),
    }
}
