//! Color and depth buffers for one frame

use super::types::Color;
use crate::error::{RenderError, Result};

/// RGB framebuffer, row-major, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    pixels: Vec<u8>, // RGB, 3 bytes per pixel
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, Color::BLACK)
    }

    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions(format!(
                "framebuffer must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        Ok(Self::blank(width, height, color))
    }

    /// Caller guarantees a non-zero size
    pub(crate) fn blank(width: usize, height: usize, color: Color) -> Self {
        let mut fb = Self {
            pixels: vec![0; width * height * 3],
            width,
            height,
        };
        fb.clear(color);
        fb
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            self.pixels[idx..idx + 3].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 3;
            Color::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2])
        } else {
            Color::BLACK
        }
    }

    /// Number of pixels not equal to `color`
    pub fn count_not(&self, color: Color) -> usize {
        self.pixels
            .chunks_exact(3)
            .filter(|px| px[..] != color.to_bytes()[..])
            .count()
    }

    /// Copy into an `image` buffer for encoding
    pub fn to_rgb_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgb(self.get_pixel(x as usize, y as usize).to_bytes())
        })
    }

    /// RGBA bytes with opaque alpha (for GPU textures)
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect()
    }
}

/// Per-pixel depth, reset to `DepthBuffer::FAR` at frame start
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    values: Vec<f64>,
    width: usize,
}

impl DepthBuffer {
    /// Beyond the valid normalized depth range [-1, 1]
    pub const FAR: f64 = 2.0;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            values: vec![Self::FAR; width * height],
            width,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Store `depth` if it is strictly nearer than what is there. Ties keep the first writer.
    pub fn test_and_set(&mut self, x: usize, y: usize, depth: f64) -> bool {
        let idx = y * self.width + x;
        if depth < self.values[idx] {
            self.values[idx] = depth;
            true
        } else {
            false
        }
    }
}
