//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::Vec3;

/// RGB color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const GRAY: Color = Color { r: 80, g: 80, b: 80 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Gray level, all channels equal
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Convert a linear color to channel values: scale by 255, truncate, clamp.
    /// Non-finite channels become 0.
    pub fn from_unit(c: Vec3) -> Self {
        Self {
            r: unit_to_channel(c.x),
            g: unit_to_channel(c.y),
            b: unit_to_channel(c.z),
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// `v * 255`, truncated toward zero and clamped to the channel range
pub fn unit_to_channel(v: f64) -> u8 {
    let scaled = (v * 255.0).trunc();
    if scaled.is_nan() {
        0
    } else {
        scaled.clamp(0.0, 255.0) as u8
    }
}

/// Shading mode, selected once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Silhouette: fixed color, no culling, no depth test
    None,
    /// One Phong-Blinn evaluation per face
    Flat,
    /// Interpolation weights as RGB
    Barycentric,
    /// Normalized depth as gray
    Depth,
    /// Per-pixel Phong-Blinn with interpolated vertex normals
    #[default]
    PhongBlinn,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 5] = [
        ShadingMode::None,
        ShadingMode::Flat,
        ShadingMode::Barycentric,
        ShadingMode::Depth,
        ShadingMode::PhongBlinn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShadingMode::None => "none",
            ShadingMode::Flat => "flat",
            ShadingMode::Barycentric => "barycentric",
            ShadingMode::Depth => "depth",
            ShadingMode::PhongBlinn => "phong-blinn",
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn from_label(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.label() == lower)
    }
}

/// Per-frame render settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub shading: ShadingMode,
    /// Color of pixels no triangle covers
    pub background: Color,
    /// Ambient light, each channel in [0, 1]
    pub ambient: Vec3,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shading: ShadingMode::PhongBlinn,
            background: Color::GRAY,
            ambient: Vec3::splat(0.2),
        }
    }
}
