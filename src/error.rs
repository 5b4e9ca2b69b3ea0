//! Error type shared by the whole pipeline

use std::fmt;

/// Everything that can go wrong while building a scene or writing frames.
///
/// Rendering itself never fails: configuration is validated up front and
/// numeric degeneracies inside a frame are skipped, not reported.
#[derive(Debug)]
pub enum RenderError {
    /// Non-positive buffer size, frame rate or duration
    InvalidDimensions(String),
    /// Camera bounds that collapse an axis (or a perspective near plane at 0)
    DegenerateViewVolume(String),
    InvalidCurve(String),
    InvalidGeometry(String),
    InvalidLight(String),
    /// Negative or non-finite shading coefficients
    InvalidMaterial(String),
    /// A buffer handed to a sink does not match the sink's size
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ImageError(image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for RenderError {
    fn from(e: ron::error::SpannedError) -> Self {
        RenderError::ParseError(e)
    }
}

impl From<ron::Error> for RenderError {
    fn from(e: ron::Error) -> Self {
        RenderError::SerializeError(e)
    }
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::ImageError(e)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidDimensions(msg) => write!(f, "Invalid dimensions: {}", msg),
            RenderError::DegenerateViewVolume(msg) => write!(f, "Degenerate view volume: {}", msg),
            RenderError::InvalidCurve(msg) => write!(f, "Invalid curve: {}", msg),
            RenderError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            RenderError::InvalidLight(msg) => write!(f, "Invalid light: {}", msg),
            RenderError::InvalidMaterial(msg) => write!(f, "Invalid material: {}", msg),
            RenderError::ShapeMismatch { expected, actual } => write!(
                f,
                "Buffer shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            RenderError::IoError(e) => write!(f, "IO error: {}", e),
            RenderError::ParseError(e) => write!(f, "Parse error: {}", e),
            RenderError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            RenderError::ImageError(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::IoError(e) => Some(e),
            RenderError::ParseError(e) => Some(e),
            RenderError::SerializeError(e) => Some(e),
            RenderError::ImageError(e) => Some(e),
            _ => None,
        }
    }
}
