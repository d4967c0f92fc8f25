//! Error types for texture data operations.

use std::fmt;

/// Errors raised while building or checking texture data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Image dimensions are invalid for the requested operation.
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
    /// A byte buffer does not have the length its extent and encoding require.
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::InvalidDimensions {
                width,
                height,
                reason,
            } => {
                write!(f, "Invalid dimensions {}×{}: {}", width, height, reason)
            }
            TextureError::SizeMismatch { expected, actual } => {
                write!(
                    f,
                    "Byte length mismatch: expected {} bytes, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for TextureError {}
