//! Error type shared by every editing command.
//!
//! Nothing here is fatal: the UI turns each variant into a notice and the
//! session is left exactly as it was before the command ran.

use thiserror::Error;

/// Everything an editing command can decline with.
#[derive(Debug, Error)]
pub enum EditorError {
    /// An editing command ran before any image was loaded.
    #[error("No image loaded")]
    NoImage,

    /// Undo was requested with only the freshly loaded image in history.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Crop rectangle collapsed to zero width or height.
    #[error("Invalid crop region ({width}x{height})")]
    InvalidCropRegion { width: i64, height: i64 },

    /// A numeric prompt value outside its allowed range.
    #[error("{name} must be between {min} and {max} (got {value})")]
    InvalidInput {
        name: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },

    /// Save path extension that none of the encoders handle.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How loudly the UI should surface a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl EditorError {
    /// Severity used when this error is shown to the user.
    pub fn level(&self) -> NoticeLevel {
        match self {
            EditorError::NothingToUndo => NoticeLevel::Info,
            EditorError::NoImage
            | EditorError::InvalidCropRegion { .. }
            | EditorError::InvalidInput { .. } => NoticeLevel::Warning,
            EditorError::UnsupportedFormat(_) | EditorError::Image(_) | EditorError::Io(_) => {
                NoticeLevel::Error
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_match_notice_severity() {
        assert_eq!(EditorError::NothingToUndo.level(), NoticeLevel::Info);
        assert_eq!(EditorError::NoImage.level(), NoticeLevel::Warning);
        assert_eq!(
            EditorError::InvalidCropRegion { width: 0, height: 4 }.level(),
            NoticeLevel::Warning
        );
        let io = EditorError::from(std::io::Error::other("disk full"));
        assert_eq!(io.level(), NoticeLevel::Error);
    }

    #[test]
    fn test_invalid_input_message() {
        let err = EditorError::InvalidInput { name: "Brush size", value: 60, min: 1, max: 50 };
        assert_eq!(err.to_string(), "Brush size must be between 1 and 50 (got 60)");
    }
}
