//! Error types for the overlay processing library

/// Main error type for overlay processing operations
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    #[error("Invalid color: {value}")]
    InvalidColor { value: String },

    #[error("Output format not supported: {format}")]
    UnsupportedFormat { format: String },

    #[error("No overlay image supplied")]
    MissingOverlay,

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Encoding failed: {message}")]
    EncodingFailed { message: String },

    #[error("Archive error: {message}")]
    ArchiveError { message: String },

    #[error("Preset error: {message}")]
    PresetError { message: String },

    #[error("Logging initialization failed: {message}")]
    LoggingError { message: String },
}

impl ProcessingError {
    /// Get the error type as a string for categorization
    pub fn error_type(&self) -> &'static str {
        match self {
            ProcessingError::Io(_) => "io_error",
            ProcessingError::InvalidImage { .. } => "invalid_image",
            ProcessingError::InvalidColor { .. } => "invalid_color",
            ProcessingError::UnsupportedFormat { .. } => "unsupported_format",
            ProcessingError::MissingOverlay => "missing_overlay",
            ProcessingError::InvalidConfig { .. } => "invalid_config",
            ProcessingError::EncodingFailed { .. } => "encoding_failed",
            ProcessingError::ArchiveError { .. } => "archive_error",
            ProcessingError::PresetError { .. } => "preset_error",
            ProcessingError::LoggingError { .. } => "logging_error",
        }
    }

    /// Check whether the error aborts a whole batch rather than a single image.
    ///
    /// A missing overlay is the only condition the batch cannot recover from;
    /// everything else is recorded against the current image and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessingError::MissingOverlay)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ProcessingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let error = ProcessingError::UnsupportedFormat {
            format: "tiff".to_string(),
        };
        assert_eq!(error.error_type(), "unsupported_format");
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(ProcessingError::MissingOverlay.is_fatal());

        let error = ProcessingError::InvalidImage {
            message: "zero width".to_string(),
        };
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let error = ProcessingError::InvalidColor {
            value: "#GG0000".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid color: #GG0000");
    }
}
