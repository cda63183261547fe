//! Core library for batch overlay processing
//!
//! This crate composites a shared overlay frame onto batches of images,
//! optionally stamps configurable text, encodes the results as PNG, WebP or
//! JPEG, and packages them into a ZIP archive.

pub mod archive;
pub mod compositor;
pub mod config;
pub mod encoder;
pub mod error;
pub mod font;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod text;

pub use archive::Archiver;
pub use config::{EncodeConfig, NamingConfig, OutputFormat, OverlayConfig, Preset, PresetManager};
pub use error::{ProcessingError, Result};
pub use font::FontProvider;
pub use models::{
    BatchReport, BatchStats, ProcessedResult, TextBackground, TextConfig, TextPosition,
};
pub use pipeline::{collect_image_files, BatchSession};

/// Initialize the library's logging. Call once at startup.
pub fn init(verbose: bool) -> Result<()> {
    logging::init_logging(verbose)?;
    tracing::info!("Overlay processor core v{} initialized", version());
    Ok(())
}

/// Get the version of the core library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_init() {
        assert!(init(false).is_ok());
    }
}
