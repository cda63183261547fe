//! Packaging of processed images into a ZIP archive

use crate::config::{EncodeConfig, NamingConfig};
use crate::encoder::encode;
use crate::error::{ProcessingError, Result};
use crate::models::ProcessedResult;
use std::io::{Seek, Write};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Encodes processed images and writes them into a ZIP archive.
///
/// Image formats already compress their payload, so entries are stored
/// uncompressed. Insertion order is preserved.
pub struct Archiver<W: Write + Seek> {
    writer: ZipWriter<W>,
    encode_config: EncodeConfig,
    naming: NamingConfig,
    entries: usize,
}

impl<W: Write + Seek> Archiver<W> {
    pub fn new(sink: W, encode_config: EncodeConfig, naming: NamingConfig) -> Self {
        Self {
            writer: ZipWriter::new(sink),
            encode_config,
            naming,
            entries: 0,
        }
    }

    /// Encode one result and append it to the archive.
    pub fn add(&mut self, result: &ProcessedResult) -> Result<()> {
        let name = self
            .naming
            .output_name(&result.original_name, self.encode_config.format);
        let bytes = encode(&result.image, &self.encode_config)?;

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer
            .start_file(name.as_str(), options)
            .map_err(|e| ProcessingError::ArchiveError {
                message: format!("Failed to start archive entry {}: {}", name, e),
            })?;
        self.writer
            .write_all(&bytes)
            .map_err(|e| ProcessingError::ArchiveError {
                message: format!("Failed to write archive entry {}: {}", name, e),
            })?;

        self.entries += 1;
        debug!(entry = %name, size = bytes.len(), "archived image");
        Ok(())
    }

    /// Finish the archive and return the underlying sink.
    pub fn finish(self) -> Result<W> {
        let entries = self.entries;
        let sink = self
            .writer
            .finish()
            .map_err(|e| ProcessingError::ArchiveError {
                message: format!("Failed to finalize archive: {}", e),
            })?;
        info!(entries, "archive finished");
        Ok(sink)
    }
}
