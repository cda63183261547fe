//! Batch processing session tying compositor, text stamping and stats together

use crate::compositor::{apply_overlay, normalize_rgba};
use crate::config::OverlayConfig;
use crate::error::{ProcessingError, Result};
use crate::font::FontProvider;
use crate::models::{BatchReport, ProcessedResult, TextConfig};
use crate::text::add_text_overlay;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Extensions accepted when listing an input directory.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// One batch run's worth of state.
///
/// The overlay is normalized to RGBA once at construction and shared by every
/// image in the batch. Sessions are single-threaded and hold no global state.
#[derive(Debug)]
pub struct BatchSession {
    overlay: image::RgbaImage,
    overlay_config: OverlayConfig,
    text_config: Option<TextConfig>,
    font: FontProvider,
}

impl BatchSession {
    /// Create a session. The overlay is mandatory; a batch cannot start
    /// without one.
    pub fn new(
        overlay: Option<DynamicImage>,
        overlay_config: OverlayConfig,
        text_config: Option<TextConfig>,
        font: FontProvider,
    ) -> Result<Self> {
        let overlay = overlay.ok_or(ProcessingError::MissingOverlay)?;
        Ok(Self {
            overlay: normalize_rgba(overlay),
            overlay_config,
            text_config,
            font,
        })
    }

    /// Process a single image from its encoded bytes.
    pub fn process_image(&self, name: &str, bytes: &[u8]) -> Result<ProcessedResult> {
        let decoded = image::load_from_memory(bytes).map_err(|e| ProcessingError::InvalidImage {
            message: format!("{}: {}", name, e),
        })?;
        let base = normalize_rgba(decoded);
        let mut composed = apply_overlay(&base, &self.overlay, &self.overlay_config)?;
        if let Some(text) = &self.text_config {
            add_text_overlay(&mut composed, text, &self.font)?;
        }
        Ok(ProcessedResult {
            image: composed,
            original_name: name.to_string(),
        })
    }

    /// One-shot processing of a single image, for previews. Errors are
    /// returned directly rather than recorded in batch stats.
    pub fn preview(&self, name: &str, bytes: &[u8]) -> Result<ProcessedResult> {
        self.process_image(name, bytes)
    }

    /// Process every file in order. Failures are recorded per file and the
    /// batch continues; successful results come back in input order.
    pub fn run(&self, files: &[PathBuf]) -> (Vec<ProcessedResult>, BatchReport) {
        let started = Instant::now();
        let mut report = BatchReport::default();
        report.stats.total = files.len();
        let mut results = Vec::with_capacity(files.len());

        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let outcome = std::fs::read(path)
                .map_err(ProcessingError::from)
                .and_then(|bytes| self.process_image(&name, &bytes));

            match outcome {
                Ok(result) => {
                    report.record_success();
                    results.push(result);
                }
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping image");
                    report.record_failure(&name, e.to_string());
                }
            }
        }

        report.duration = started.elapsed();
        info!(
            total = report.stats.total,
            processed = report.stats.processed,
            failed = report.stats.failed,
            elapsed_ms = report.duration.as_millis() as u64,
            "batch finished"
        );
        (results, report)
    }
}

/// List the image files in a directory, sorted by file name.
pub fn collect_image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        error!(dir = %dir.display(), "no image files found");
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EncodeConfig, OutputFormat};
    use crate::encoder::encode;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        encode(&image, &EncodeConfig::new(OutputFormat::Png, 100).unwrap()).unwrap()
    }

    fn session_with_overlay(width: u32, height: u32, color: [u8; 4]) -> BatchSession {
        let overlay = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)));
        BatchSession::new(
            Some(overlay),
            OverlayConfig::default(),
            None,
            FontProvider::Bitmap,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_overlay_is_fatal() {
        let err = BatchSession::new(
            None,
            OverlayConfig::default(),
            None,
            FontProvider::Bitmap,
        )
        .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_process_image_keeps_base_dimensions() {
        let session = session_with_overlay(10, 10, [0, 255, 0, 128]);
        let bytes = png_bytes(200, 100, [255, 0, 0, 255]);
        let result = session.process_image("base.png", &bytes).unwrap();
        assert_eq!(result.dimensions(), (200, 100));
        assert_eq!(result.original_name, "base.png");
    }

    #[test]
    fn test_process_image_rejects_garbage() {
        let session = session_with_overlay(10, 10, [0, 255, 0, 255]);
        let err = session.process_image("junk.png", b"not an image").unwrap_err();
        assert_eq!(err.error_type(), "invalid_image");
    }

    #[test]
    fn test_run_continues_past_corrupt_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            let path = temp_dir.path().join(format!("image_{}.png", i));
            std::fs::write(&path, png_bytes(20, 20, [i as u8 * 10, 0, 0, 255])).unwrap();
        }
        std::fs::write(temp_dir.path().join("broken.png"), b"garbage").unwrap();

        let session = session_with_overlay(20, 20, [0, 0, 255, 64]);
        let files = collect_image_files(temp_dir.path()).unwrap();
        let (results, report) = session.run(&files);

        assert_eq!(report.stats.total, 4);
        assert_eq!(report.stats.processed, 3);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(results.len(), 3);
        assert_eq!(report.failures[0].0, "broken.png");
    }

    #[test]
    fn test_collect_image_files_filters_and_sorts() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("b.PNG"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("c.webp"), b"x").unwrap();

        let files = collect_image_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.webp"]);
    }
}
