//! Core data models for overlay processing

use crate::error::{ProcessingError, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Anchor corner (or center) for the stamped text
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TextPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
}

impl TextPosition {
    /// Parse a position name as used on the command line and in presets
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "top-left" | "top_left" => Ok(TextPosition::TopLeft),
            "top-right" | "top_right" => Ok(TextPosition::TopRight),
            "bottom-left" | "bottom_left" => Ok(TextPosition::BottomLeft),
            "bottom-right" | "bottom_right" => Ok(TextPosition::BottomRight),
            "center" => Ok(TextPosition::Center),
            other => Err(ProcessingError::InvalidConfig {
                message: format!("unknown text position: {}", other),
            }),
        }
    }
}

/// Optional solid plate rendered behind the text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBackground {
    /// Hex color, with or without a leading '#'
    pub color: String,
    /// 0-100
    pub opacity: u8,
}

/// Validated text stamping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    pub content: String,
    pub size: u32,
    pub color: String,
    pub position: TextPosition,
    pub opacity: u8,
    pub background: Option<TextBackground>,
}

impl TextConfig {
    pub fn new(
        content: String,
        size: u32,
        color: String,
        position: TextPosition,
        opacity: u8,
        background: Option<TextBackground>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(ProcessingError::InvalidConfig {
                message: "text size must be greater than zero".to_string(),
            });
        }
        if opacity > 100 {
            return Err(ProcessingError::InvalidConfig {
                message: format!("text opacity {} must be between 0 and 100", opacity),
            });
        }
        if let Some(bg) = &background {
            if bg.opacity > 100 {
                return Err(ProcessingError::InvalidConfig {
                    message: format!("background opacity {} must be between 0 and 100", bg.opacity),
                });
            }
        }
        Ok(Self {
            content,
            size,
            color,
            position,
            opacity,
            background,
        })
    }

    /// Whether stamping this config changes the image at all
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// A fully processed image, ready for encoding
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    pub image: RgbaImage,
    /// File name of the source image, used to derive the output name
    pub original_name: String,
}

impl ProcessedResult {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Counters for a batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Outcome of a batch run: counters plus per-file failure details
#[derive(Debug, Default)]
pub struct BatchReport {
    pub stats: BatchStats,
    /// (file name, error message) for each failed input
    pub failures: Vec<(String, String)>,
    /// Wall-clock time for the whole batch
    pub duration: std::time::Duration,
}

impl BatchReport {
    pub fn record_success(&mut self) {
        self.stats.processed += 1;
    }

    pub fn record_failure(&mut self, name: &str, message: String) {
        self.stats.failed += 1;
        self.failures.push((name.to_string(), message));
    }
}
