//! Output and batch configuration for the overlay pipeline

use crate::error::{ProcessingError, Result};
use crate::models::{TextConfig, TextPosition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported output formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Webp,
    Jpeg,
}

impl OutputFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Get the MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    /// Check if this format supports transparency
    pub fn supports_transparency(&self) -> bool {
        matches!(self, OutputFormat::Png | OutputFormat::Webp)
    }

    /// Parse a format name as used on the command line and in presets
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            other => Err(ProcessingError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Encoding parameters for the final image
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EncodeConfig {
    pub format: OutputFormat,
    /// 1-100. Ignored for PNG; 100 selects lossless WebP; JPEG is always lossy.
    pub quality: u8,
}

impl EncodeConfig {
    pub fn new(format: OutputFormat, quality: u8) -> Result<Self> {
        if !(1..=100).contains(&quality) {
            return Err(ProcessingError::InvalidConfig {
                message: format!("quality {} must be between 1 and 100", quality),
            });
        }
        Ok(Self { format, quality })
    }
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Webp,
            quality: 95,
        }
    }
}

/// Overlay sizing policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// When true the overlay's own resolution becomes the output canvas and
    /// the base image is cover-scaled and center-cropped into it. When false
    /// the overlay is stretched to the base image's dimensions.
    pub keep_original_size: bool,
}

/// Output file naming: `{prefix}{stem}{suffix}.{ext}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingConfig {
    pub prefix: String,
    pub suffix: String,
}

impl NamingConfig {
    /// Build the output file name for an input named `original_name`.
    pub fn output_name(&self, original_name: &str, format: OutputFormat) -> String {
        let stem = Path::new(original_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| original_name.to_string());
        format!("{}{}{}.{}", self.prefix, stem, self.suffix, format.extension())
    }
}

/// Flat, persistable snapshot of the user-facing settings.
///
/// Presets carry no schema version; text fields are only meaningful when
/// `text_enabled` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub output_format: OutputFormat,
    pub quality: u8,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub keep_overlay_size: bool,
    #[serde(default)]
    pub text_enabled: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_text_size")]
    pub text_size: u32,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default)]
    pub text_position: TextPosition,
    #[serde(default = "default_text_opacity")]
    pub text_opacity: u8,
    #[serde(default)]
    pub text_bg_enabled: bool,
    #[serde(default = "default_bg_color")]
    pub text_bg_color: String,
    #[serde(default = "default_bg_opacity")]
    pub text_bg_opacity: u8,
}

fn default_text_size() -> u32 {
    50
}

fn default_text_color() -> String {
    "#FFFFFF".to_string()
}

fn default_text_opacity() -> u8 {
    100
}

fn default_bg_color() -> String {
    "#000000".to_string()
}

fn default_bg_opacity() -> u8 {
    70
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Webp,
            quality: 95,
            prefix: String::new(),
            suffix: String::new(),
            keep_overlay_size: false,
            text_enabled: false,
            text: String::new(),
            text_size: default_text_size(),
            text_color: default_text_color(),
            text_position: TextPosition::default(),
            text_opacity: default_text_opacity(),
            text_bg_enabled: false,
            text_bg_color: default_bg_color(),
            text_bg_opacity: default_bg_opacity(),
        }
    }
}

impl Preset {
    /// Validated encode settings from this preset.
    pub fn encode_config(&self) -> Result<EncodeConfig> {
        EncodeConfig::new(self.output_format, self.quality)
    }

    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            keep_original_size: self.keep_overlay_size,
        }
    }

    pub fn naming_config(&self) -> NamingConfig {
        NamingConfig {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        }
    }

    /// Validated text settings, or `None` when text stamping is disabled.
    pub fn text_config(&self) -> Result<Option<TextConfig>> {
        if !self.text_enabled {
            return Ok(None);
        }
        let background = if self.text_bg_enabled {
            Some(crate::models::TextBackground {
                color: self.text_bg_color.clone(),
                opacity: self.text_bg_opacity,
            })
        } else {
            None
        };
        let config = TextConfig::new(
            self.text.clone(),
            self.text_size,
            self.text_color.clone(),
            self.text_position,
            self.text_opacity,
            background,
        )?;
        Ok(Some(config))
    }
}

/// Load and save presets as JSON files
pub struct PresetManager;

impl PresetManager {
    /// Load a preset from a JSON file
    pub fn load(path: &Path) -> Result<Preset> {
        let contents = std::fs::read_to_string(path).map_err(|e| ProcessingError::PresetError {
            message: format!("Failed to read preset file {}: {}", path.display(), e),
        })?;

        serde_json::from_str(&contents).map_err(|e| ProcessingError::PresetError {
            message: format!("Failed to parse preset file {}: {}", path.display(), e),
        })
    }

    /// Save a preset to a JSON file
    pub fn save(preset: &Preset, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ProcessingError::PresetError {
                    message: format!("Failed to create preset directory: {}", e),
                })?;
            }
        }

        let contents =
            serde_json::to_string_pretty(preset).map_err(|e| ProcessingError::PresetError {
                message: format!("Failed to serialize preset: {}", e),
            })?;

        std::fs::write(path, contents).map_err(|e| ProcessingError::PresetError {
            message: format!("Failed to write preset file {}: {}", path.display(), e),
        })?;

        tracing::info!("Preset saved to {:?}", path);
        Ok(())
    }
}
