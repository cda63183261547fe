//! Command-line interface for batch overlay processing

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use overlay_processor_core::{
    collect_image_files, encoder, Archiver, BatchSession, FontProvider, OutputFormat, Preset,
    PresetManager, TextPosition,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "overlay-processor")]
#[command(about = "Batch overlay compositing, text stamping and packaging")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a directory of images and package the results into a ZIP
    Process {
        /// Directory containing the input images
        #[arg(short, long)]
        input: PathBuf,

        /// Overlay image applied to every input
        #[arg(short = 'O', long)]
        overlay: PathBuf,

        /// Path of the ZIP archive to write; defaults to a timestamped name
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        settings: Settings,
    },

    /// Process a single image and write the encoded result to a file
    Preview {
        /// The base image
        #[arg(short, long)]
        input: PathBuf,

        /// Overlay image
        #[arg(short = 'O', long)]
        overlay: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },

    /// Write the given settings to a JSON preset file
    SavePreset {
        /// Path of the preset file to write
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        settings: Settings,
    },
}

/// Processing settings shared by all subcommands. Flags override values from
/// the preset file when both are given.
#[derive(Args)]
struct Settings {
    /// Preset file to start from
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Output format: png, webp or jpeg
    #[arg(short, long)]
    format: Option<String>,

    /// Encoding quality, 1-100
    #[arg(short, long)]
    quality: Option<u8>,

    /// Prefix added to every output file name
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix added to every output file name, before the extension
    #[arg(long)]
    suffix: Option<String>,

    /// Use the overlay's resolution as the output canvas
    #[arg(long)]
    keep_overlay_size: bool,

    /// Text to stamp onto every image
    #[arg(long)]
    text: Option<String>,

    /// Text size in pixels
    #[arg(long)]
    text_size: Option<u32>,

    /// Text color as a hex string, e.g. "#FFFFFF"
    #[arg(long)]
    text_color: Option<String>,

    /// Text anchor: top-left, top-right, bottom-left, bottom-right or center
    #[arg(long)]
    text_position: Option<String>,

    /// Text opacity, 0-100
    #[arg(long)]
    text_opacity: Option<u8>,

    /// Background plate color behind the text; enables the plate
    #[arg(long)]
    text_bg_color: Option<String>,

    /// Background plate opacity, 0-100
    #[arg(long)]
    text_bg_opacity: Option<u8>,
}

impl Settings {
    /// Resolve the effective preset: file values first, then flag overrides.
    fn resolve(&self) -> Result<Preset> {
        let mut preset = match &self.preset {
            Some(path) => PresetManager::load(path)
                .with_context(|| format!("Failed to load preset {}", path.display()))?,
            None => Preset::default(),
        };

        if let Some(format) = &self.format {
            preset.output_format = OutputFormat::parse(format)?;
        }
        if let Some(quality) = self.quality {
            preset.quality = quality;
        }
        if let Some(prefix) = &self.prefix {
            preset.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            preset.suffix = suffix.clone();
        }
        if self.keep_overlay_size {
            preset.keep_overlay_size = true;
        }
        if let Some(text) = &self.text {
            preset.text_enabled = true;
            preset.text = text.clone();
        }
        if let Some(size) = self.text_size {
            preset.text_size = size;
        }
        if let Some(color) = &self.text_color {
            preset.text_color = color.clone();
        }
        if let Some(position) = &self.text_position {
            preset.text_position = TextPosition::parse(position)?;
        }
        if let Some(opacity) = self.text_opacity {
            preset.text_opacity = opacity;
        }
        if let Some(bg_color) = &self.text_bg_color {
            preset.text_bg_enabled = true;
            preset.text_bg_color = bg_color.clone();
        }
        if let Some(bg_opacity) = self.text_bg_opacity {
            preset.text_bg_opacity = bg_opacity;
        }

        Ok(preset)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    overlay_processor_core::init(cli.verbose)?;

    match cli.command {
        Commands::Process {
            input,
            overlay,
            output,
            settings,
        } => run_process(input, overlay, output, &settings),
        Commands::Preview {
            input,
            overlay,
            output,
            settings,
        } => run_preview(input, overlay, output, &settings),
        Commands::SavePreset { output, settings } => {
            let preset = settings.resolve()?;
            // validate before persisting
            preset.encode_config()?;
            preset.text_config()?;
            PresetManager::save(&preset, &output)?;
            println!("Preset written to {}", output.display());
            Ok(())
        }
    }
}

fn build_session(overlay: &Path, preset: &Preset) -> Result<BatchSession> {
    let overlay_image = image::open(overlay)
        .with_context(|| format!("Failed to open overlay image {}", overlay.display()))?;
    let session = BatchSession::new(
        Some(overlay_image),
        preset.overlay_config(),
        preset.text_config()?,
        FontProvider::discover(),
    )?;
    Ok(session)
}

fn run_process(
    input: PathBuf,
    overlay: PathBuf,
    output: Option<PathBuf>,
    settings: &Settings,
) -> Result<()> {
    let output = output.unwrap_or_else(|| {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("overlay_batch_{}.zip", stamp))
    });
    let preset = settings.resolve()?;
    let encode_config = preset.encode_config()?;
    let session = build_session(&overlay, &preset)?;

    let files = collect_image_files(&input)
        .with_context(|| format!("Failed to list {}", input.display()))?;
    if files.is_empty() {
        anyhow::bail!("No image files found in {}", input.display());
    }
    info!(count = files.len(), "starting batch");

    let (results, report) = session.run(&files);

    let sink = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut archiver = Archiver::new(sink, encode_config, preset.naming_config());
    for result in &results {
        archiver.add(result)?;
    }
    archiver.finish()?;

    println!(
        "Processed {}/{} images in {:.2}s ({} failed), archive: {}",
        report.stats.processed,
        report.stats.total,
        report.duration.as_secs_f64(),
        report.stats.failed,
        output.display()
    );
    for (name, message) in &report.failures {
        eprintln!("  failed: {}: {}", name, message);
    }

    if report.stats.processed == 0 {
        anyhow::bail!("All {} images failed", report.stats.total);
    }
    Ok(())
}

fn run_preview(
    input: PathBuf,
    overlay: PathBuf,
    output: PathBuf,
    settings: &Settings,
) -> Result<()> {
    let preset = settings.resolve()?;
    let encode_config = preset.encode_config()?;
    let session = build_session(&overlay, &preset)?;

    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let bytes = std::fs::read(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let result = session.preview(&name, &bytes)?;
    let encoded = encoder::encode(&result.image, &encode_config)?;
    std::fs::write(&output, encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let (width, height) = result.dimensions();
    println!("Wrote {} ({}x{})", output.display(), width, height);
    Ok(())
}
