//! Encoding of processed images into their final byte format

use crate::config::{EncodeConfig, OutputFormat};
use crate::error::{ProcessingError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbImage, RgbaImage};
use tracing::debug;

/// Encode an RGBA image into the configured output format.
///
/// PNG is always lossless and ignores the quality setting. WebP encodes
/// losslessly at quality 100 and lossily below. JPEG cannot carry an alpha
/// channel, so the image is flattened over white first.
pub fn encode(image: &RgbaImage, config: &EncodeConfig) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    debug!(
        format = config.format.extension(),
        quality = config.quality,
        width,
        height,
        "encoding image"
    );

    match config.format {
        OutputFormat::Png => encode_png(image),
        OutputFormat::Webp => encode_webp(image, config.quality),
        OutputFormat::Jpeg => encode_jpeg(image, config.quality),
    }
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(image.as_raw(), width, height, ColorType::Rgba8)
        .map_err(|e| ProcessingError::EncodingFailed {
            message: format!("PNG encoding failed: {}", e),
        })?;
    Ok(buffer)
}

fn encode_webp(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let encoder = webp::Encoder::from_rgba(image.as_raw(), width, height);
    let memory = if quality == 100 {
        encoder.encode_lossless()
    } else {
        encoder.encode(quality as f32)
    };
    Ok(memory.to_vec())
}

fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let flattened = flatten_over_white(image);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(flattened.as_raw(), width, height, ColorType::Rgb8)
        .map_err(|e| ProcessingError::EncodingFailed {
            message: format!("JPEG encoding failed: {}", e),
        })?;
    Ok(buffer)
}

/// Composite the image over an opaque white background, dropping alpha.
fn flatten_over_white(image: &RgbaImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let a = pixel[3] as f32 / 255.0;
        let blend = |c: u8| ((c as f32 * a + 255.0 * (1.0 - a)).round()) as u8;
        out.put_pixel(x, y, image::Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    out
}
