//! Text stamping: color parsing, placement and rendering

use crate::compositor::composite_over;
use crate::error::{ProcessingError, Result};
use crate::font::FontProvider;
use crate::models::{TextConfig, TextPosition};
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Distance from the image edge to the text bounding box, in pixels.
const EDGE_MARGIN: i32 = 20;

/// How far the background plate extends past the text bounding box.
const BACKGROUND_PADDING: i32 = 15;

/// Parse a hex color string into an RGB triple.
///
/// Accepts an optional leading `#` followed by exactly six hex digits.
pub fn hex_to_rgb(value: &str) -> Result<(u8, u8, u8)> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProcessingError::InvalidColor {
            value: value.to_string(),
        });
    }
    let parse = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ProcessingError::InvalidColor {
            value: value.to_string(),
        })
    };
    Ok((parse(0..2)?, parse(2..4)?, parse(4..6)?))
}

/// Convert a 0-100 opacity percentage to an 8-bit alpha value.
pub fn opacity_to_alpha(opacity: u8) -> u8 {
    ((255.0 * opacity as f32 / 100.0).round()).clamp(0.0, 255.0) as u8
}

/// Top-left corner of a `text_w` x `text_h` block anchored inside a
/// `width` x `height` image.
pub fn anchor_position(
    width: u32,
    height: u32,
    text_w: u32,
    text_h: u32,
    position: TextPosition,
) -> (i32, i32) {
    let (w, h) = (width as i32, height as i32);
    let (tw, th) = (text_w as i32, text_h as i32);
    match position {
        TextPosition::TopLeft => (EDGE_MARGIN, EDGE_MARGIN),
        TextPosition::TopRight => (w - tw - EDGE_MARGIN, EDGE_MARGIN),
        TextPosition::BottomLeft => (EDGE_MARGIN, h - th - EDGE_MARGIN),
        TextPosition::BottomRight => (w - tw - EDGE_MARGIN, h - th - EDGE_MARGIN),
        TextPosition::Center => ((w - tw) / 2, (h - th) / 2),
    }
}

/// Stamp the configured text onto `image` in place.
///
/// Empty text is a no-op and leaves the image byte-identical. The text (and
/// optional background plate) is drawn into a transparent layer of the same
/// size which is then alpha-composited over the image, so semi-transparent
/// text blends rather than overwrites.
pub fn add_text_overlay(
    image: &mut RgbaImage,
    config: &TextConfig,
    font: &FontProvider,
) -> Result<()> {
    if config.is_empty() {
        return Ok(());
    }

    let (width, height) = image.dimensions();
    let (text_w, text_h) = font.measure(&config.content, config.size);
    let (x, y) = anchor_position(width, height, text_w, text_h, config.position);
    debug!(x, y, text_w, text_h, "stamping text");

    let mut layer = RgbaImage::new(width, height);

    if let Some(bg) = &config.background {
        let (r, g, b) = hex_to_rgb(&bg.color)?;
        let alpha = opacity_to_alpha(bg.opacity);
        if alpha > 0 {
            fill_rect(
                &mut layer,
                x - BACKGROUND_PADDING,
                y - BACKGROUND_PADDING,
                text_w as i32 + 2 * BACKGROUND_PADDING,
                text_h as i32 + 2 * BACKGROUND_PADDING,
                Rgba([r, g, b, alpha]),
            );
        }
    }

    let (r, g, b) = hex_to_rgb(&config.color)?;
    let alpha = opacity_to_alpha(config.opacity);
    font.draw(&mut layer, &config.content, config.size, x, y, Rgba([r, g, b, alpha]));

    composite_over(image, &layer);
    Ok(())
}

/// Fill an axis-aligned rectangle, clipping to the layer bounds.
fn fill_rect(layer: &mut RgbaImage, x: i32, y: i32, w: i32, h: i32, color: Rgba<u8>) {
    let (lw, lh) = layer.dimensions();
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(lw as i32);
    let y1 = (y + h).min(lh as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            layer.put_pixel(px as u32, py as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TextBackground;

    #[test]
    fn test_hex_to_rgb_with_hash() {
        assert_eq!(hex_to_rgb("#FF00AA").unwrap(), (255, 0, 170));
    }

    #[test]
    fn test_hex_to_rgb_without_hash() {
        assert_eq!(hex_to_rgb("00ff00").unwrap(), (0, 255, 0));
    }

    #[test]
    fn test_hex_to_rgb_rejects_malformed() {
        assert!(hex_to_rgb("#FFF").is_err());
        assert!(hex_to_rgb("#GG0000").is_err());
        assert!(hex_to_rgb("").is_err());
        assert!(hex_to_rgb("#FF00AA00").is_err());
    }

    #[test]
    fn test_opacity_to_alpha() {
        assert_eq!(opacity_to_alpha(0), 0);
        assert_eq!(opacity_to_alpha(100), 255);
        assert_eq!(opacity_to_alpha(50), 128);
    }

    #[test]
    fn test_anchor_top_right() {
        assert_eq!(
            anchor_position(1000, 800, 100, 30, TextPosition::TopRight),
            (880, 20)
        );
    }

    #[test]
    fn test_anchor_corners_and_center() {
        assert_eq!(
            anchor_position(1000, 800, 100, 30, TextPosition::TopLeft),
            (20, 20)
        );
        assert_eq!(
            anchor_position(1000, 800, 100, 30, TextPosition::BottomLeft),
            (20, 750)
        );
        assert_eq!(
            anchor_position(1000, 800, 100, 30, TextPosition::BottomRight),
            (880, 750)
        );
        assert_eq!(
            anchor_position(1000, 800, 100, 30, TextPosition::Center),
            (450, 385)
        );
    }

    #[test]
    fn test_anchor_oversized_text_goes_negative() {
        let (x, y) = anchor_position(50, 50, 100, 30, TextPosition::TopRight);
        assert!(x < 0);
        assert_eq!(y, 20);
    }

    #[test]
    fn test_empty_text_leaves_image_unchanged() {
        let mut image = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255]));
        let before = image.clone();
        let config = TextConfig::new(
            String::new(),
            50,
            "#FFFFFF".to_string(),
            TextPosition::Center,
            100,
            None,
        )
        .unwrap();
        add_text_overlay(&mut image, &config, &FontProvider::Bitmap).unwrap();
        assert_eq!(image.as_raw(), before.as_raw());
    }

    #[test]
    fn test_text_changes_pixels() {
        let mut image = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let before = image.clone();
        let config = TextConfig::new(
            "HI".to_string(),
            14,
            "#FFFFFF".to_string(),
            TextPosition::Center,
            100,
            None,
        )
        .unwrap();
        add_text_overlay(&mut image, &config, &FontProvider::Bitmap).unwrap();
        assert_ne!(image.as_raw(), before.as_raw());
    }

    #[test]
    fn test_background_plate_drawn_behind_text() {
        let mut image = RgbaImage::from_pixel(200, 200, Rgba([0, 0, 0, 255]));
        let config = TextConfig::new(
            "X".to_string(),
            14,
            "#FFFFFF".to_string(),
            TextPosition::Center,
            100,
            Some(TextBackground {
                color: "#FF0000".to_string(),
                opacity: 100,
            }),
        )
        .unwrap();
        add_text_overlay(&mut image, &config, &FontProvider::Bitmap).unwrap();
        // a pixel inside the plate but outside the glyph is pure background
        let red = image
            .pixels()
            .filter(|p| p[0] == 255 && p[1] == 0 && p[2] == 0)
            .count();
        assert!(red > 0);
    }

    #[test]
    fn test_invalid_color_is_reported() {
        let mut image = RgbaImage::new(64, 64);
        let config = TextConfig::new(
            "X".to_string(),
            14,
            "#NOTHEX".to_string(),
            TextPosition::Center,
            100,
            None,
        )
        .unwrap();
        let err = add_text_overlay(&mut image, &config, &FontProvider::Bitmap).unwrap_err();
        assert_eq!(err.error_type(), "invalid_color");
    }
}
