//! Font discovery and glyph rasterization for text stamping

use crate::compositor::blend_pixels;
use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

/// Candidate system fonts, tried in order.
const SYSTEM_FONT_PATHS: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\calibrib.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
];

/// A loaded font, or the built-in bitmap glyphs when no system font exists.
///
/// Text stamping never fails for lack of a font: when no TrueType file can be
/// found the provider falls back to a fixed 5x7 pixel font scaled to the
/// requested size.
#[derive(Debug)]
pub enum FontProvider {
    TrueType(FontVec),
    Bitmap,
}

impl FontProvider {
    /// Find a usable font on the host system.
    pub fn discover() -> Self {
        for path in SYSTEM_FONT_PATHS {
            match std::fs::read(path) {
                Ok(data) => match FontVec::try_from_vec(data) {
                    Ok(font) => {
                        debug!(path, "loaded system font");
                        return FontProvider::TrueType(font);
                    }
                    Err(e) => {
                        warn!(path, error = %e, "font file could not be parsed, skipping");
                    }
                },
                Err(_) => continue,
            }
        }
        warn!("no system font found, falling back to built-in bitmap font");
        FontProvider::Bitmap
    }

    /// Pixel dimensions of `text` rendered at `size`.
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        if text.is_empty() {
            return (0, 0);
        }
        match self {
            FontProvider::TrueType(font) => {
                let scale = PxScale::from(size as f32);
                let scaled = font.as_scaled(scale);
                let mut width = 0.0f32;
                let mut prev = None;
                for c in text.chars() {
                    let glyph_id = scaled.glyph_id(c);
                    if let Some(prev_id) = prev {
                        width += scaled.kern(prev_id, glyph_id);
                    }
                    width += scaled.h_advance(glyph_id);
                    prev = Some(glyph_id);
                }
                (width.ceil() as u32, scaled.height().ceil() as u32)
            }
            FontProvider::Bitmap => {
                let scale = bitmap_scale(size);
                let count = text.chars().count() as u32;
                // 5 columns per glyph plus one column of spacing
                (count * 6 * scale - scale, 7 * scale)
            }
        }
    }

    /// Draw `text` into `layer` with its top-left corner at (`x`, `y`).
    ///
    /// Coordinates may be negative; out-of-bounds pixels are clipped.
    pub fn draw(
        &self,
        layer: &mut RgbaImage,
        text: &str,
        size: u32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    ) {
        if text.is_empty() || color[3] == 0 {
            return;
        }
        match self {
            FontProvider::TrueType(font) => {
                draw_truetype(font, layer, text, size, x, y, color);
            }
            FontProvider::Bitmap => {
                draw_bitmap(layer, text, size, x, y, color);
            }
        }
    }
}

fn draw_truetype(
    font: &FontVec,
    layer: &mut RgbaImage,
    text: &str,
    size: u32,
    x: i32,
    y: i32,
    color: Rgba<u8>,
) {
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);
    let (width, height) = layer.dimensions();

    let mut caret = x as f32;
    let baseline = y as f32 + scaled.ascent();
    let mut prev = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev_id) = prev {
            caret += scaled.kern(prev_id, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);

        if let Some(outline) = font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            outline.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }
                let alpha = (coverage * color[3] as f32).round().clamp(0.0, 255.0) as u8;
                if alpha == 0 {
                    return;
                }
                let src = Rgba([color[0], color[1], color[2], alpha]);
                let dst = layer.get_pixel_mut(px as u32, py as u32);
                *dst = blend_pixels(*dst, src);
            });
        }
    }
}

fn draw_bitmap(layer: &mut RgbaImage, text: &str, size: u32, x: i32, y: i32, color: Rgba<u8>) {
    let scale = bitmap_scale(size) as i32;
    let (width, height) = layer.dimensions();
    let mut caret = x;

    for c in text.chars() {
        let rows = bitmap_glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5 {
                if bits & (0b10000 >> col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let px = caret + col as i32 * scale + dx;
                        let py = y + row as i32 * scale + dy;
                        if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                            continue;
                        }
                        let dst = layer.get_pixel_mut(px as u32, py as u32);
                        *dst = blend_pixels(*dst, color);
                    }
                }
            }
        }
        caret += 6 * scale;
    }
}

fn bitmap_scale(size: u32) -> u32 {
    (size / 7).max(1)
}

/// 5x7 glyphs, one byte per row, low 5 bits used.
fn bitmap_glyph(c: char) -> [u8; 7] {
    let c = c.to_ascii_uppercase();
    match c {
        ' ' => [0b00000; 7],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        ';' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '=' => [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
        '/' => [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => [0b01010, 0b01010, 0b10100, 0b00000, 0b00000, 0b00000, 0b00000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '*' => [0b00000, 0b10101, 0b01110, 0b11111, 0b01110, 0b10101, 0b00000],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '@' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
        // unknown glyphs render as an outline box
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_text() {
        let provider = FontProvider::Bitmap;
        assert_eq!(provider.measure("", 50), (0, 0));
    }

    #[test]
    fn test_bitmap_measure_scales_with_size() {
        let provider = FontProvider::Bitmap;
        let (small_w, small_h) = provider.measure("AB", 7);
        let (big_w, big_h) = provider.measure("AB", 14);
        assert_eq!(big_w, small_w * 2);
        assert_eq!(big_h, small_h * 2);
    }

    #[test]
    fn test_bitmap_draw_marks_pixels() {
        let provider = FontProvider::Bitmap;
        let mut layer = RgbaImage::new(40, 20);
        provider.draw(&mut layer, "I", 7, 2, 2, Rgba([255, 0, 0, 255]));
        let marked = layer.pixels().filter(|p| p[3] > 0).count();
        assert!(marked > 0);
    }

    #[test]
    fn test_draw_empty_text_is_noop() {
        let provider = FontProvider::Bitmap;
        let mut layer = RgbaImage::new(10, 10);
        provider.draw(&mut layer, "", 7, 0, 0, Rgba([255, 255, 255, 255]));
        assert!(layer.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_draw_clips_out_of_bounds() {
        let provider = FontProvider::Bitmap;
        let mut layer = RgbaImage::new(8, 8);
        provider.draw(&mut layer, "W", 7, -3, -3, Rgba([255, 255, 255, 255]));
        provider.draw(&mut layer, "W", 7, 6, 6, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_discover_never_panics() {
        let provider = FontProvider::discover();
        let (w, h) = provider.measure("Hello", 24);
        assert!(w > 0);
        assert!(h > 0);
    }
}
