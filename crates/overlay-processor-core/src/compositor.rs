//! Alpha compositing of an overlay frame onto base images

use crate::config::OverlayConfig;
use crate::error::{ProcessingError, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::debug;

/// Convert any decoded image to straight-alpha RGBA8.
pub fn normalize_rgba(image: DynamicImage) -> RgbaImage {
    image.into_rgba8()
}

/// Porter-Duff "over" in straight-alpha space.
///
/// A fully transparent source leaves the destination untouched and a fully
/// opaque source replaces it, both without rounding drift.
pub fn blend_pixels(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let src_a = src[3] as f32 / 255.0;
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let src_c = src[i] as f32;
        let dst_c = dst[i] as f32;
        let blended = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
        out[i] = blended.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// Composite `src` over `dst` in place. Both images must share dimensions.
pub fn composite_over(dst: &mut RgbaImage, src: &RgbaImage) {
    debug_assert_eq!(dst.dimensions(), src.dimensions());
    for (x, y, src_pixel) in src.enumerate_pixels() {
        if src_pixel[3] == 0 {
            continue;
        }
        let dst_pixel = dst.get_pixel_mut(x, y);
        *dst_pixel = blend_pixels(*dst_pixel, *src_pixel);
    }
}

/// Apply the overlay frame to a base image according to the sizing policy.
///
/// With `keep_original_size` unset the overlay is stretched to the base
/// image's resolution and the output keeps the base dimensions. With it set
/// the overlay's resolution becomes the canvas: the base image is
/// cover-scaled, center-cropped to fill it, and the overlay is drawn on top.
pub fn apply_overlay(
    base: &RgbaImage,
    overlay: &RgbaImage,
    config: &OverlayConfig,
) -> Result<RgbaImage> {
    let (bw, bh) = base.dimensions();
    let (ow, oh) = overlay.dimensions();
    if bw == 0 || bh == 0 {
        return Err(ProcessingError::InvalidImage {
            message: "base image has zero width or height".to_string(),
        });
    }
    if ow == 0 || oh == 0 {
        return Err(ProcessingError::InvalidImage {
            message: "overlay image has zero width or height".to_string(),
        });
    }

    if config.keep_original_size {
        debug!(
            canvas_w = ow,
            canvas_h = oh,
            "compositing with cover-scaled base"
        );
        let mut canvas = cover_scale(base, ow, oh);
        composite_over(&mut canvas, overlay);
        Ok(canvas)
    } else {
        debug!(canvas_w = bw, canvas_h = bh, "compositing with stretched overlay");
        let mut canvas = base.clone();
        if (ow, oh) == (bw, bh) {
            composite_over(&mut canvas, overlay);
        } else {
            let resized = imageops::resize(overlay, bw, bh, FilterType::Lanczos3);
            composite_over(&mut canvas, &resized);
        }
        Ok(canvas)
    }
}

/// Scale `image` so it fully covers a `width` x `height` canvas, then
/// center-crop the excess.
fn cover_scale(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = image.dimensions();
    if (iw, ih) == (width, height) {
        return image.clone();
    }

    let scale = f64::max(width as f64 / iw as f64, height as f64 / ih as f64);
    let scaled_w = ((iw as f64 * scale).round() as u32).max(width);
    let scaled_h = ((ih as f64 * scale).round() as u32).max(height);

    let scaled = imageops::resize(image, scaled_w, scaled_h, FilterType::Lanczos3);
    let crop_x = (scaled_w - width) / 2;
    let crop_y = (scaled_h - height) / 2;
    imageops::crop_imm(&scaled, crop_x, crop_y, width, height).to_image()
}
