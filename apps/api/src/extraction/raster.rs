//! Raster reconstructor: turns an unfiltered (or already inflated) pixel buffer into a PNG.
//!
//! Algorithm:
//! 1. channels from the color space (Gray 1, CMYK 4, RGB/unknown 3)
//! 2. reject unless `len` is within `expected ± tolerance` where `expected = w × h × channels`
//! 3. expand every pixel to RGBA (CMYK via `255·(1−c)·(1−k)` per channel)
//! 4. encode as PNG
//!
//! Rejections are `SkipReason` values, never panics.

use std::io::{Cursor, Read};

use flate2::read::ZlibDecoder;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::extraction::models::{ColorSpace, SkipReason};

/// Inflates a `/FlateDecode` payload, stopping after `limit` bytes of output.
///
/// A result of exactly `limit` bytes means the stream was cut off; size it with
/// `inflate_limit` so such a result always fails the tolerance check.
pub fn inflate(raw: &[u8], limit: usize) -> Result<Vec<u8>, SkipReason> {
    let mut out = Vec::new();
    ZlibDecoder::new(raw)
        .take(limit as u64)
        .read_to_end(&mut out)
        .map_err(|e| SkipReason::DecompressFailed(e.to_string()))?;
    Ok(out)
}

/// One byte past the largest buffer `within_tolerance` accepts for `expected`.
pub fn inflate_limit(expected: usize, tolerance: f64) -> usize {
    (expected as f64 * (1.0 + tolerance)).floor() as usize + 1
}

/// Expected byte count for `width × height` pixels of `color_space`, or `None` on overflow.
pub fn expected_size(width: u32, height: u32, color_space: ColorSpace) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(color_space.channels())
}

/// True when `actual` lies inside `[(1 - tolerance) · expected, (1 + tolerance) · expected]`.
pub fn within_tolerance(actual: usize, expected: usize, tolerance: f64) -> bool {
    let actual = actual as f64;
    let expected = expected as f64;
    actual >= expected * (1.0 - tolerance) && actual <= expected * (1.0 + tolerance)
}

pub fn reconstruct_png(
    raw: &[u8],
    width: u32,
    height: u32,
    color_space: ColorSpace,
    tolerance: f64,
) -> Result<Vec<u8>, SkipReason> {
    if width == 0 || height == 0 {
        return Err(SkipReason::DimensionsOutOfRange { width, height });
    }
    let expected = expected_size(width, height, color_space)
        .ok_or(SkipReason::DimensionsOutOfRange { width, height })?;
    if !within_tolerance(raw.len(), expected, tolerance) {
        return Err(SkipReason::SizeMismatch {
            actual: raw.len(),
            expected,
        });
    }

    let rgba = expand_to_rgba(raw, width as usize * height as usize, color_space);
    let buffer = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        SkipReason::EncodeFailed("pixel buffer does not match dimensions".to_string())
    })?;

    let mut png = Vec::new();
    DynamicImage::ImageRgba8(buffer)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| SkipReason::EncodeFailed(e.to_string()))?;
    Ok(png)
}

/// Expands `pixels` source pixels to RGBA. Bytes past the end of a short buffer read as 0.
pub fn expand_to_rgba(raw: &[u8], pixels: usize, color_space: ColorSpace) -> Vec<u8> {
    let byte = |i: usize| raw.get(i).copied().unwrap_or(0);
    let mut rgba = Vec::with_capacity(pixels * 4);

    match color_space {
        ColorSpace::Gray => {
            for i in 0..pixels {
                let g = byte(i);
                rgba.extend_from_slice(&[g, g, g, 255]);
            }
        }
        ColorSpace::Cmyk => {
            for i in 0..pixels {
                let base = i * 4;
                let [r, g, b] =
                    cmyk_to_rgb(byte(base), byte(base + 1), byte(base + 2), byte(base + 3));
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
        ColorSpace::Rgb | ColorSpace::Unknown => {
            for i in 0..pixels {
                rgba.extend_from_slice(&[byte(i * 3), byte(i * 3 + 1), byte(i * 3 + 2), 255]);
            }
        }
    }

    rgba
}

/// Naive CMYK → RGB without a color profile.
pub fn cmyk_to_rgb(c: u8, m: u8, y: u8, k: u8) -> [u8; 3] {
    let unit = |v: u8| f64::from(v) / 255.0;
    let key = 1.0 - unit(k);
    let channel = |v: u8| (255.0 * (1.0 - unit(v)) * key).round() as u8;
    [channel(c), channel(m), channel(y)]
}
