//! Magic-byte detection for the image formats the extractor emits or accepts.

use serde::Serialize;

pub const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// `IEND` chunk type followed by its fixed CRC.
pub const PNG_IEND: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];

/// How far back from the end of a DCT stream an EOI marker may sit (trailing padding).
const JPEG_EOI_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Jpeg2000,
    Gif,
    Bmp,
    WebP,
}

impl ImageFormat {
    /// File extension used for uploaded objects.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg2000 => "jp2",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::WebP => "webp",
        }
    }

    /// `jpg` maps to `image/jpeg`; everything else is `image/{ext}`.
    pub fn mime_type(self) -> String {
        match self {
            ImageFormat::Jpeg => "image/jpeg".to_string(),
            other => format!("image/{}", other.extension()),
        }
    }
}

/// Sniffs the leading bytes. Needs at least 4 bytes.
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.len() < 4 {
        return None;
    }
    if bytes.starts_with(&JPEG_SOI) {
        return Some(ImageFormat::Jpeg);
    }
    if bytes.starts_with(&PNG_SIGNATURE[..4]) {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(b"GIF") {
        return Some(ImageFormat::Gif);
    }
    if bytes.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some(ImageFormat::WebP);
    }
    None
}

/// SOI at the start and an EOI marker somewhere in the trailing window.
pub fn is_valid_jpeg(bytes: &[u8]) -> bool {
    if bytes.len() < 10 || !bytes.starts_with(&JPEG_SOI) {
        return false;
    }
    let tail_start = bytes.len().saturating_sub(JPEG_EOI_WINDOW);
    bytes[tail_start..].windows(2).any(|w| w == JPEG_EOI)
}

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
