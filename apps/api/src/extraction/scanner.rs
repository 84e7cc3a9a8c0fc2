//! Binary pattern fallback scanner.
//!
//! Used only when the object walk finds nothing. Slices the raw upload between known
//! start/end signatures (JPEG SOI..EOI, PNG signature..IEND) without looking at the PDF
//! structure at all. Slices are not decoded, so truncated or interleaved images can come
//! out wrong; overlapping or duplicate slices are not filtered.

use crate::extraction::models::ExtractedImage;
use crate::extraction::signature::{
    find, ImageFormat, JPEG_EOI, JPEG_SOI, PNG_IEND, PNG_SIGNATURE,
};
use crate::extraction::ExtractionConfig;

/// Runs the JPEG pass, then the PNG pass. Results are in byte-offset order per pass.
pub fn scan_embedded_images(buffer: &[u8], config: &ExtractionConfig) -> Vec<ExtractedImage> {
    let mut images = Vec::new();
    scan_pass(buffer, &JPEG_SOI, &JPEG_EOI, ImageFormat::Jpeg, config, &mut images);
    scan_pass(buffer, &PNG_SIGNATURE, &PNG_IEND, ImageFormat::Png, config, &mut images);
    images
}

fn scan_pass(
    buffer: &[u8],
    start_marker: &[u8],
    end_marker: &[u8],
    format: ImageFormat,
    config: &ExtractionConfig,
    images: &mut Vec<ExtractedImage>,
) {
    let limit = buffer.len().min(config.max_scan_bytes);
    let mut cursor = 0;

    while cursor < limit && images.len() < config.max_fallback_images {
        let Some(offset) = find(&buffer[cursor..limit], start_marker) else {
            break;
        };
        let start = cursor + offset;
        let search_from = start + start_marker.len();
        let search_to = start
            .saturating_add(config.max_marker_span)
            .min(buffer.len())
            .max(search_from);

        match find(&buffer[search_from..search_to], end_marker) {
            Some(relative) => {
                let end = search_from + relative + end_marker.len();
                if end - start > config.min_embedded_image_bytes {
                    images.push(ExtractedImage {
                        data: buffer[start..end].to_vec(),
                        format,
                        width: None,
                        height: None,
                    });
                }
                // Non-overlapping: the next search starts after this end marker.
                cursor = end;
            }
            None => cursor = start + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::testing::fake_jpeg;

    fn fake_png(body_len: usize) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend(std::iter::repeat(0x17).take(body_len));
        bytes.extend_from_slice(&PNG_IEND);
        bytes
    }

    fn filler(len: usize) -> Vec<u8> {
        vec![b'x'; len]
    }

    #[test]
    fn test_finds_single_jpeg_at_exact_range() {
        let jpeg = fake_jpeg(1500);
        let mut buffer = filler(777);
        buffer.extend_from_slice(&jpeg);
        buffer.extend(filler(2048));

        let images = scan_embedded_images(&buffer, &ExtractionConfig::default());
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].format, ImageFormat::Jpeg);
        assert_eq!(images[0].data, jpeg);
        assert_eq!(images[0].data.as_slice(), &buffer[777..777 + jpeg.len()]);
    }

    #[test]
    fn test_rejects_short_jpeg_match() {
        let mut buffer = filler(100);
        buffer.extend(fake_jpeg(500));
        buffer.extend(filler(100));

        assert!(scan_embedded_images(&buffer, &ExtractionConfig::default()).is_empty());
    }

    #[test]
    fn test_length_floor_is_strict() {
        // SOI (3) + body (995) + EOI (2) = exactly 1000 bytes.
        let buffer = fake_jpeg(995);
        assert_eq!(buffer.len(), 1000);
        assert!(scan_embedded_images(&buffer, &ExtractionConfig::default()).is_empty());

        let buffer = fake_jpeg(996);
        assert_eq!(scan_embedded_images(&buffer, &ExtractionConfig::default()).len(), 1);
    }

    #[test]
    fn test_finds_png_between_signature_and_iend() {
        let png = fake_png(1200);
        let mut buffer = filler(33);
        buffer.extend_from_slice(&png);
        buffer.extend(filler(10));

        let images = scan_embedded_images(&buffer, &ExtractionConfig::default());
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].format, ImageFormat::Png);
        assert_eq!(images[0].data, png);
    }

    #[test]
    fn test_finds_consecutive_images_of_both_kinds() {
        let mut buffer = Vec::new();
        buffer.extend(fake_jpeg(1100));
        buffer.extend(filler(5));
        buffer.extend(fake_png(1300));
        buffer.extend(fake_jpeg(2000));

        let images = scan_embedded_images(&buffer, &ExtractionConfig::default());
        let mut kinds: Vec<_> = images.iter().map(|i| (i.format, i.data.len())).collect();
        kinds.sort_by_key(|(_, len)| *len);
        assert_eq!(
            kinds,
            vec![
                (ImageFormat::Jpeg, 1105),
                (ImageFormat::Png, 1316),
                (ImageFormat::Jpeg, 2005)
            ]
        );
    }

    #[test]
    fn test_unterminated_start_marker_is_ignored() {
        let mut buffer = JPEG_SOI.to_vec();
        buffer.extend(filler(5000));
        assert!(scan_embedded_images(&buffer, &ExtractionConfig::default()).is_empty());
    }

    #[test]
    fn test_respects_image_cap() {
        let mut buffer = Vec::new();
        for _ in 0..5 {
            buffer.extend(fake_jpeg(1200));
        }
        let config = ExtractionConfig {
            max_fallback_images: 3,
            ..ExtractionConfig::default()
        };
        assert_eq!(scan_embedded_images(&buffer, &config).len(), 3);
    }

    #[test]
    fn test_respects_marker_span() {
        let buffer = fake_jpeg(4000);
        let config = ExtractionConfig {
            max_marker_span: 2000,
            ..ExtractionConfig::default()
        };
        assert!(scan_embedded_images(&buffer, &config).is_empty());
    }
}
