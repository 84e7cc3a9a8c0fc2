//! Extraction pipeline: load → classify → reconstruct, then the signature scanner when the
//! object walk came up empty.
//!
//! Only a document that fails to load is an error. Every per-stream failure becomes a
//! `Skipped` entry on the outcome and the walk continues.

use lopdf::Document;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extraction::classifier::image_streams;
use crate::extraction::models::{
    ExtractedImage, ExtractionOutcome, ImageDescriptor, SkipReason, Skipped, StreamFilter,
};
use crate::extraction::raster::{expected_size, inflate, inflate_limit, reconstruct_png};
use crate::extraction::scanner::scan_embedded_images;
use crate::extraction::signature::{is_valid_jpeg, ImageFormat};
use crate::extraction::ExtractionConfig;

/// Blocking. Call from `tokio::task::spawn_blocking`.
pub fn extract_images(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutcome, AppError> {
    let doc = Document::load_mem(bytes).map_err(|e| AppError::Processing {
        message: format!("Error processing file: {e}"),
        details: Some(format!("{e:?}")),
    })?;

    let mut outcome = ExtractionOutcome {
        page_count: doc.get_pages().len(),
        ..ExtractionOutcome::default()
    };

    for candidate in image_streams(&doc) {
        match candidate.and_then(|descriptor| process_descriptor(descriptor, config)) {
            Ok(image) => outcome.images.push(image),
            Err(skipped) => {
                debug!(
                    "Skipping image object {} {}: {}",
                    skipped.object_id.0, skipped.object_id.1, skipped.reason
                );
                outcome.skipped.push(skipped);
            }
        }
    }

    if outcome.images.is_empty() {
        outcome.images = scan_embedded_images(bytes, config);
        outcome.used_fallback = !outcome.images.is_empty();
    }

    info!(
        "Extracted {} image(s) from {} page(s) ({} skipped, fallback: {})",
        outcome.images.len(),
        outcome.page_count,
        outcome.skipped.len(),
        outcome.used_fallback
    );

    Ok(outcome)
}

/// Turns one descriptor into an image, or says why it could not.
pub fn process_descriptor(
    descriptor: ImageDescriptor,
    config: &ExtractionConfig,
) -> Result<ExtractedImage, Skipped> {
    let object_id = descriptor.object_id;
    decode_descriptor(descriptor, config).map_err(|reason| Skipped { object_id, reason })
}

fn decode_descriptor(
    descriptor: ImageDescriptor,
    config: &ExtractionConfig,
) -> Result<ExtractedImage, SkipReason> {
    let ImageDescriptor {
        object_id,
        width,
        height,
        color_space,
        filter,
        raw_bytes,
    } = descriptor;

    let in_range = |side: u32| (config.min_dimension..=config.max_dimension).contains(&side);
    if !in_range(width) || !in_range(height) {
        return Err(SkipReason::DimensionsOutOfRange { width, height });
    }

    let (data, format) = match filter {
        StreamFilter::Dct => {
            if !is_valid_jpeg(&raw_bytes) {
                return Err(SkipReason::NotJpeg);
            }
            (raw_bytes, ImageFormat::Jpeg)
        }
        StreamFilter::Jpx => {
            // JPEG 2000 payloads are passed through unchecked; many viewers cannot show .jp2.
            warn!(
                "Passing through unvalidated JPX stream from object {} {}",
                object_id.0, object_id.1
            );
            (raw_bytes, ImageFormat::Jpeg2000)
        }
        StreamFilter::Flate => {
            let expected = expected_size(width, height, color_space)
                .ok_or(SkipReason::DimensionsOutOfRange { width, height })?;
            let inflated = inflate(&raw_bytes, inflate_limit(expected, config.size_tolerance))?;
            let png = reconstruct_png(&inflated, width, height, color_space, config.size_tolerance)?;
            (png, ImageFormat::Png)
        }
        StreamFilter::None => {
            let png = reconstruct_png(&raw_bytes, width, height, color_space, config.size_tolerance)?;
            (png, ImageFormat::Png)
        }
        StreamFilter::Other(name) => return Err(SkipReason::UnsupportedFilter(name)),
    };

    Ok(ExtractedImage {
        data,
        format,
        width: Some(width),
        height: Some(height),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::extraction::testing::{
        build_pdf, fake_jpeg, image_stream, rgb_pdf, rgb_pixels, zlib,
    };
    use lopdf::{dictionary, Object, Stream};

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    fn dimensions(outcome: &ExtractionOutcome) -> HashSet<(Option<u32>, Option<u32>)> {
        outcome.images.iter().map(|i| (i.width, i.height)).collect()
    }

    #[test]
    fn test_well_formed_rgb_images_all_reconstructed() {
        let outcome = extract_images(&rgb_pdf(4), &config()).unwrap();

        assert_eq!(outcome.page_count, 1);
        assert_eq!(outcome.images.len(), 4);
        assert!(outcome.images.iter().all(|i| i.format == ImageFormat::Png));
        assert!(!outcome.used_fallback);
        let expected: HashSet<_> = (0..4u32).map(|i| (Some(20 + i), Some(16 + i))).collect();
        assert_eq!(dimensions(&outcome), expected);
    }

    #[test]
    fn test_corrupt_objects_do_not_affect_valid_ones() {
        let pdf = build_pdf(vec![
            image_stream(20, 20, "DeviceRGB", None, rgb_pixels(20, 20, 1)).into(),
            // Not zlib at all.
            image_stream(20, 20, "DeviceRGB", Some("FlateDecode"), b"garbage".repeat(50)).into(),
            Stream::new(
                dictionary! {
                    "Subtype" => "Image",
                    "Width" => Object::Boolean(true),
                    "Height" => Object::Integer(20),
                },
                vec![1u8; 1200],
            )
            .into(),
            image_stream(
                24,
                24,
                "DeviceGray",
                Some("FlateDecode"),
                zlib(&vec![90u8; 24 * 24]),
            )
            .into(),
        ]);

        let outcome = extract_images(&pdf, &config()).unwrap();

        assert_eq!(outcome.images.len(), 2);
        let reasons: Vec<_> = outcome.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(reasons.len(), 2);
        assert!(reasons
            .iter()
            .any(|r| matches!(r, SkipReason::DecompressFailed(_))));
        assert!(reasons
            .iter()
            .any(|r| matches!(r, SkipReason::MalformedDictionary(_))));
    }

    #[test]
    fn test_size_mismatch_is_recorded() {
        let pdf = build_pdf(vec![
            image_stream(20, 20, "DeviceRGB", None, vec![3u8; 600]).into(),
        ]);
        let outcome = extract_images(&pdf, &config()).unwrap();

        assert!(outcome.images.is_empty());
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::SizeMismatch {
                actual: 600,
                expected: 1200
            }
        );
    }

    #[test]
    fn test_dct_stream_passed_through_as_jpeg() {
        let jpeg = fake_jpeg(400);
        let pdf = build_pdf(vec![
            image_stream(30, 30, "DeviceRGB", Some("DCTDecode"), jpeg.clone()).into(),
            image_stream(30, 30, "DeviceRGB", Some("DCTDecode"), vec![0x10; 64]).into(),
        ]);

        let outcome = extract_images(&pdf, &config()).unwrap();

        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].format, ImageFormat::Jpeg);
        assert_eq!(outcome.images[0].data, jpeg);
        assert_eq!(outcome.skipped[0].reason, SkipReason::NotJpeg);
    }

    #[test]
    fn test_jpx_stream_passed_through_unvalidated() {
        let pdf = build_pdf(vec![
            image_stream(30, 30, "DeviceRGB", Some("JPXDecode"), vec![0x33; 90]).into(),
        ]);
        let outcome = extract_images(&pdf, &config()).unwrap();

        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].format, ImageFormat::Jpeg2000);
        assert_eq!(outcome.images[0].extension(), "jp2");
    }

    #[test]
    fn test_cmyk_flate_image_decodes() {
        let mut raw = Vec::new();
        for i in 0..(12 * 12) {
            if i % 2 == 0 {
                raw.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                raw.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
        let pdf = build_pdf(vec![
            image_stream(12, 12, "DeviceCMYK", Some("FlateDecode"), zlib(&raw)).into(),
        ]);

        let outcome = extract_images(&pdf, &config()).unwrap();
        let img = image::load_from_memory(&outcome.images[0].data)
            .unwrap()
            .to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_small_well_formed_images_kept_by_default() {
        let pdf = build_pdf(vec![
            image_stream(8, 8, "DeviceRGB", None, rgb_pixels(8, 8, 0)).into(),
            image_stream(1, 1, "DeviceRGB", None, vec![10, 20, 30]).into(),
            image_stream(20, 20, "DeviceRGB", None, rgb_pixels(20, 20, 1)).into(),
        ]);
        let outcome = extract_images(&pdf, &config()).unwrap();

        assert!(outcome.skipped.is_empty());
        let expected: HashSet<_> = [(8, 8), (1, 1), (20, 20)]
            .into_iter()
            .map(|(w, h)| (Some(w), Some(h)))
            .collect();
        assert_eq!(dimensions(&outcome), expected);
    }

    #[test]
    fn test_flate_bomb_is_skipped_as_size_mismatch() {
        let pdf = build_pdf(vec![
            image_stream(
                10,
                10,
                "DeviceRGB",
                Some("FlateDecode"),
                zlib(&vec![0u8; 8 * 1024 * 1024]),
            )
            .into(),
            image_stream(20, 20, "DeviceRGB", None, rgb_pixels(20, 20, 2)).into(),
        ]);
        let outcome = extract_images(&pdf, &config()).unwrap();

        assert_eq!(outcome.images.len(), 1);
        assert_eq!(
            outcome.skipped[0].reason,
            SkipReason::SizeMismatch {
                actual: 331,
                expected: 300
            }
        );
    }

    #[test]
    fn test_dimension_floor_and_unsupported_filter_skipped() {
        let pdf = build_pdf(vec![
            image_stream(4, 4, "DeviceRGB", None, rgb_pixels(4, 4, 0)).into(),
            image_stream(20, 20, "DeviceGray", Some("CCITTFaxDecode"), vec![0u8; 50]).into(),
        ]);
        let config = ExtractionConfig {
            min_dimension: 10,
            ..config()
        };
        let outcome = extract_images(&pdf, &config).unwrap();

        assert!(outcome.images.is_empty());
        assert!(outcome.skipped.iter().any(|s| s.reason
            == SkipReason::DimensionsOutOfRange {
                width: 4,
                height: 4
            }));
        assert!(outcome.skipped.iter().any(|s| s.reason
            == SkipReason::UnsupportedFilter("CCITTFaxDecode".to_string())));
    }

    #[test]
    fn test_no_images_yields_empty_outcome() {
        let outcome = extract_images(&build_pdf(vec![]), &config()).unwrap();
        assert!(outcome.images.is_empty());
        assert!(!outcome.used_fallback);
    }

    #[test]
    fn test_falls_back_to_signature_scan() {
        // A JPEG hidden in a stream that is not marked as an image.
        let jpeg = fake_jpeg(3000);
        let pdf = build_pdf(vec![Stream::new(
            dictionary! { "Subtype" => "Form" },
            jpeg.clone(),
        )
        .into()]);

        let outcome = extract_images(&pdf, &config()).unwrap();
        assert!(outcome.used_fallback);
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].data, jpeg);
    }

    #[test]
    fn test_unloadable_document_is_an_error() {
        let result = extract_images(b"this is not a pdf", &config());
        assert!(matches!(result, Err(AppError::Processing { .. })));
    }
}
