//! Builders for in-memory PDFs used by the extraction tests.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use crate::extraction::signature::{JPEG_EOI, JPEG_SOI};

/// Deterministic RGB pattern that never contains a JPEG or PNG signature.
pub fn rgb_pixels(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                pixels.push(((x * 7 + y * 13 + c * 29 + seed * 31) % 200) as u8);
            }
        }
    }
    pixels
}

pub fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// SOI, `body_len` filler bytes, EOI.
pub fn fake_jpeg(body_len: usize) -> Vec<u8> {
    let mut bytes = JPEG_SOI.to_vec();
    bytes.extend(std::iter::repeat(0x42).take(body_len));
    bytes.extend_from_slice(&JPEG_EOI);
    bytes
}

pub fn image_stream(
    width: i64,
    height: i64,
    color_space: &str,
    filter: Option<&str>,
    data: Vec<u8>,
) -> Stream {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(width),
        "Height" => Object::Integer(height),
        "ColorSpace" => color_space,
        "BitsPerComponent" => Object::Integer(8),
    };
    if let Some(filter) = filter {
        dict.set("Filter", filter);
    }
    Stream::new(dict, data)
}

/// A one-page PDF whose page resources reference every given object as an XObject.
pub fn build_pdf(objects: Vec<Object>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut xobjects = Dictionary::new();
    for (index, object) in objects.into_iter().enumerate() {
        let id = doc.add_object(object);
        xobjects.set(format!("Im{index}"), Object::Reference(id));
    }

    let content_id = doc.add_object(Stream::new(dictionary! {}, b"q Q".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Contents" => Object::Reference(content_id),
        "Resources" => dictionary! { "XObject" => xobjects },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn rgb_pdf(count: u32) -> Vec<u8> {
    let objects: Vec<Object> = (0..count)
        .map(|i| {
            let (w, h) = (20 + i, 16 + i);
            image_stream(
                i64::from(w),
                i64::from(h),
                "DeviceRGB",
                None,
                rgb_pixels(w, h, i),
            )
            .into()
        })
        .collect();
    build_pdf(objects)
}
