//! Image-stream classifier: walks the indirect objects of a loaded document and yields
//! every `/Subtype /Image` stream as an `ImageDescriptor`.
//!
//! A malformed dictionary only costs its own object: the error is returned as a
//! `Skipped` item and the walk moves on.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::extraction::models::{ColorSpace, ImageDescriptor, SkipReason, Skipped, StreamFilter};

/// Lazily yields image candidates in the parser's own object order.
/// Non-stream objects and non-image streams are not candidates and produce nothing.
pub fn image_streams(
    doc: &Document,
) -> impl Iterator<Item = Result<ImageDescriptor, Skipped>> + '_ {
    doc.objects.iter().filter_map(move |(&object_id, object)| {
        let Object::Stream(stream) = object else {
            return None;
        };
        if !is_image(doc, &stream.dict) {
            return None;
        }
        Some(describe(doc, object_id, stream).map_err(|reason| Skipped { object_id, reason }))
    })
}

fn is_image(doc: &Document, dict: &Dictionary) -> bool {
    let Ok(subtype) = dict.get(b"Subtype") else {
        return false;
    };
    match resolve(doc, subtype) {
        Ok(Object::Name(name)) => name.as_slice() == b"Image",
        _ => false,
    }
}

fn describe(
    doc: &Document,
    object_id: ObjectId,
    stream: &Stream,
) -> Result<ImageDescriptor, SkipReason> {
    let dict = &stream.dict;
    let width = read_dimension(doc, dict, "Width")?;
    let height = read_dimension(doc, dict, "Height")?;
    let filter = StreamFilter::from_names(&read_filter_names(doc, dict)?);
    let color_space = ColorSpace::from_descriptor(&color_space_descriptor(doc, dict)?);

    if stream.content.is_empty() {
        return Err(SkipReason::EmptyStream);
    }

    Ok(ImageDescriptor {
        object_id,
        width,
        height,
        color_space,
        filter,
        raw_bytes: stream.content.clone(),
    })
}

/// Absent means zero; anything that is not a non-negative number is malformed.
fn read_dimension(doc: &Document, dict: &Dictionary, key: &str) -> Result<u32, SkipReason> {
    let Ok(object) = dict.get(key.as_bytes()) else {
        return Ok(0);
    };
    match resolve(doc, object)? {
        Object::Integer(value) => u32::try_from(*value)
            .map_err(|_| SkipReason::MalformedDictionary(format!("/{key} is {value}"))),
        Object::Real(value) if *value >= 0.0 => Ok(*value as u32),
        other => Err(SkipReason::MalformedDictionary(format!(
            "/{key} is {}",
            kind(other)
        ))),
    }
}

fn read_filter_names(doc: &Document, dict: &Dictionary) -> Result<Vec<String>, SkipReason> {
    let Ok(object) = dict.get(b"Filter") else {
        return Ok(Vec::new());
    };
    match resolve(doc, object)? {
        Object::Null => Ok(Vec::new()),
        Object::Name(name) => Ok(vec![name_to_string(name)]),
        Object::Array(items) => items
            .iter()
            .map(|item| match resolve(doc, item)? {
                Object::Name(name) => Ok(name_to_string(name)),
                other => Err(SkipReason::MalformedDictionary(format!(
                    "/Filter entry is {}",
                    kind(other)
                ))),
            })
            .collect(),
        other => Err(SkipReason::MalformedDictionary(format!(
            "/Filter is {}",
            kind(other)
        ))),
    }
}

/// Flattens `/ColorSpace` into text: a name as-is, an array as its names joined by spaces.
/// References inside arrays (ICC profiles, lookup tables) are not followed.
fn color_space_descriptor(doc: &Document, dict: &Dictionary) -> Result<String, SkipReason> {
    let Ok(object) = dict.get(b"ColorSpace") else {
        return Ok(String::new());
    };
    match resolve(doc, object)? {
        Object::Name(name) => Ok(name_to_string(name)),
        Object::Array(items) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Object::Name(name) => Some(name_to_string(name)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")),
        other => Err(SkipReason::MalformedDictionary(format!(
            "/ColorSpace is {}",
            kind(other)
        ))),
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, SkipReason> {
    match object {
        Object::Reference(id) => doc.get_object(*id).map_err(|e| {
            SkipReason::MalformedDictionary(format!("unresolvable reference {} {} R: {e}", id.0, id.1))
        }),
        other => Ok(other),
    }
}

fn name_to_string(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn kind(object: &Object) -> &'static str {
    match object {
        Object::Null => "null",
        Object::Boolean(_) => "a boolean",
        Object::Integer(_) => "an integer",
        Object::Real(_) => "a real",
        Object::Name(_) => "a name",
        Object::String(..) => "a string",
        Object::Array(_) => "an array",
        Object::Dictionary(_) => "a dictionary",
        Object::Stream(_) => "a stream",
        Object::Reference(_) => "a reference",
    }
}
