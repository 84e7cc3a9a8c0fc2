use std::fmt;

use lopdf::ObjectId;

use crate::extraction::signature::ImageFormat;

/// Declared channel semantics of a raw image stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Unknown,
}

impl ColorSpace {
    /// Classifies the textual form of a `/ColorSpace` entry by substring,
    /// so `DeviceGray`, `CalGray` and `[/ICCBased ..]` style values all land somewhere.
    pub fn from_descriptor(descriptor: &str) -> Self {
        if descriptor.contains("Gray") {
            ColorSpace::Gray
        } else if descriptor.contains("CMYK") {
            ColorSpace::Cmyk
        } else if descriptor.contains("RGB") {
            ColorSpace::Rgb
        } else {
            ColorSpace::Unknown
        }
    }

    /// Unknown spaces are assumed to be three-channel.
    pub fn channels(self) -> usize {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Cmyk => 4,
            ColorSpace::Rgb | ColorSpace::Unknown => 3,
        }
    }
}

/// Encoding declared on an image stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFilter {
    Dct,
    Flate,
    Jpx,
    None,
    Other(String),
}

impl StreamFilter {
    /// Picks the filter from a stream's filter chain. DCT wins over Flate wins over JPX;
    /// any other non-empty chain is reported by its first name.
    pub fn from_names(names: &[String]) -> Self {
        let has = |wanted: &str| names.iter().any(|n| n.contains(wanted));
        if has("DCTDecode") {
            StreamFilter::Dct
        } else if has("FlateDecode") {
            StreamFilter::Flate
        } else if has("JPXDecode") {
            StreamFilter::Jpx
        } else {
            match names.first() {
                None => StreamFilter::None,
                Some(name) if name == "null" => StreamFilter::None,
                Some(name) => StreamFilter::Other(name.clone()),
            }
        }
    }
}

/// One `/Subtype /Image` stream as read from the object graph.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    pub object_id: ObjectId,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub filter: StreamFilter,
    pub raw_bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ExtractedImage {
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }
}

/// Why a candidate stream produced no image.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MalformedDictionary(String),
    EmptyStream,
    DimensionsOutOfRange { width: u32, height: u32 },
    DecompressFailed(String),
    SizeMismatch { actual: usize, expected: usize },
    EncodeFailed(String),
    NotJpeg,
    UnsupportedFilter(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MalformedDictionary(msg) => write!(f, "malformed dictionary: {msg}"),
            SkipReason::EmptyStream => write!(f, "empty stream"),
            SkipReason::DimensionsOutOfRange { width, height } => {
                write!(f, "dimensions {width}x{height} out of range")
            }
            SkipReason::DecompressFailed(msg) => write!(f, "inflate failed: {msg}"),
            SkipReason::SizeMismatch { actual, expected } => {
                write!(f, "{actual} bytes of pixel data, expected about {expected}")
            }
            SkipReason::EncodeFailed(msg) => write!(f, "PNG encoding failed: {msg}"),
            SkipReason::NotJpeg => write!(f, "DCT stream is not a complete JPEG"),
            SkipReason::UnsupportedFilter(name) => write!(f, "unsupported filter /{name}"),
        }
    }
}

/// A candidate that was dropped, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub object_id: ObjectId,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub page_count: usize,
    pub images: Vec<ExtractedImage>,
    pub skipped: Vec<Skipped>,
    /// True when the images came from the signature scanner rather than the object walk.
    pub used_fallback: bool,
}
