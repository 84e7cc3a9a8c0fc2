// Best-effort raster image extraction from uploaded PDFs.
// Implements: image-stream classification, raw pixel reconstruction, signature-based
// fallback scanning, and the upload route that pushes results to object storage.
// The walk and reconstruction are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod classifier;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod raster;
pub mod scanner;
pub mod signature;
#[cfg(test)]
pub(crate) mod testing;

/// Heuristic thresholds for the extractor. Every value is overridable through `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Relative slack allowed between a raw pixel buffer and `width * height * channels`.
    /// Also bounds how far a `/FlateDecode` stream is inflated.
    pub size_tolerance: f64,
    /// Slices found by the fallback scanner must be strictly longer than this.
    pub min_embedded_image_bytes: usize,
    /// Images with either side below this are skipped. Defaults to 1 so every well-formed
    /// image is kept; raise it to drop icons and spacer pixels.
    pub min_dimension: u32,
    pub max_dimension: u32,
    pub max_fallback_images: usize,
    /// The fallback scanner never looks past this many bytes of the upload.
    pub max_scan_bytes: usize,
    /// Maximum distance searched for an end marker after a start marker.
    pub max_marker_span: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            size_tolerance: 0.10,
            min_embedded_image_bytes: 1000,
            min_dimension: 1,
            max_dimension: 10_000,
            max_fallback_images: 100,
            max_scan_bytes: 50 * 1024 * 1024,
            max_marker_span: 10 * 1024 * 1024,
        }
    }
}
