//! Object storage for extracted and uploaded images.
//!
//! `AppState` holds an `Arc<dyn ObjectStore>`; production uses `S3Store` (MinIO locally,
//! AWS in production), tests use the in-memory store.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::AppError;

pub mod s3;

#[cfg(test)]
pub mod memory;

pub use s3::S3Store;

/// Where an upload lands and how it is labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub folder: String,
    pub filename: String,
    pub content_type: String,
}

impl UploadTarget {
    pub fn new(folder: &str, filename: &str, content_type: &str) -> Self {
        Self {
            folder: folder.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}/{}", self.folder.trim_end_matches('/'), self.filename)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` and returns its public URL. Failures are per call; callers decide
    /// whether one failed upload matters to the rest.
    async fn upload(&self, bytes: Vec<u8>, target: &UploadTarget)
        -> Result<StoredObject, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_joins_folder_and_filename() {
        let target = UploadTarget::new("pdf_extracted_images/", "cv_image_1.png", "image/png");
        assert_eq!(target.key(), "pdf_extracted_images/cv_image_1.png");
    }
}
