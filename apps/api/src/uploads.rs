//! Shared handling of `multipart/form-data` uploads carrying a single `file` field.

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

const FILE_FIELD: &str = "file";

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".svg", ".tiff", ".tif",
];

const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/svg+xml",
    "image/tiff",
];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name with any directory components removed.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Extension check only; the bytes are not sniffed.
    pub fn is_pdf(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf")
    }

    pub fn is_image(&self) -> bool {
        let name = self.filename.to_ascii_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
            || self
                .content_type
                .as_deref()
                .is_some_and(|ct| IMAGE_MIME_TYPES.contains(&ct))
    }

    /// Filename without its last extension.
    pub fn stem(&self) -> &str {
        match self.filename.rfind('.') {
            Some(dot) if dot > 0 => &self.filename[..dot],
            _ => &self.filename,
        }
    }
}

/// Reads fields until `file` is found. `Ok(None)` when the form has no such field.
pub async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or_default());
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {e}")))?;

        if filename.is_empty() {
            return Ok(None);
        }

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

/// Keeps the last path component so client paths never leak into object keys.
fn sanitize_filename(raw: &str) -> String {
    raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim().to_string()
}
