//! Axum route handler for the image-extraction API.

use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::extraction::models::ExtractedImage;
use crate::extraction::pipeline::extract_images;
use crate::extraction::signature::detect_image_format;
use crate::state::AppState;
use crate::storage::{ObjectStore, UploadTarget};
use crate::uploads::{read_file_field, UploadedFile};

const EXTRACTED_FOLDER: &str = "pdf_extracted_images";
const DIRECT_UPLOAD_FOLDER: &str = "uploaded_images";

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub filename: String,
    pub url: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfDebug {
    pub total_pages: usize,
    pub total_images_found: usize,
    pub successful_processing: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDebug {
    pub file_type: &'static str,
    pub original_filename: String,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ExtractionDebug {
    Pdf(PdfDebug),
    Image(ImageDebug),
}

#[derive(Debug, Serialize)]
pub struct ExtractImagesResponse {
    pub message: String,
    pub files: Vec<UploadedImage>,
    pub debug: ExtractionDebug,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/extract-images
///
/// Accepts a PDF (images are extracted and uploaded) or a single image (uploaded as-is).
/// Per-image upload failures shrink `files`; they never fail the request.
pub async fn handle_extract_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractImagesResponse>, AppError> {
    let file = read_file_field(multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    if file.is_image() {
        return upload_single_image(state.store.as_ref(), file).await.map(Json);
    }

    if !file.is_pdf() {
        return Err(AppError::Validation(
            "Invalid file type. Please upload a PDF or image file.".to_string(),
        ));
    }

    info!(
        "Extracting images from {} ({} bytes)",
        file.filename,
        file.bytes.len()
    );

    let config = state.config.extraction.clone();
    let bytes = file.bytes.clone();
    let outcome = tokio::task::spawn_blocking(move || extract_images(&bytes, &config))
        .await
        .map_err(|e| AppError::Internal(anyhow!("Extraction task failed: {e}")))??;

    let total_images_found = outcome.images.len();
    if total_images_found == 0 {
        return Ok(Json(ExtractImagesResponse {
            message: "PDF processed successfully, but no images were found.".to_string(),
            files: Vec::new(),
            debug: ExtractionDebug::Pdf(PdfDebug {
                total_pages: outcome.page_count,
                total_images_found: 0,
                successful_processing: 0,
            }),
        }));
    }

    let files = upload_extracted(state.store.as_ref(), file.stem(), outcome.images).await;

    Ok(Json(ExtractImagesResponse {
        message: format!("Successfully extracted {} image(s).", files.len()),
        debug: ExtractionDebug::Pdf(PdfDebug {
            total_pages: outcome.page_count,
            total_images_found,
            successful_processing: files.len(),
        }),
        files,
    }))
}

/// Uploads images one at a time as `{stem}_image_{n}.{ext}`. A failed upload is logged
/// and left out of the result; the others still go through.
pub async fn upload_extracted(
    store: &dyn ObjectStore,
    stem: &str,
    images: Vec<ExtractedImage>,
) -> Vec<UploadedImage> {
    let mut uploaded = Vec::with_capacity(images.len());

    for (index, image) in images.into_iter().enumerate() {
        let filename = format!("{stem}_image_{}.{}", index + 1, image.extension());
        let mime_type = image.format.mime_type();
        let target = UploadTarget::new(EXTRACTED_FOLDER, &filename, &mime_type);

        match store.upload(image.data, &target).await {
            Ok(stored) => {
                debug!("Stored {filename} at {}", stored.key);
                uploaded.push(UploadedImage {
                    filename,
                    url: stored.url,
                    mime_type,
                });
            }
            Err(e) => warn!("Upload of {filename} failed, dropping it: {e}"),
        }
    }

    uploaded
}

async fn upload_single_image(
    store: &dyn ObjectStore,
    file: UploadedFile,
) -> Result<ExtractImagesResponse, AppError> {
    let mime_type = file
        .content_type
        .clone()
        .filter(|ct| ct.starts_with("image/"))
        .or_else(|| detect_image_format(&file.bytes).map(|f| f.mime_type()))
        .unwrap_or_else(|| "image/jpeg".to_string());

    let target = UploadTarget::new(DIRECT_UPLOAD_FOLDER, &file.filename, &mime_type);
    let stored = store.upload(file.bytes.to_vec(), &target).await?;

    Ok(ExtractImagesResponse {
        message: "Image uploaded successfully.".to_string(),
        files: vec![UploadedImage {
            filename: file.filename.clone(),
            url: stored.url,
            mime_type: mime_type.clone(),
        }],
        debug: ExtractionDebug::Image(ImageDebug {
            file_type: "image",
            original_filename: file.filename,
            mime_type,
        }),
    })
}
