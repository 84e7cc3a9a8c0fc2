//! Axum route handlers for the Résumé API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resume::models::Resume;
use crate::resume::service::{
    extract_resume_text, structure_resume, tailor_resume, translate_resume, write_cover_letter,
    TailorOptions, BULLET_WORD_LIMITS,
};
use crate::state::AppState;
use crate::uploads::read_file_field;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResumeResponse {
    pub resume: Resume,
    pub text_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub resume: Resume,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub resume: Resume,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub resume: Resume,
    #[serde(default)]
    pub job_description: String,
    pub tone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub resume: Resume,
    pub job_description: Option<String>,
    #[serde(default)]
    pub ats_optimized: bool,
    pub bullet_word_limit: Option<u32>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub resume: Resume,
    /// False when there was no job description and the résumé came back as sent.
    pub tailored: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/parse
///
/// Extracts the text of an uploaded PDF résumé and returns it as a structured `Resume`.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let file = read_file_field(multipart)
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    if !file.is_pdf() {
        return Err(AppError::Validation(
            "Invalid file type. Please upload a PDF file.".to_string(),
        ));
    }

    let text = extract_resume_text(file.bytes).await?;
    if text.is_empty() {
        return Err(AppError::Unprocessable(
            "No extractable text found in the PDF".to_string(),
        ));
    }

    let resume = structure_resume(&text, &state.llm).await?;

    Ok(Json(ParseResumeResponse {
        resume,
        text_length: text.chars().count(),
    }))
}

/// POST /api/v1/resume/translate
pub async fn handle_translate_resume(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, AppError> {
    let language = request.language.trim();
    if language.is_empty() {
        return Err(AppError::Validation("language cannot be empty".to_string()));
    }

    let resume = translate_resume(&request.resume, language, &state.llm).await?;
    Ok(Json(TranslateResponse { resume }))
}

/// POST /api/v1/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }

    let text = write_cover_letter(
        &request.resume,
        &request.job_description,
        request.tone.as_deref(),
        &state.llm,
    )
    .await?;

    Ok(Json(CoverLetterResponse { text }))
}

/// POST /api/v1/resume/tailor
///
/// Regenerates the résumé for a job offer in the same schema.
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorResponse>, AppError> {
    if let Some(limit) = request.bullet_word_limit {
        if !BULLET_WORD_LIMITS.contains(&limit) {
            return Err(AppError::Validation(format!(
                "bulletWordLimit must be between {} and {}",
                BULLET_WORD_LIMITS.start(),
                BULLET_WORD_LIMITS.end()
            )));
        }
    }

    let options = TailorOptions {
        job_description: request.job_description,
        ats_optimized: request.ats_optimized,
        bullet_word_limit: request.bullet_word_limit,
        language: request.language,
    }
    .normalized();

    let (resume, tailored) = tailor_resume(&request.resume, &options, &state.llm).await?;
    Ok(Json(TailorResponse { resume, tailored }))
}
