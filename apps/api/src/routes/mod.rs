pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::handlers as extraction;
use crate::resume::handlers as resume;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Image extraction API
        .route(
            "/api/v1/extract-images",
            post(extraction::handle_extract_images),
        )
        // Resume API
        .route("/api/v1/resume/parse", post(resume::handle_parse_resume))
        .route(
            "/api/v1/resume/translate",
            post(resume::handle_translate_resume),
        )
        .route("/api/v1/resume/tailor", post(resume::handle_tailor_resume))
        .route("/api/v1/cover-letter", post(resume::handle_cover_letter))
        // Job search API
        .route("/api/v1/jobs/search", post(search::handle_job_search))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
