use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::search::SearchResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobSearchRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct JobSearchResponse {
    pub results: Vec<SearchResult>,
}

/// POST /api/v1/jobs/search
pub async fn handle_job_search(
    State(state): State<AppState>,
    Json(request): Json<JobSearchRequest>,
) -> Result<Json<JobSearchResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation(
            "Query parameter is required".to_string(),
        ));
    }

    let results = state.search.search(query).await?;
    Ok(Json(JobSearchResponse { results }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::storage::memory::MemoryStore;

    async fn post(body: &str) -> (StatusCode, Value) {
        let app = build_router(AppState::for_tests(Arc::new(MemoryStore::default())));
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/jobs/search")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let (status, body) = post(r#"{"query": "   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Query parameter is required");
    }

    #[tokio::test]
    async fn test_unconfigured_search_is_a_server_error() {
        let (status, body) = post(r#"{"query": "rust developer berlin"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch search results");
    }
}
