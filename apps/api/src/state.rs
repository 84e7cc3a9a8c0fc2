use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::search::SearchClient;
use crate::storage::ObjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable upload sink. Default: S3Store. Tests swap in an in-memory store.
    pub store: Arc<dyn ObjectStore>,
    pub llm: LlmClient,
    pub search: SearchClient,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State wired to the given store, with clients that are never expected to be called.
    pub fn for_tests(store: Arc<dyn ObjectStore>) -> Self {
        use crate::extraction::ExtractionConfig;

        let config = Config {
            s3_bucket: "test-bucket".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_public_url: "http://localhost:9000/test-bucket".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            llm_model: "test-model".to_string(),
            llm_max_tokens: 1024,
            google_search_api_key: None,
            google_search_engine_id: None,
            port: 0,
            rust_log: "debug".to_string(),
            request_timeout_secs: 60,
            max_upload_bytes: 25 * 1024 * 1024,
            extraction: ExtractionConfig::default(),
        };

        Self {
            store,
            llm: LlmClient::new(
                config.anthropic_api_key.clone(),
                config.llm_model.clone(),
                config.llm_max_tokens,
            )
            .unwrap(),
            search: SearchClient::new(None, None).unwrap(),
            config,
        }
    }
}
