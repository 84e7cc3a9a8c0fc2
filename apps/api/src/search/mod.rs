//! Job search: a thin client over the Google Custom Search JSON API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;

pub mod handlers;

const SEARCH_API_URL: &str = "https://www.googleapis.com/customsearch/v1";
const REQUEST_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub display_link: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Absent when the query has no hits.
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    api_key: Option<String>,
    engine_id: Option<String>,
}

impl SearchClient {
    pub fn new(
        api_key: Option<String>,
        engine_id: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            engine_id,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.engine_id.is_some()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AppError> {
        let (Some(api_key), Some(engine_id)) = (&self.api_key, &self.engine_id) else {
            return Err(AppError::Search(
                "GOOGLE_SEARCH_API_KEY / GOOGLE_SEARCH_ENGINE_ID are not configured".to_string(),
            ));
        };

        let response = self
            .client
            .get(SEARCH_API_URL)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", engine_id.as_str()),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!("Search API returned {status}: {body}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Unreadable search response: {e}")))?;

        debug!("Search for {query:?} returned {} item(s)", parsed.items.len());
        Ok(parsed.items)
    }
}
