use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::ExtractionConfig;
use crate::llm_client;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub s3_bucket: String,
    pub s3_endpoint: String,
    /// Base URL prepended to object keys in upload responses.
    /// Defaults to `{S3_ENDPOINT}/{S3_BUCKET}` (path-style, works for MinIO).
    pub s3_public_url: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub extraction: ExtractionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_bucket = require_env("S3_BUCKET")?;
        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let s3_public_url = std::env::var("S3_PUBLIC_URL")
            .unwrap_or_else(|_| format!("{}/{}", s3_endpoint.trim_end_matches('/'), s3_bucket));

        let defaults = ExtractionConfig::default();
        let extraction = ExtractionConfig {
            size_tolerance: env_or("EXTRACT_SIZE_TOLERANCE", defaults.size_tolerance)?,
            min_embedded_image_bytes: env_or(
                "EXTRACT_MIN_EMBEDDED_BYTES",
                defaults.min_embedded_image_bytes,
            )?,
            min_dimension: env_or("EXTRACT_MIN_DIMENSION", defaults.min_dimension)?,
            max_dimension: env_or("EXTRACT_MAX_DIMENSION", defaults.max_dimension)?,
            max_fallback_images: env_or(
                "EXTRACT_MAX_FALLBACK_IMAGES",
                defaults.max_fallback_images,
            )?,
            ..defaults
        };
        if !(0.0..1.0).contains(&extraction.size_tolerance) {
            anyhow::bail!("EXTRACT_SIZE_TOLERANCE must be in [0, 1)");
        }

        Ok(Config {
            s3_bucket,
            s3_endpoint,
            s3_public_url,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| llm_client::MODEL.to_string()),
            llm_max_tokens: env_or("LLM_MAX_TOKENS", llm_client::MAX_TOKENS)?,
            google_search_api_key: std::env::var("GOOGLE_SEARCH_API_KEY").ok(),
            google_search_engine_id: std::env::var("GOOGLE_SEARCH_ENGINE_ID").ok(),
            port: env_or("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 60u64)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 25 * 1024 * 1024usize)?,
            extraction,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, parsing it when present.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: u32 = env_or("FOLIO_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_env_or_rejects_garbage() {
        std::env::set_var("FOLIO_TEST_GARBAGE_VARIABLE", "not-a-number");
        let result: Result<u32> = env_or("FOLIO_TEST_GARBAGE_VARIABLE", 1);
        assert!(result.is_err());
        std::env::remove_var("FOLIO_TEST_GARBAGE_VARIABLE");
    }

    #[test]
    fn test_env_or_parses_float() {
        std::env::set_var("FOLIO_TEST_FLOAT_VARIABLE", " 0.25 ");
        let value: f64 = env_or("FOLIO_TEST_FLOAT_VARIABLE", 0.1).unwrap();
        assert!((value - 0.25).abs() < f64::EPSILON);
        std::env::remove_var("FOLIO_TEST_FLOAT_VARIABLE");
    }
}
