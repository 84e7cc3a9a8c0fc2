//! LLM client: the single point of entry for every completion call in Folio
//! (résumé structuring, translation, cover letters).
//!
//! No other module talks to the Anthropic API directly. Rate limits, 5xx responses and
//! connection failures are retried with exponential backoff (honouring `retry-after` when
//! the API sends one), all inside one deadline shared by every attempt. Timeouts and any
//! other failure are returned to the caller, which maps them to `AppError::Llm`.
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Default model when `LLM_MODEL` is not set.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Default completion budget; a fully structured résumé is the largest output we ask for.
pub const MAX_TOKENS: u32 = 8192;
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1000;
/// Deadline for a whole `call`, attempts and backoff included. Kept under the 60 s request
/// ceiling so a slow completion surfaces as an LLM error rather than a bare timeout.
const CALL_BUDGET: Duration = Duration::from_secs(55);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No time left in the {budget_secs}s call budget")]
    DeadlineExceeded { budget_secs: u64 },

    #[error("LLM returned empty content")]
    EmptyContent,

    /// The model hit the token budget, so any JSON it produced is cut off.
    #[error("LLM output truncated at {max_tokens} tokens")]
    Truncated { max_tokens: u32 },
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// All text blocks joined in order. `None` when the response carries no text at all.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        (!parts.is_empty()).then(|| parts.concat())
    }

    fn was_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(LlmResponse),
    Retry {
        error: LlmError,
        wait: Option<Duration>,
    },
    Fail(LlmError),
}

/// Anthropic Messages API client shared by every LLM-backed endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(CALL_BUDGET).build()?,
            api_key,
            model,
            max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one user message and returns the raw response, retrying rate limits and 5xx.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let deadline = Instant::now() + CALL_BUDGET;
        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.attempt(&body, remaining).await {
                Attempt::Done(response) => {
                    debug!(
                        "LLM call on attempt {attempt}: {} in / {} out tokens",
                        response.usage.input_tokens, response.usage.output_tokens
                    );
                    return Ok(response);
                }
                Attempt::Fail(error) => return Err(error),
                Attempt::Retry { error, wait } => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    let Some(delay) = next_delay(attempt, wait, remaining) else {
                        return Err(error);
                    };
                    warn!(
                        "LLM attempt {attempt}/{MAX_ATTEMPTS} failed ({error}); retrying in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or(LlmError::DeadlineExceeded {
            budget_secs: CALL_BUDGET.as_secs(),
        }))
    }

    async fn attempt(&self, body: &MessagesRequest<'_>, remaining: Duration) -> Attempt {
        let response = match self
            .client
            .post(ANTHROPIC_API_URL)
            .timeout(remaining)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            // A timed-out attempt has used the remaining budget; it is not retried.
            Err(e) if e.is_connect() && !e.is_timeout() => {
                return Attempt::Retry {
                    error: LlmError::Http(e),
                    wait: None,
                }
            }
            Err(e) => return Attempt::Fail(LlmError::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<LlmResponse>().await {
                Ok(parsed) => Attempt::Done(parsed),
                Err(e) => Attempt::Fail(LlmError::Http(e)),
            };
        }

        let wait = retry_after(&response);
        let error = api_error(status, response).await;
        if is_retryable(status) {
            Attempt::Retry { error, wait }
        } else {
            Attempt::Fail(error)
        }
    }

    /// Returns the trimmed completion text.
    pub async fn call_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }

    /// Deserializes the completion as JSON. The prompt must ask for a JSON object.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        if response.was_truncated() {
            return Err(LlmError::Truncated {
                max_tokens: self.max_tokens,
            });
        }
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(serde_json::from_str(json_payload(&text))?)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before the attempt after `attempt`, or `None` when there is no attempt left or the
/// wait would leave no time inside the call budget.
fn next_delay(attempt: u32, wait: Option<Duration>, remaining: Duration) -> Option<Duration> {
    if attempt >= MAX_ATTEMPTS {
        return None;
    }
    let delay = wait.unwrap_or_else(|| backoff_delay(attempt));
    (delay < remaining).then_some(delay)
}

/// 1 s, 2 s, 4 s, ... for attempt 1, 2, 3, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS << attempt.saturating_sub(1).min(6))
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

async fn api_error(status: StatusCode, response: Response) -> LlmError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Pulls the JSON object out of a completion: drops markdown fences and any prose the model
/// put around the outermost `{ ... }`.
fn json_payload(text: &str) -> &str {
    let text = text.trim();
    let unfenced = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .map(|rest| rest.trim().trim_end_matches("```").trim())
        .unwrap_or(text);

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}
