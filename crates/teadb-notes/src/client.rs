//! Chat-completion client for note generation.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use teadb_core::{retry_with_backoff, AppConfig, RetryPolicy};

use crate::error::NotesError;
use crate::prompt::{user_message, TeaBrief, SYSTEM_PROMPT};
use crate::response::{extract_notes, match_notes, GeneratedNote};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const REQUEST_TIMEOUT_SECS: u64 = 120;
pub(crate) const CONNECT_TIMEOUT_SECS: u64 = 10;
const TEMPERATURE: f32 = 0.7;
const DEFAULT_RETRY_AFTER_SECS: u64 = 20;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct NotesClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for NotesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotesClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl NotesClient {
    /// # Errors
    ///
    /// Returns [`NotesError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, retry: RetryPolicy) -> Result<Self, NotesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: model.to_owned(),
            retry,
        })
    }

    /// # Errors
    ///
    /// Returns [`NotesError::MissingApiKey`] when `OPENAI_API_KEY` is unset.
    pub fn from_config(config: &AppConfig) -> Result<Self, NotesError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or(NotesError::MissingApiKey)?;
        Self::new(api_key, &config.notes_model, config.retry_policy())
    }

    /// Points the client at another OpenAI-compatible host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        base_url.trim_end_matches('/').clone_into(&mut self.base_url);
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates notes for one batch and matches them back to its teas.
    ///
    /// # Errors
    ///
    /// Returns the last [`NotesError`] once retries are exhausted, or a
    /// permanent error (4xx, unparseable content) immediately.
    pub async fn generate(&self, batch: &[TeaBrief]) -> Result<Vec<GeneratedNote>, NotesError> {
        let content = retry_with_backoff(self.retry, || self.complete(batch)).await?;
        let raw = extract_notes(&content)?;
        let matched = match_notes(batch, raw);
        tracing::debug!(
            requested = batch.len(),
            matched = matched.len(),
            "completion batch parsed"
        );
        Ok(matched)
    }

    async fn complete(&self, batch: &[TeaBrief]) -> Result<String, NotesError> {
        let user = user_message(batch).map_err(|e| NotesError::Parse(e.to_string()))?;
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let parsed: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| NotesError::Parse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| NotesError::Parse("response has no message content".to_owned()))
    }
}

/// Maps 429 and other non-2xx responses from the API to typed errors.
pub(crate) async fn check_status(response: Response) -> Result<Response, NotesError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(NotesError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NotesError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
