//! Embedding client for semantic tea search.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use teadb_core::{retry_with_backoff, AppConfig, RetryPolicy};

use crate::client::{check_status, CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL};
use crate::error::NotesError;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedDatum>,
}

#[derive(Deserialize)]
struct EmbedDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// The text a tea is embedded from: name, type, description, flavor notes
/// and origin as plain sentences.
#[must_use]
pub fn embedding_text(
    name: &str,
    tea_type: &str,
    description: Option<&str>,
    flavor_notes: &[String],
    origin: Option<&str>,
) -> String {
    let flavors = if flavor_notes.is_empty() {
        "none".to_owned()
    } else {
        flavor_notes.join(", ")
    };
    let mut parts = vec![format!("{}.", name.trim()), format!("{tea_type} tea.")];
    if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
        parts.push(description.to_owned());
    }
    parts.push(format!("Flavor notes: {flavors}."));
    parts.push(format!(
        "Origin: {}.",
        origin.map(str::trim).filter(|o| !o.is_empty()).unwrap_or("unknown")
    ));
    parts.join(" ")
}

pub struct EmbeddingsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for EmbeddingsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl EmbeddingsClient {
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
        Self::new(api_key, &config.embeddings_model, config.retry_policy())
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

    /// One embedding per input, in input order.
    ///
    /// # Errors
    ///
    /// Returns the last [`NotesError`] once retries are exhausted, a
    /// permanent API error immediately, or [`NotesError::Parse`] when the
    /// response does not carry exactly one vector per input.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, NotesError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let mut data = retry_with_backoff(self.retry, || self.request(inputs)).await?;

        data.sort_by_key(|d| d.index);
        let in_order = data.iter().enumerate().all(|(i, d)| d.index == i);
        if data.len() != inputs.len() || !in_order {
            return Err(NotesError::Parse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                data.len()
            )));
        }
        if data.iter().any(|d| d.embedding.is_empty()) {
            return Err(NotesError::Parse("empty embedding vector".to_owned()));
        }
        tracing::debug!(inputs = inputs.len(), "embedding batch received");
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<EmbedDatum>, NotesError> {
        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest {
                model: &self.model,
                input: inputs,
            })
            .send()
            .await?;

        let parsed: EmbedResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| NotesError::Parse(e.to_string()))?;
        Ok(parsed.data)
    }
}
