//! HTTP client for the Google Generative Language REST API.
//!
//! Wraps `reqwest` with Gemini-specific error handling, API key management,
//! and typed response deserialization. Error envelopes (`{"error": {...}}`)
//! are surfaced as [`GeminiError::ApiError`].

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GeminiError;
use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Client for the Gemini `generateContent` endpoint.
///
/// Manages the HTTP client, API key, model name, and base URL. Use
/// [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeminiError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adsight/0.1 (ads-analytics-assistant)")
            .build()?;

        // Normalise: the base URL must end with exactly one slash so the
        // joined path lands under it rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GeminiError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// The configured model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one prompt and returns the first candidate's text.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::ApiError`] if the API returns an error envelope or a
    ///   non-2xx status.
    /// - [`GeminiError::Http`] on network failure.
    /// - [`GeminiError::Deserialize`] if the response does not match the
    ///   expected shape.
    /// - [`GeminiError::EmptyResponse`] if the response carries no
    ///   candidate text.
    pub async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let url = self.build_url()?;
        let request = GenerateContentRequest::from_prompt(prompt);

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "sending generateContent request");

        let response = self.client.post(url.clone()).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
            return Err(GeminiError::ApiError(message));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| GeminiError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        parsed.first_text().ok_or(GeminiError::EmptyResponse)
    }

    /// Builds `models/{model}:generateContent?key=...` against the base URL.
    fn build_url(&self) -> Result<Url, GeminiError> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| GeminiError::ApiError(format!("invalid model '{}': {e}", self.model)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}
