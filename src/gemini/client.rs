/// Gemini HTTP client implementation.
///
/// This module provides `GeminiClient` for making synchronous HTTP requests to the
/// Gemini `generateContent` API, along with error types and builder patterns for
/// configuration.
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

use super::types::{GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Errors that can occur when interacting with the Gemini API.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status, with the service's error message when it sent one
    #[error("HTTP error: status {status}: {message}")]
    Http { status: u16, message: String },

    /// Response body did not match the expected schema
    #[error("Serialization error")]
    Serialization(#[source] serde_json::Error),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No API key was configured
    #[error("Missing API key: set GEMINI_API_KEY or call api_key()")]
    MissingApiKey,
}

impl GeminiError {
    /// Classifies a transport error from reqwest.
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeminiError::Timeout(e)
        } else {
            GeminiError::Network(e)
        }
    }
}

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use freshbot::gemini::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new()
///     .base_url("http://localhost:8080")
///     .api_key("test-key")
///     .model("gemini-1.5-flash")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "gemini-1.5-flash");
/// ```
#[derive(Debug, Default)]
pub struct GeminiClientBuilder {
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    /// Creates a new `GeminiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Gemini API.
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL (e.g., "https://generativelanguage.googleapis.com")
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier.
    ///
    /// # Arguments
    ///
    /// * `model` - The model name (e.g., "gemini-1.5-flash")
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the overall request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `GeminiClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// Values not set on the builder are read from `GEMINI_BASE_URL`,
    /// `GENERATIVE_MODEL_NAME` and `GEMINI_API_KEY`. Base URL and model fall back
    /// to the public endpoint and `gemini-1.5-flash`; the API key has no default.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::InvalidUrl` for an unparseable base URL and
    /// `GeminiError::MissingApiKey` when no key is available.
    pub fn build(self) -> Result<GeminiClient, GeminiError> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var("GEMINI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = self
            .model
            .or_else(|| std::env::var("GENERATIVE_MODEL_NAME").ok())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_key = self
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        reqwest::Url::parse(&base_url)
            .map_err(|e| GeminiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(GeminiError::Network)?;

        debug!(model = %model, url = %base_url, "Created Gemini client");

        Ok(GeminiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }
}

/// Synchronous HTTP client for the Gemini API.
///
/// Immutable after construction, so one instance can be shared across threads.
/// Each call is a single HTTP request; nothing is retried.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

/// Trait for text-generation backends.
///
/// This trait enables mocking in unit tests and keeps the answer generator
/// independent of the HTTP transport.
pub trait GeminiClientTrait: Send + Sync {
    /// Sends one `generateContent` request and returns the parsed response.
    fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError>;
}

impl GeminiClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model identifier configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn generate_internal(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.endpoint();

        debug!(
            model = %self.model,
            prompt_len = request.prompt_text().len(),
            safety_settings = request.safety_settings.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .map_err(|e| {
                error!(model = %self.model, error = ?e, "HTTP request failed");
                GeminiError::from_transport(e)
            })?;

        let status = response.status();
        let body = response.text().map_err(GeminiError::from_transport)?;

        if !status.is_success() {
            let message = extract_error_message(&body);
            error!(status = status.as_u16(), error = %message, "Gemini API error");
            return Err(GeminiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(GeminiError::Serialization)?;

        debug!(
            candidates = parsed.candidates.len(),
            finish_reason = ?parsed.finish_reason(),
            "Received generateContent response"
        );
        if let Some(reason) = parsed.block_reason() {
            warn!(block_reason = reason, "Prompt was blocked by the safety filter");
        }

        Ok(parsed)
    }
}

impl GeminiClientTrait for GeminiClient {
    fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        self.generate_internal(request)
    }
}

/// Pulls `error.message` out of a Gemini error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
