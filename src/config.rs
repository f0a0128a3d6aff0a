//! Runtime settings loaded from the environment.
//!
//! The binary loads a `.env` file (via `dotenvy`) before calling
//! [`Settings::from_env`], so values may come from either source.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::gemini::GeminiClientBuilder;

/// Environment variable holding the model identifier.
pub const MODEL_ENV: &str = "GENERATIVE_MODEL_NAME";
/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const TIMEOUT_ENV: &str = "GEMINI_TIMEOUT_SECS";

/// Connection settings for the generation client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// Unset or blank variables are left as `None` so the client builder's
    /// defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if `GEMINI_TIMEOUT_SECS` is set but is not a positive
    /// integer.
    pub fn from_env() -> Result<Self> {
        let timeout = match non_blank_var(TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.parse().with_context(|| {
                    format!("{TIMEOUT_ENV} must be a whole number of seconds, got '{raw}'")
                })?;
                if secs == 0 {
                    anyhow::bail!("{TIMEOUT_ENV} must be greater than zero");
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            model: non_blank_var(MODEL_ENV),
            api_key: non_blank_var(API_KEY_ENV),
            base_url: non_blank_var(BASE_URL_ENV),
            timeout,
        })
    }

    /// Overrides the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Converts the settings into a client builder.
    pub fn client_builder(&self) -> GeminiClientBuilder {
        let mut builder = GeminiClientBuilder::new();
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
