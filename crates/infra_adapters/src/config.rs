//! Vision model client configuration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use core_kernel::CoreError;

/// Wire protocol spoken by the model endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    /// `POST {base_url}/chat/completions` with image_url content parts
    OpenAiCompatible,
    /// `POST {base_url}/api/generate` with a base64 `images` array
    Ollama,
}

impl FromStr for ModelProvider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ModelProvider::Ollama),
            "openai" | "open_ai_compatible" | "openai_compatible" => {
                Ok(ModelProvider::OpenAiCompatible)
            }
            other => Err(CoreError::configuration(format!(
                "unknown model provider '{}', expected 'ollama' or 'open_ai_compatible'",
                other
            ))),
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelProvider::OpenAiCompatible => f.write_str("open_ai_compatible"),
            ModelProvider::Ollama => f.write_str("ollama"),
        }
    }
}

/// Connection settings for the vision model endpoint
///
/// # Example
///
/// ```rust
/// use infra_adapters::{ModelClientConfig, ModelProvider};
///
/// let config = ModelClientConfig::new(ModelProvider::OpenAiCompatible, "http://10.0.0.5:8000/v1", "llava-v1.6-34b")
///     .timeout_secs(60)
///     .max_retries(2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ModelClientConfig {
    pub provider: ModelProvider,
    /// Base URL of the endpoint; the provider path is appended
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Bearer token, if the endpoint wants one
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Extra attempts for transient failures
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry
    pub retry_base_delay: Duration,
}

impl ModelClientConfig {
    pub fn new(provider: ModelProvider, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            timeout_secs: 120,
            max_tokens: 1000,
            temperature: 0.2,
            max_retries: 0,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Joins the base URL and a path without doubling slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CoreError::configuration(format!(
                "model base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::configuration("model name must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::configuration("model timeout must be at least one second"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CoreError::configuration("temperature must be between 0.0 and 2.0"));
        }
        Ok(())
    }
}

impl Default for ModelClientConfig {
    fn default() -> Self {
        Self::new(ModelProvider::Ollama, "http://localhost:11434", "llava")
    }
}
