//! API configuration

use serde::Deserialize;

use core_kernel::CoreError;
use domain_claims::PromptTemplate;
use infra_adapters::{ModelClientConfig, ModelProvider};

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_MODEL_BASE_URL` for `model_base_url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Largest accepted upload body, in megabytes
    pub max_upload_mb: usize,
    /// `ollama` or `open_ai_compatible`
    pub model_provider: String,
    /// Base URL of the vision model endpoint
    pub model_base_url: String,
    /// Model identifier
    pub model_name: String,
    /// Bearer token for the model endpoint
    pub model_api_key: Option<String>,
    pub model_timeout_secs: u64,
    pub model_max_tokens: u32,
    pub model_temperature: f32,
    /// Extra attempts for transient model failures
    pub model_max_retries: u32,
    /// Replacement for the built-in assessment prompt; `{description}` marks
    /// where the claim description goes
    pub prompt_template: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            max_upload_mb: 25,
            model_provider: "ollama".to_string(),
            model_base_url: "http://localhost:11434".to_string(),
            model_name: "llava".to_string(),
            model_api_key: None,
            model_timeout_secs: 120,
            model_max_tokens: 1000,
            model_temperature: 0.2,
            model_max_retries: 0,
            prompt_template: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upload body limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Settings for the vision model adapter
    pub fn model_client_config(&self) -> Result<ModelClientConfig, CoreError> {
        let provider: ModelProvider = self.model_provider.parse()?;
        let mut config = ModelClientConfig::new(provider, &self.model_base_url, &self.model_name)
            .timeout_secs(self.model_timeout_secs)
            .max_tokens(self.model_max_tokens)
            .temperature(self.model_temperature)
            .max_retries(self.model_max_retries);
        if let Some(key) = self.model_api_key.as_deref().filter(|key| !key.trim().is_empty()) {
            config = config.api_key(key);
        }
        config.validate()?;
        Ok(config)
    }

    /// Prompt sent with every image
    pub fn prompt(&self) -> PromptTemplate {
        self.prompt_template
            .as_deref()
            .filter(|template| !template.trim().is_empty())
            .map(PromptTemplate::new)
            .unwrap_or_default()
    }
}
