//! Vision Model Adapters
//!
//! HTTP clients implementing `VisionModelPort`. Both adapters share the same
//! transport: one reqwest client with the configured timeout, a mapping from
//! transport failures and HTTP statuses onto [`PortError`], and an optional
//! retry loop for transient failures.
//!
//! # Error Mapping
//!
//! | Failure                         | PortError            |
//! |---------------------------------|----------------------|
//! | request timed out               | `Timeout`            |
//! | could not connect               | `Connection`         |
//! | 401 / 403                       | `Unauthorized`       |
//! | 429                             | `RateLimited`        |
//! | 5xx                             | `ServiceUnavailable` |
//! | body not in the expected shape  | `Transformation`     |
//! | anything else                   | `Internal`           |

mod ollama;
mod openai;

pub use ollama::OllamaVisionAdapter;
pub use openai::OpenAiVisionAdapter;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use core_kernel::PortError;
use domain_claims::VisionModelPort;

use crate::config::{ModelClientConfig, ModelProvider};

/// Longest slice of an error body copied into an error message
const ERROR_BODY_SNIPPET: usize = 200;

/// Builds the adapter for the configured provider
///
/// # Errors
///
/// Returns a `Validation` error if the configuration is unusable, or an
/// `Internal` error if the HTTP client cannot be created.
pub fn build_vision_adapter(
    config: &ModelClientConfig,
) -> Result<Arc<dyn VisionModelPort>, PortError> {
    config
        .validate()
        .map_err(|e| PortError::validation_field(e.to_string(), "model"))?;

    let adapter: Arc<dyn VisionModelPort> = match config.provider {
        ModelProvider::OpenAiCompatible => Arc::new(OpenAiVisionAdapter::new(config.clone())?),
        ModelProvider::Ollama => Arc::new(OllamaVisionAdapter::new(config.clone())?),
    };
    debug!(
        provider = %config.provider,
        model = %config.model,
        base_url = %config.base_url,
        "Vision model adapter created"
    );
    Ok(adapter)
}

/// Shared HTTP plumbing for the model adapters
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    config: ModelClientConfig,
    service: &'static str,
}

impl HttpTransport {
    pub(crate) fn new(config: ModelClientConfig, service: &'static str) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: format!("failed to build HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            config,
            service,
        })
    }

    pub(crate) fn config(&self) -> &ModelClientConfig {
        &self.config
    }

    /// POSTs a JSON body and returns the response text, retrying transient failures
    pub(crate) async fn post_json<B>(&self, path: &str, body: &B) -> Result<String, PortError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.config.endpoint(path);
        let url = url.as_str();
        retry_transient(
            self.config.max_retries,
            self.config.retry_base_delay,
            self.service,
            move || self.post_once(url, body),
        )
        .await
    }

    async fn post_once<B>(&self, url: &str, body: &B) -> Result<String, PortError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(status_error(status, retry_after, &text, self.service))
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: format!("{} request", self.service),
                duration_ms: self.config.timeout_secs.saturating_mul(1000),
            }
        } else if error.is_connect() {
            PortError::Connection {
                message: format!("cannot reach {} at {}", self.service, self.config.base_url),
                source: Some(Box::new(error)),
            }
        } else if error.is_decode() || error.is_body() {
            PortError::transformation(format!("unreadable {} response: {}", self.service, error))
        } else {
            PortError::Internal {
                message: format!("{} request failed: {}", self.service, error),
                source: Some(Box::new(error)),
            }
        }
    }
}

/// Maps a non-success HTTP status onto a [`PortError`]
pub(crate) fn status_error(
    status: StatusCode,
    retry_after: Option<u64>,
    body: &str,
    service: &str,
) -> PortError {
    let snippet: String = body.trim().chars().take(ERROR_BODY_SNIPPET).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized {
            message: format!("{} returned {}: {}", service, status, snippet),
        },
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("{} ({})", service, status),
        },
        _ => PortError::internal(format!("{} returned {}: {}", service, status, snippet)),
    }
}

/// Runs `attempt` until it succeeds, fails permanently, or retries run out
///
/// The delay before retry `n` is `base_delay * 2^n`, or the server's
/// `Retry-After` when that is longer.
pub(crate) async fn retry_transient<T, F, Fut>(
    max_retries: u32,
    base_delay: Duration,
    operation: &str,
    mut attempt: F,
) -> Result<T, PortError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PortError>>,
{
    let mut retries = 0u32;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_transient() && retries < max_retries => {
                let delay = backoff_delay(&error, base_delay, retries);
                retries += 1;
                warn!(
                    operation,
                    retry = retries,
                    max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}

fn backoff_delay(error: &PortError, base_delay: Duration, retries: u32) -> Duration {
    let backoff = base_delay.saturating_mul(2u32.saturating_pow(retries));
    match error {
        PortError::RateLimited { retry_after_secs } => {
            backoff.max(Duration::from_secs(*retry_after_secs))
        }
        _ => backoff,
    }
}
