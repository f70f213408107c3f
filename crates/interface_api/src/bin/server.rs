//! Claim Damage Assessment - API Server Binary
//!
//! Serves the claim form and JSON API, backed by a vision model endpoint and
//! the XLSX report renderer.
//!
//! # Usage
//!
//! ```bash
//! # Run against a local Ollama with llava pulled
//! cargo run --bin claim-assessor
//!
//! # Run against an OpenAI-compatible LLaVA server
//! API_MODEL_PROVIDER=open_ai_compatible API_MODEL_BASE_URL=http://10.0.0.5:8000/v1 \
//!     API_MODEL_NAME=llava-v1.6-34b cargo run --bin claim-assessor
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_MAX_UPLOAD_MB` - Largest accepted upload (default: 25)
//! * `API_MODEL_PROVIDER` - `ollama` or `open_ai_compatible` (default: ollama)
//! * `API_MODEL_BASE_URL` - Model endpoint (default: http://localhost:11434)
//! * `API_MODEL_NAME` - Model identifier (default: llava)
//! * `API_MODEL_API_KEY` - Bearer token for the model endpoint
//! * `API_MODEL_TIMEOUT_SECS` - Per-image request timeout (default: 120)
//! * `API_MODEL_MAX_TOKENS` - Answer length limit (default: 1000)
//! * `API_MODEL_TEMPERATURE` - Sampling temperature (default: 0.2)
//! * `API_MODEL_MAX_RETRIES` - Retries for transient model failures (default: 0)
//! * `API_PROMPT_TEMPLATE` - Custom assessment prompt, `{description}` is filled in

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::ClaimAssessmentService;
use infra_adapters::{build_vision_adapter, XlsxReportRenderer};
use interface_api::{config::ApiConfig, create_router};

/// Main entry point for the API server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded or is invalid
/// - The model adapter cannot be created
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("failed to load configuration")?;

    init_tracing(&config.log_level);

    let model_config = config
        .model_client_config()
        .context("invalid model configuration")?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        provider = %model_config.provider,
        model = %model_config.model,
        base_url = %model_config.base_url,
        "Starting claim damage assessment server"
    );

    let model = build_vision_adapter(&model_config).context("failed to create model client")?;
    let service = ClaimAssessmentService::new(model, Arc::new(XlsxReportRenderer::new()))
        .with_prompt(config.prompt());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;
    let app = create_router(service, config);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
