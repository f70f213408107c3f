//! HTTP API Layer
//!
//! This crate serves the claim damage assessment flow over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: the HTML form, claim intake, analysis and report download
//! - **Middleware**: request ids, tracing and request logging
//! - **DTOs**: Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(service, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimAssessmentService, ClaimSession};

use crate::config::ApiConfig;
use crate::handlers::{claims, health, ui};
use crate::middleware::request_log_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ClaimAssessmentService,
    /// The one active claim flow
    pub session: Arc<Mutex<ClaimSession>>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - Claim assessment service wired to the model and renderer
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(service: ClaimAssessmentService, config: ApiConfig) -> Router {
    let body_limit = config.max_upload_bytes();
    let state = AppState {
        service,
        session: Arc::new(Mutex::new(ClaimSession::new())),
        config,
    };

    // Public pages
    let public_routes = Router::new()
        .route("/", get(ui::index))
        .route("/health", get(health::health_check));

    // Claim flow
    let claim_routes = Router::new()
        .route(
            "/",
            get(claims::get_session)
                .post(claims::submit_claim)
                .delete(claims::reset_session),
        )
        .route("/analysis", post(claims::run_analysis))
        .route("/report", get(claims::download_report))
        .layer(DefaultBodyLimit::max(body_limit));

    let api_routes = Router::new()
        .nest("/claim", claim_routes)
        .layer(axum_middleware::from_fn(request_log_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
