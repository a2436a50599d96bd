//! # SoftMax Sales API
//!
//! HTTP server for the SoftMax Sales point of sale: catalog management,
//! a per-session cart, atomic checkout with printable receipts, and sales
//! reports with CSV export.
//!
//! ## Request Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Request ──► TraceLayer ──► CorsLayer ──► Router                        │
//! │                                             │                           │
//! │                              extractors:    ├── Backend  (503 if none)  │
//! │                                             └── Session  (401 if bad)   │
//! │                                             │                           │
//! │                              handler ───────┴──► softmax-core (rules)   │
//! │                                             └──► softmax-db   (store)   │
//! │                                                                         │
//! │  Errors ──► ApiError ──► { "code": "...", "message": "..." }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::{AppState, Backend, SharedState};

/// Builds the application with its middleware.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config);

    routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let Some(origins) = config.cors_origin_list() else {
        return cors.allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| warn!("`{origin}` is not a valid CORS origin: {e}"))
                .ok()
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
