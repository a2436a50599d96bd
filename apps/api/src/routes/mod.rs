//! # HTTP Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Route Map                                      │
//! │                                                                         │
//! │  GET    /health                          always available               │
//! │                                                                         │
//! │  POST   /auth/sign-up  /auth/sign-in     no session                     │
//! │  POST   /auth/sign-out                   session                        │
//! │  GET    /auth/me                         session                        │
//! │  PUT    /auth/profile  /auth/password    session                        │
//! │                                                                         │
//! │  GET|POST        /products  /suppliers  /categories                     │
//! │  GET|PUT|DELETE  /products/{id}  /suppliers/{id}  /categories/{id}      │
//! │                                                                         │
//! │  GET|DELETE      /cart                                                  │
//! │  POST            /cart/items                                            │
//! │  PUT|DELETE      /cart/items/{product_id}                               │
//! │  GET             /cart/receipt?payment_method=                          │
//! │  POST            /checkout                                              │
//! │                                                                         │
//! │  GET   /reports/sales   /reports/sales.csv   ?start=&end=               │
//! │  GET   /settings                         no session, no store           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything except `/health`, `/settings`, sign-up and sign-in requires a
//! bearer token. `/settings` only reads the configuration, so the sign-in
//! screen can show the store name even before the store is configured.

mod auth;
mod cart;
mod catalog;
mod checkout;
mod reports;
mod settings;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::SharedState;

/// All routes, without middleware.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router())
        .merge(catalog::router())
        .merge(cart::router())
        .merge(checkout::router())
        .merge(reports::router())
        .merge(settings::router())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    /// Whether service credentials are present.
    configured: bool,
    /// Whether the store answered a trivial query.
    database: bool,
}

async fn health(State(state): State<SharedState>) -> Json<Health> {
    let database = match &state.backend {
        Some(backend) => backend.db.health_check().await,
        None => false,
    };

    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        configured: state.backend.is_some(),
        database,
    })
}
