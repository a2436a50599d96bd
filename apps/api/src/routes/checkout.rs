//! Checkout route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use softmax_core::PaymentMethod;

use crate::checkout::{checkout, CheckoutOutcome};
use crate::error::ApiResult;
use crate::session::Session;
use crate::state::{Backend, SharedState};

pub fn router() -> Router<SharedState> {
    Router::new().route("/checkout", post(finalize_sale))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
}

async fn finalize_sale(
    State(state): State<SharedState>,
    backend: Backend,
    session: Session,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<CheckoutOutcome>)> {
    let cart = state.carts.session(&session.jti);
    let outcome = checkout(&backend, &state.config, &session, &cart, req.payment_method).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
