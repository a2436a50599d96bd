//! Store settings the frontend needs for display.
//!
//! Public: served from the configuration alone, without a session.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use softmax_core::PaymentMethod;

use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new().route("/settings", get(settings))
}

#[derive(Debug, Serialize)]
pub struct PaymentOption {
    pub value: PaymentMethod,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Settings {
    pub store_name: String,
    pub currency_symbol: String,
    pub utc_offset_hours: i32,
    pub payment_methods: Vec<PaymentOption>,
}

async fn settings(State(state): State<SharedState>) -> Json<Settings> {
    let config = &state.config;
    Json(Settings {
        store_name: config.store_name.clone(),
        currency_symbol: config.currency_symbol.clone(),
        utc_offset_hours: config.utc_offset_hours,
        payment_methods: PaymentMethod::ALL
            .iter()
            .map(|&value| PaymentOption {
                value,
                label: value.label(),
            })
            .collect(),
    })
}
