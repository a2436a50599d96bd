//! Cart routes.
//!
//! ## Stale Snapshots
//! Before adding or changing a quantity the product is re-read from the
//! store and the line's snapshot replaced, so the stock bound is checked
//! against current data. The commit at checkout is still the authority.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use softmax_core::{Cart, CartLine, CoreError, PaymentMethod};

use crate::checkout::preview_receipt;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::state::{Backend, SharedState};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route(
            "/cart/items/{product_id}",
            put(set_quantity).delete(remove_item),
        )
        .route("/cart/receipt", get(receipt))
}

/// The cart as shown next to the product grid.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total_cents: i64,
    /// Total with the currency symbol, e.g. `MZN 330.00`.
    pub total_display: String,
    pub item_count: usize,
    pub total_quantity: i64,
}

impl CartView {
    fn new(cart: &Cart, currency: &str) -> Self {
        let total = cart.total();
        CartView {
            lines: cart.lines().to_vec(),
            total_cents: total.cents(),
            total_display: total.format_with(currency),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptQuery {
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

async fn get_cart(State(state): State<SharedState>, session: Session) -> Json<CartView> {
    let currency = &state.config.currency_symbol;
    let view = state
        .carts
        .session(&session.jti)
        .with_cart(|cart| CartView::new(cart, currency))
        .await;
    Json(view)
}

async fn add_item(
    State(state): State<SharedState>,
    backend: Backend,
    session: Session,
    Json(req): Json<AddItemRequest>,
) -> ApiResult<Json<CartView>> {
    let product = backend
        .db
        .products()
        .get_by_id(&req.product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(req.product_id.clone()))?;

    let currency = &state.config.currency_symbol;
    let view = state
        .carts
        .session(&session.jti)
        .with_cart_mut(|cart| {
            cart.add_item(&product)?;
            Ok::<_, CoreError>(CartView::new(cart, currency))
        })
        .await?;
    Ok(Json(view))
}

/// Sets a line's quantity. Zero or less removes the line.
async fn set_quantity(
    State(state): State<SharedState>,
    backend: Backend,
    session: Session,
    Path(product_id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> ApiResult<Json<CartView>> {
    let slot = state.carts.session(&session.jti);
    let currency = &state.config.currency_symbol;

    if req.quantity > 0 {
        let fresh = backend.db.products().get_by_id(&product_id).await?;
        let Some(product) = fresh else {
            // Deleted from the catalog since it was added.
            slot.with_cart_mut(|cart| cart.remove_item(&product_id)).await;
            return Err(ApiError::not_found("Product", &product_id));
        };
        slot.with_cart_mut(|cart| cart.refresh_product(&product)).await;
    }

    let view = slot
        .with_cart_mut(|cart| {
            cart.set_quantity(&product_id, req.quantity)?;
            Ok::<_, CoreError>(CartView::new(cart, currency))
        })
        .await?;
    Ok(Json(view))
}

async fn remove_item(
    State(state): State<SharedState>,
    session: Session,
    Path(product_id): Path<String>,
) -> Json<CartView> {
    let currency = &state.config.currency_symbol;
    let view = state
        .carts
        .session(&session.jti)
        .with_cart_mut(|cart| {
            cart.remove_item(&product_id);
            CartView::new(cart, currency)
        })
        .await;
    Json(view)
}

async fn clear_cart(State(state): State<SharedState>, session: Session) -> Json<CartView> {
    let currency = &state.config.currency_symbol;
    let view = state
        .carts
        .session(&session.jti)
        .with_cart_mut(|cart| {
            cart.clear();
            CartView::new(cart, currency)
        })
        .await;
    Json(view)
}

/// Printable receipt for the current cart, nothing recorded.
async fn receipt(
    State(state): State<SharedState>,
    session: Session,
    Query(query): Query<ReceiptQuery>,
) -> ApiResult<Html<String>> {
    let config = &state.config;
    let html = state
        .carts
        .session(&session.jti)
        .with_cart(|cart| preview_receipt(cart, config, &session, query.payment_method, Utc::now()))
        .await?;
    Ok(Html(html))
}
