//! # Checkout Orchestrator
//!
//! Turns a session's cart into a recorded sale.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Checkout                                        │
//! │                                                                         │
//! │  1. begin_checkout()      CheckoutInProgress / EmptyCart, no store call │
//! │           │                                                             │
//! │  2. record_checkout() ─── one transaction:                              │
//! │           │                 stock -= qty WHERE stock >= qty (per line)  │
//! │           │                 INSERT sale (total at current prices)       │
//! │           │                 INSERT sale_items                           │
//! │           │               any failure ─► rollback, cart kept            │
//! │           │                                                             │
//! │  3. render receipt from the committed prices                            │
//! │  4. clear the cart                                                      │
//! │  5. return sale + receipt + fresh in-stock listing                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use softmax_core::receipt::{render_receipt, ReceiptContext};
use softmax_core::{Cart, CartLine, Money, PaymentMethod, Product, Sale, SaleItem};
use softmax_db::CheckoutLine;
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::session::Session;
use crate::state::{Backend, SessionCart};

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutOutcome {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    /// Printable HTML receipt.
    pub receipt_html: String,
    /// In-stock catalog after the decrement, for the cashier screen.
    pub products: Vec<Product>,
}

/// Commits the session's cart as a sale.
///
/// The cart is cleared only when the sale is committed. On any error it
/// is left untouched.
pub async fn checkout(
    backend: &Backend,
    config: &AppConfig,
    session: &Session,
    cart: &SessionCart,
    payment_method: PaymentMethod,
) -> ApiResult<CheckoutOutcome> {
    let guard = cart.begin_checkout().await?;

    let lines: Vec<CheckoutLine> = guard
        .cart()
        .lines()
        .iter()
        .map(|line| CheckoutLine {
            product_id: line.product.id.clone(),
            quantity: line.quantity,
        })
        .collect();

    let completed = backend
        .db
        .sales()
        .record_checkout(session.user_id(), payment_method, &lines)
        .await?;

    let committed: Vec<CartLine> = completed
        .products
        .into_iter()
        .zip(&completed.items)
        .map(|(product, item)| CartLine {
            product,
            quantity: item.quantity,
        })
        .collect();

    let issued_at = completed.sale.created_at.with_timezone(&config.offset());
    let receipt_html = render(
        &committed,
        completed.sale.total(),
        config,
        session,
        payment_method,
        issued_at,
    );

    guard.complete();

    info!(
        sale_id = %completed.sale.id,
        user_id = %session.user_id(),
        total_cents = completed.sale.total_cents,
        "Checkout completed"
    );

    let products = backend.db.products().list_in_stock().await?;

    Ok(CheckoutOutcome {
        sale: completed.sale,
        items: completed.items,
        receipt_html,
        products,
    })
}

/// Receipt for the cart as it stands, without recording anything.
pub fn preview_receipt(
    cart: &Cart,
    config: &AppConfig,
    session: &Session,
    payment_method: PaymentMethod,
    now: DateTime<Utc>,
) -> ApiResult<String> {
    if cart.is_empty() {
        return Err(softmax_core::CoreError::EmptyCart.into());
    }

    Ok(render(
        cart.lines(),
        cart.total(),
        config,
        session,
        payment_method,
        now.with_timezone(&config.offset()),
    ))
}

fn render(
    lines: &[CartLine],
    total: Money,
    config: &AppConfig,
    session: &Session,
    payment_method: PaymentMethod,
    issued_at: DateTime<FixedOffset>,
) -> String {
    let ctx = ReceiptContext {
        store_name: &config.store_name,
        currency: &config.currency_symbol,
        operator: session.operator_name(),
        payment_method,
        issued_at,
    };
    render_receipt(lines, total, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtManager;
    use crate::error::ErrorCode;
    use crate::state::CartState;
    use softmax_core::{ProductDraft, UserProfile};
    use softmax_db::{Database, DbConfig};

    async fn setup() -> (Backend, Session) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user: UserProfile = db
            .users()
            .insert("Ana Machava", "ana@softmax.co.mz", "not-a-real-hash")
            .await
            .unwrap();
        let backend = Backend::new(db, JwtManager::new("test-secret", 3600));
        let session = Session {
            user,
            jti: "jti-test".to_string(),
        };
        (backend, session)
    }

    async fn product(backend: &Backend, name: &str, price_cents: i64, stock: i64) -> Product {
        backend
            .db
            .products()
            .insert(&ProductDraft {
                name: name.to_string(),
                price_cents,
                stock,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_records_sale_and_clears_cart() {
        let (backend, session) = setup().await;
        let config = AppConfig::default();
        let carts = CartState::new();
        let cart = carts.session(&session.jti);

        let p = product(&backend, "Arroz 5kg", 45000, 5).await;
        cart.with_cart_mut(|c| {
            c.add_item(&p)?;
            c.add_item(&p)
        })
        .await
        .unwrap();

        let outcome = checkout(&backend, &config, &session, &cart, PaymentMethod::Cash)
            .await
            .unwrap();

        assert_eq!(outcome.sale.total_cents, 90000);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.products[0].stock, 3);
        assert!(outcome.receipt_html.contains("2x MZN 450.00"));
        assert!(outcome.receipt_html.contains("Operador: Ana Machava"));
        assert!(outcome.receipt_html.contains("Dinheiro"));
        assert!(cart.with_cart(Cart::is_empty).await);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_without_store_call() {
        let (backend, session) = setup().await;
        let carts = CartState::new();
        let cart = carts.session(&session.jti);

        let err = checkout(&backend, &AppConfig::default(), &session, &cart, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_cart() {
        let (backend, session) = setup().await;
        let carts = CartState::new();
        let cart = carts.session(&session.jti);

        let p = product(&backend, "Pão Francês", 1000, 2).await;
        cart.with_cart_mut(|c| c.add_item(&p)).await.unwrap();
        cart.with_cart_mut(|c| c.set_quantity(&p.id, 2)).await.unwrap();

        // Someone else sells one unit first.
        backend
            .db
            .sales()
            .record_checkout(
                session.user_id(),
                PaymentMethod::Cash,
                &[CheckoutLine {
                    product_id: p.id.clone(),
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        let err = checkout(&backend, &AppConfig::default(), &session, &cart, PaymentMethod::Cash)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(cart.with_cart(|c| c.line(&p.id).map(|l| l.quantity)).await, Some(2));
    }

    #[tokio::test]
    async fn test_preview_receipt_requires_lines() {
        let (_backend, session) = setup().await;
        let err = preview_receipt(
            &Cart::new(),
            &AppConfig::default(),
            &session,
            PaymentMethod::Transfer,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }
}
