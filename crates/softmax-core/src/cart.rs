//! # Cart Engine
//!
//! In-memory representation of an in-progress sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Cashier Action           Operation               Effect                │
//! │  ──────────────           ─────────               ──────                │
//! │                                                                         │
//! │  Click product ─────────► add_item(p) ──────────► qty + 1 or new line  │
//! │                                                                         │
//! │  Type quantity ─────────► set_quantity(id, n) ──► qty = n (n ≤ 0: rm)  │
//! │                                                                         │
//! │  Click trash ───────────► remove_item(id) ──────► line removed         │
//! │                                                                         │
//! │  Click "Limpar" ────────► clear() ──────────────► empty                │
//! │                                                                         │
//! │  Total label ───────────► total() ──────────────► Σ price × qty        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by product id and keep insertion order
//! - Every line's quantity is in `1..=product.stock` of its snapshot
//! - A rejected operation leaves the cart untouched
//!
//! The stock bound is checked against the snapshot the cart holds. The
//! store re-checks it atomically when the sale is committed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Line
// =============================================================================

/// One product/quantity pair pending checkout.
///
/// `product` is a snapshot: the cart displays and validates against it even
/// if the catalog row changes afterwards, until it is refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }

    fn insufficient(&self, requested: i64) -> CoreError {
        CoreError::InsufficientStock {
            product: self.product.name.clone(),
            available: self.product.stock,
            requested,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Already in cart: quantity + 1, snapshot replaced with `product`
    /// - Not in cart: new line with quantity 1, appended at the end
    ///
    /// ## Errors
    /// `InsufficientStock` when the resulting quantity would exceed
    /// `product.stock`. Nothing changes in that case.
    pub fn add_item(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.line_mut(&product.id) {
            let requested = line.quantity + 1;
            if requested > product.stock {
                return Err(CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.stock,
                    requested,
                });
            }
            line.product = product.clone();
            line.quantity = requested;
            return Ok(());
        }

        if product.stock < 1 {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested: 1,
            });
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_item`]
    /// - Line absent: no-op
    /// - `quantity` above the snapshot's stock: rejected, nothing changes
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_item(product_id);
            return Ok(());
        }

        let Some(line) = self.line_mut(product_id) else {
            return Ok(());
        };

        if quantity > line.product.stock {
            return Err(line.insufficient(quantity));
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line. Returns whether one was present.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        self.lines.len() != before
    }

    /// Replaces the snapshot of the matching line with fresh catalog data.
    ///
    /// The quantity is kept even if it now exceeds the fresh stock; the next
    /// mutation or the checkout will reject it.
    pub fn refresh_product(&mut self, product: &Product) {
        if let Some(line) = self.line_mut(&product.id) {
            line.product = product.clone();
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ (price × quantity) over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for a product, if any.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == product_id)
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product.id == product_id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
