//! # Cart State
//!
//! One cart per signed-in session, keyed by the token's `jti`.
//!
//! ## Locking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Locking                                   │
//! │                                                                         │
//! │  sessions: std Mutex<HashMap<jti, Arc<SessionCart>>>                    │
//! │            held only to look up / insert / remove an entry              │
//! │                                                                         │
//! │  SessionCart                                                            │
//! │    cart:     tokio Mutex<Cart>   every cart operation, in order         │
//! │    checkout: tokio Mutex<()>     try_lock'd; held for the whole commit  │
//! │                                                                         │
//! │  Checkout A ──► checkout.try_lock() ✓ ──► cart.lock() ──► store ──► ✓  │
//! │  Checkout B ──► checkout.try_lock() ✗ ──► CheckoutInProgress           │
//! │  Add item   ──► cart.lock() waits for A, then sees the cleared cart    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use softmax_core::{Cart, CoreError, CoreResult};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

/// The cart of one session and its checkout guard.
#[derive(Debug, Default)]
pub struct SessionCart {
    cart: AsyncMutex<Cart>,
    checkout: AsyncMutex<()>,
}

/// Exclusive access to a cart for the duration of a checkout.
///
/// Dropping it without [`CheckoutGuard::complete`] leaves the cart as it
/// was, so a failed commit can be retried.
pub struct CheckoutGuard<'a> {
    cart: AsyncMutexGuard<'a, Cart>,
    _in_flight: AsyncMutexGuard<'a, ()>,
}

impl CheckoutGuard<'_> {
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Clears the cart after a committed sale.
    pub fn complete(mut self) {
        self.cart.clear();
    }
}

impl SessionCart {
    /// Runs `f` with read access to the cart.
    pub async fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().await;
        f(&cart)
    }

    /// Runs `f` with write access to the cart.
    pub async fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().await;
        f(&mut cart)
    }

    /// Takes the checkout guard.
    ///
    /// ## Errors
    /// * `CheckoutInProgress` - another checkout holds it
    /// * `EmptyCart` - nothing to sell
    pub async fn begin_checkout(&self) -> CoreResult<CheckoutGuard<'_>> {
        let in_flight = self
            .checkout
            .try_lock()
            .map_err(|_| CoreError::CheckoutInProgress)?;

        let cart = self.cart.lock().await;
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(CheckoutGuard {
            cart,
            _in_flight: in_flight,
        })
    }
}

/// All session carts.
#[derive(Debug, Default)]
pub struct CartState {
    sessions: Mutex<HashMap<String, Arc<SessionCart>>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart of a session, created empty on first use.
    pub fn session(&self, jti: &str) -> Arc<SessionCart> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(sessions.entry(jti.to_string()).or_default())
    }

    /// Drops a session's cart (sign-out).
    pub fn remove_session(&self, jti: &str) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(jti);
    }

    /// Drops the carts of several sessions. Returns how many existed.
    pub fn remove_sessions<'a>(&self, jtis: impl IntoIterator<Item = &'a str>) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        jtis.into_iter()
            .filter(|jti| sessions.remove(*jti).is_some())
            .count()
    }

    /// Keys of every session that currently has a cart.
    pub fn session_ids(&self) -> Vec<String> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
