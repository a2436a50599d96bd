//! # softmax-core: Pure Business Logic for SoftMax Sales
//!
//! Everything here is a pure function of its inputs. The database layer and
//! the HTTP server sit on top of this crate and never the other way around.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SoftMax Sales Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Frontend (Caixa / Relatórios)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    auth, products, cart, checkout, reports                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ softmax-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  cart   │ │ receipt │ │ report  │ │ export  │  │   │
//! │  │   │ Product │ │  Cart   │ │  HTML   │ │ Summary │ │   CSV   │  │   │
//! │  │   │  Sale   │ │CartLine │ │         │ │ Top 10  │ │         │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  softmax-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The in-memory cart engine
//! - [`receipt`] - Printable HTML receipt renderer
//! - [`report`] - Sales report aggregation
//! - [`export`] - CSV export of a report range
//! - [`catalog`] - Product search filter
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use softmax_core::money::Money;
//!
//! let price = Money::from_cents(15000);
//! let line = price.multiply_quantity(2);
//!
//! assert_eq!(line.format_with("MZN"), "MZN 300.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod export;
pub mod money;
pub mod receipt;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum password length accepted at sign-up and password change.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Number of entries in the "top products" ranking.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// Number of sales shown in the "recent sales" table.
pub const RECENT_SALES_LIMIT: usize = 10;

/// Label used when a sale item's product has since been deleted.
pub const UNKNOWN_PRODUCT_LABEL: &str = "Produto desconhecido";
