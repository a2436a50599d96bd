//! # softmax-db: Database Layer for SoftMax Sales
//!
//! SQLite persistence for the catalog, user accounts, sessions and sales.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SoftMax Sales Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /checkout)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    softmax-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SupplierRepo   │   │ 001_init.sql │  │   │
//! │  │   │               │    │ CategoryRepo   │   │              │  │   │
//! │  │   │               │    │ UserRepo       │   │              │  │   │
//! │  │   │               │    │ SessionRepo    │   │              │  │   │
//! │  │   │               │    │ SaleRepo       │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (file from SOFTMAX_SERVICE_URL, or in-memory in tests)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use softmax_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_url("sqlite://softmax.db?mode=rwc")).await?;
//! let products = db.products().list_in_stock().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{CheckoutLine, CompletedSale, SaleRepository};
pub use repository::session::SessionRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::user::{UserAccount, UserRepository};
