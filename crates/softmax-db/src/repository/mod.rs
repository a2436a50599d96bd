//! # Repository Module
//!
//! Database repository implementations for SoftMax Sales.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().list_in_stock()                                 │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list / list_in_stock                                              │
//! │  ├── get_by_id                                                         │
//! │  ├── insert / update                                                   │
//! │  └── delete                                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD
//! - [`SupplierRepository`](supplier::SupplierRepository) - Supplier CRUD
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`UserRepository`](user::UserRepository) - Accounts and profiles
//! - [`SessionRepository`](session::SessionRepository) - Issued tokens
//! - [`SaleRepository`](sale::SaleRepository) - Checkout and report reads

pub mod category;
pub mod product;
pub mod sale;
pub mod session;
pub mod supplier;
pub mod user;

/// Generates a new entity id (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
