//! # Product Repository
//!
//! Catalog CRUD.
//!
//! ## Listings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Screen          Query               Order                             │
//! │  ──────          ─────               ─────                             │
//! │  Produtos    ──► list()          ──► created_at DESC (newest first)    │
//! │  Caixa       ──► list_in_stock() ──► name ASC, stock > 0 only          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is only ever decremented by the checkout transaction in
//! [`SaleRepository`](super::sale::SaleRepository). Here it is set
//! absolutely, from the product form.
//!
//! Deletion is a hard delete. Sale items keep their frozen price and lose
//! the reference (`product_id` becomes NULL).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use softmax_core::{Product, ProductDraft};

macro_rules! select_products {
    ($tail:literal) => {
        concat!(
            "SELECT id, name, description, price_cents, stock, category_id, supplier_id, \
             image_url, created_at, updated_at FROM products ",
            $tail
        )
    };
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// All products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(select_products!(
            "ORDER BY created_at DESC, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Products with at least one unit on hand, by name.
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(select_products!(
            "WHERE stock > 0 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed in-stock products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(select_products!("WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product from a validated draft.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored row, with generated id and timestamps
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown category or supplier
    pub async fn insert(&self, draft: &ProductDraft) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price_cents: draft.price_cents,
            stock: draft.stock,
            category_id: draft.category_id.clone(),
            supplier_id: draft.supplier_id.clone(),
            image_url: draft.image_url.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price_cents, stock,
                category_id, supplier_id, image_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(&product.image_url)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Replaces every editable field of a product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The row after the update
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, draft: &ProductDraft) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                stock = ?5,
                category_id = ?6,
                supplier_id = ?7,
                image_url = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price_cents)
        .bind(draft.stock)
        .bind(&draft.category_id)
        .bind(&draft.supplier_id)
        .bind(&draft.image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts all products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
