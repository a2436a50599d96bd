//! # Sale Repository
//!
//! The checkout transaction and the reads behind the reports screen.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├── for each line:                                                   │
//! │   │     UPDATE products SET stock = stock - qty                        │
//! │   │      WHERE id = ? AND stock >= qty          ← conditional         │
//! │   │       │                                                             │
//! │   │       ├── 0 rows? ─► ROLLBACK, InsufficientStock / ProductNotFound │
//! │   │       └── 1 row  ─► read product (current price, remaining stock)  │
//! │   │                                                                     │
//! │   ├── INSERT sales (total = Σ current price × qty)                     │
//! │   ├── INSERT sale_items (price frozen)                                 │
//! │   │                                                                     │
//! │  COMMIT  ─► all or nothing                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decrement is the first statement of the transaction, so the write
//! lock is taken before anything is read and two racing checkouts are
//! serialized by SQLite. Stock can never go negative.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};
use softmax_core::{CoreError, PaymentMethod, Product, Sale, SaleItem, SaleLine, SaleRecord};

/// One product/quantity pair to be sold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Everything written by a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedSale {
    pub sale: Sale,
    /// In the order of the checkout lines.
    pub items: Vec<SaleItem>,
    /// Products as committed: current price, stock after the decrement.
    pub products: Vec<Product>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and decrements stock, atomically.
    ///
    /// Unit prices are read from the catalog inside the transaction, so
    /// the recorded total always equals the sum of the recorded items.
    ///
    /// ## Errors
    /// * `DbError::Rule(EmptyCart)` - No lines
    /// * `DbError::Rule(ProductNotFound)` - A product was deleted meanwhile
    /// * `DbError::Rule(InsufficientStock)` - A line exceeds committed stock
    ///
    /// Nothing is written when any of these is returned.
    pub async fn record_checkout(
        &self,
        user_id: &str,
        payment_method: PaymentMethod,
        lines: &[CheckoutLine],
    ) -> DbResult<CompletedSale> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let now = Utc::now();
        let sale_id = generate_id();

        debug!(sale_id = %sale_id, lines = lines.len(), "Starting checkout transaction");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut products = Vec::with_capacity(lines.len());

        for line in lines {
            let decremented = sqlx::query(
                "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
                 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let current = sqlx::query_as::<_, Product>(
                "SELECT id, name, description, price_cents, stock, category_id, supplier_id, \
                 image_url, created_at, updated_at FROM products WHERE id = ?1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(product) = current else {
                // Dropping `tx` rolls back.
                return Err(CoreError::ProductNotFound(line.product_id.clone()).into());
            };

            if decremented.rows_affected() == 0 {
                debug!(
                    product_id = %product.id,
                    available = product.stock,
                    requested = line.quantity,
                    "Checkout rejected: insufficient stock"
                );
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            products.push(product);
        }

        let total_cents: i64 = products
            .iter()
            .zip(lines)
            .map(|(p, l)| p.price_cents * l.quantity)
            .sum();

        let sale = Sale {
            id: sale_id,
            total_cents,
            payment_method,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO sales (id, total_cents, payment_method, user_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&sale.id)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(&sale.user_id)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (product, line) in products.iter().zip(lines) {
            let item = SaleItem {
                id: generate_id(),
                sale_id: sale.id.clone(),
                product_id: Some(product.id.clone()),
                quantity: line.quantity,
                price_cents: product.price_cents,
                created_at: now,
            };

            sqlx::query(
                "INSERT INTO sale_items (id, sale_id, product_id, quantity, price_cents, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            total_cents = sale.total_cents,
            payment_method = sale.payment_method.as_str(),
            "Sale recorded"
        );

        Ok(CompletedSale {
            sale,
            items,
            products,
        })
    }

    /// Gets a sale header by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT id, total_cents, payment_method, user_id, created_at, updated_at \
             FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets the items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            "SELECT id, sale_id, product_id, quantity, price_cents, created_at \
             FROM sale_items WHERE sale_id = ?1 ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Sales with `from <= created_at < to`, oldest first, each with its
    /// lines joined to the current product name.
    pub async fn list_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, Sale>(
            "SELECT id, total_cents, payment_method, user_id, created_at, updated_at \
             FROM sales WHERE created_at >= ?1 AND created_at < ?2 \
             ORDER BY created_at, rowid",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT si.sale_id, si.product_id, p.name AS product_name, si.quantity, si.price_cents
            FROM sale_items si
            INNER JOIN sales s ON s.id = si.sale_id
            LEFT JOIN products p ON p.id = si.product_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            ORDER BY si.rowid
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
        for line in lines {
            by_sale.entry(line.sale_id.clone()).or_default().push(line);
        }

        let records: Vec<SaleRecord> = sales
            .into_iter()
            .map(|sale| SaleRecord {
                items: by_sale.remove(&sale.id).unwrap_or_default(),
                sale,
            })
            .collect();

        debug!(count = records.len(), "Fetched sales for range");
        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{database, product, user};
    use crate::{Database, DbConfig};
    use chrono::Duration;

    fn line(product: &Product, quantity: i64) -> CheckoutLine {
        CheckoutLine {
            product_id: product.id.clone(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_checkout_records_sale_and_decrements_stock() {
        let db = database().await;
        let operator = user(&db, "caixa@softmax.co.mz").await;
        let coke = product(&db, "Coca-Cola", 15000, 10).await;
        let bread = product(&db, "Pão", 3000, 10).await;

        let done = db
            .sales()
            .record_checkout(
                &operator.id,
                PaymentMethod::Cash,
                &[line(&coke, 2), line(&bread, 1)],
            )
            .await
            .unwrap();

        assert_eq!(done.sale.total_cents, 33000);
        assert_eq!(done.items.len(), 2);
        assert_eq!(done.products[0].stock, 8);
        assert_eq!(done.products[1].stock, 9);

        let stored = db.sales().get_by_id(&done.sale.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_method, PaymentMethod::Cash);
        let items = db.sales().get_items(&done.sale.id).await.unwrap();
        let sum: i64 = items.iter().map(|i| i.line_total().cents()).sum();
        assert_eq!(sum, stored.total_cents);

        let coke = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        assert_eq!(coke.stock, 8);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let db = database().await;
        let operator = user(&db, "caixa@softmax.co.mz").await;
        let coke = product(&db, "Coca-Cola", 15000, 10).await;
        let bread = product(&db, "Pão", 3000, 1).await;

        let err = db
            .sales()
            .record_checkout(
                &operator.id,
                PaymentMethod::Card,
                &[line(&coke, 2), line(&bread, 3)],
            )
            .await
            .unwrap_err();

        match err {
            DbError::Rule(CoreError::InsufficientStock {
                product,
                available,
                requested,
            }) => {
                assert_eq!(product, "Pão");
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let coke = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        assert_eq!(coke.stock, 10);
        let from = Utc::now() - Duration::days(1);
        let to = Utc::now() + Duration::days(1);
        assert!(db.sales().list_between(from, to).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_product_and_empty_cart_are_rejected() {
        let db = database().await;
        let operator = user(&db, "caixa@softmax.co.mz").await;
        let ghost = CheckoutLine {
            product_id: "gone".to_string(),
            quantity: 1,
        };

        assert!(matches!(
            db.sales()
                .record_checkout(&operator.id, PaymentMethod::Cash, &[ghost])
                .await,
            Err(DbError::Rule(CoreError::ProductNotFound(_)))
        ));
        assert!(matches!(
            db.sales()
                .record_checkout(&operator.id, PaymentMethod::Cash, &[])
                .await,
            Err(DbError::Rule(CoreError::EmptyCart))
        ));
    }

    #[tokio::test]
    async fn test_sequential_checkouts_for_last_unit() {
        let db = database().await;
        let operator = user(&db, "caixa@softmax.co.mz").await;
        let last = product(&db, "Bolo", 50000, 1).await;

        let first = db
            .sales()
            .record_checkout(&operator.id, PaymentMethod::Cash, &[line(&last, 1)])
            .await;
        let second = db
            .sales()
            .record_checkout(&operator.id, PaymentMethod::Cash, &[line(&last, 1)])
            .await;

        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(DbError::Rule(CoreError::InsufficientStock { available: 0, .. }))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_for_last_unit() {
        let path = std::env::temp_dir().join(format!("softmax-race-{}.db", generate_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(5))
            .await
            .unwrap();
        let operator = user(&db, "caixa@softmax.co.mz").await;
        let last = product(&db, "Bolo", 50000, 1).await;

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let sales = db.sales();
                let operator_id = operator.id.clone();
                let lines = vec![line(&last, 1)];
                tokio::spawn(async move {
                    sales
                        .record_checkout(&operator_id, PaymentMethod::Cash, &lines)
                        .await
                })
            })
            .collect();

        let mut succeeded = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(done) => {
                    succeeded += 1;
                    assert_eq!(done.products[0].stock, 0);
                }
                Err(e) => assert!(
                    matches!(
                        e,
                        DbError::Rule(CoreError::InsufficientStock { available: 0, .. })
                    ),
                    "unexpected error: {:?}",
                    e
                ),
            }
        }
        assert_eq!(succeeded, 1);

        let stock = db.products().get_by_id(&last.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 0);

        let (sales,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let (items,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(sales, 1);
        assert_eq!(items, 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_list_between_joins_names_and_survives_deletion() {
        let db = database().await;
        let operator = user(&db, "caixa@softmax.co.mz").await;
        let coke = product(&db, "Coca-Cola", 15000, 10).await;
        let bread = product(&db, "Pão", 3000, 10).await;

        db.sales()
            .record_checkout(&operator.id, PaymentMethod::Cash, &[line(&coke, 1)])
            .await
            .unwrap();
        db.sales()
            .record_checkout(
                &operator.id,
                PaymentMethod::Transfer,
                &[line(&bread, 2), line(&coke, 1)],
            )
            .await
            .unwrap();
        db.products().delete(&bread.id).await.unwrap();

        let from = Utc::now() - Duration::hours(1);
        let to = Utc::now() + Duration::hours(1);
        let records = db.sales().list_between(from, to).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].items.len(), 1);
        assert_eq!(records[1].items.len(), 2);
        assert_eq!(records[1].items[0].product_name, None);
        assert_eq!(records[1].items[0].product_id, None);
        assert_eq!(records[1].items[1].product_name.as_deref(), Some("Coca-Cola"));

        let later = db
            .sales()
            .list_between(to, to + Duration::hours(1))
            .await
            .unwrap();
        assert!(later.is_empty());
    }
}
