//! # Stock Repository
//!
//! Record store accessor for stock on hand, keyed by SKU.
//!
//! ## Pooled vs. Connection-Scoped
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  find_by_sku(sku)               ──► acquires a pool connection          │
//! │  find_by_sku_in(&mut conn, sku) ──► runs on the caller's connection     │
//! │                                     (usually an open Transaction)       │
//! │                                                                         │
//! │  Every operation comes in both forms. The service layer uses the        │
//! │  `_in` form whenever several writes must commit or roll back together.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Money, StockItem};

#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    sku: String,
    name: String,
    quantity: i64,
    buy_price: Money,
    sell_price: Money,
}

impl From<StockRow> for StockItem {
    fn from(row: StockRow) -> Self {
        StockItem::new(row.sku, row.name, row.quantity, row.buy_price, row.sell_price)
            .mark_loaded()
    }
}

/// Repository for stock records.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    // =========================================================================
    // Pooled
    // =========================================================================

    /// Gets a stock record by SKU. `NotFound` when absent.
    pub async fn find_by_sku(&self, sku: &str) -> DbResult<StockItem> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_sku_in(&mut conn, sku).await
    }

    /// Gets every stock record, ordered by SKU.
    pub async fn find_all(&self) -> DbResult<Vec<StockItem>> {
        let mut conn = self.pool.acquire().await?;
        self.find_all_in(&mut conn).await
    }

    /// Inserts a new stock record. Fails with `UniqueViolation` if the SKU exists.
    pub async fn insert(&self, item: &StockItem) -> DbResult<StockItem> {
        let mut conn = self.pool.acquire().await?;
        self.insert_in(&mut conn, item).await
    }

    /// Overwrites an existing stock record. `NotFound` when absent.
    pub async fn update(&self, item: &StockItem) -> DbResult<StockItem> {
        let mut conn = self.pool.acquire().await?;
        self.update_in(&mut conn, item).await
    }

    /// Deletes a stock record. `NotFound` when absent.
    pub async fn delete(&self, item: &StockItem) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        self.delete_in(&mut conn, item).await
    }

    /// Inserts or updates depending on whether the record was loaded.
    pub async fn save(&self, item: &StockItem) -> DbResult<StockItem> {
        let mut conn = self.pool.acquire().await?;
        self.save_in(&mut conn, item).await
    }

    /// Number of stock records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // Connection-scoped
    // =========================================================================

    pub async fn find_by_sku_in(
        &self,
        conn: &mut SqliteConnection,
        sku: &str,
    ) -> DbResult<StockItem> {
        debug!(sku = %sku, "Loading stock");

        let row: Option<StockRow> = sqlx::query_as(
            r#"
            SELECT sku, name, quantity, buy_price, sell_price
            FROM stock
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(StockItem::from)
            .ok_or_else(|| DbError::not_found("Stock", sku))
    }

    pub async fn find_all_in(&self, conn: &mut SqliteConnection) -> DbResult<Vec<StockItem>> {
        let rows: Vec<StockRow> = sqlx::query_as(
            r#"
            SELECT sku, name, quantity, buy_price, sell_price
            FROM stock
            ORDER BY sku
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        debug!(count = rows.len(), "Loaded stock listing");
        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    pub async fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        item: &StockItem,
    ) -> DbResult<StockItem> {
        debug!(sku = %item.sku, quantity = item.quantity, "Inserting stock");

        let exists: Option<String> = sqlx::query_scalar("SELECT sku FROM stock WHERE sku = ?1")
            .bind(&item.sku)
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_some() {
            return Err(DbError::duplicate("sku", &item.sku));
        }

        sqlx::query(
            r#"
            INSERT INTO stock (sku, name, quantity, buy_price, sell_price)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.sku)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.buy_price)
        .bind(item.sell_price)
        .execute(&mut *conn)
        .await?;

        Ok(item.clone().mark_loaded())
    }

    pub async fn update_in(
        &self,
        conn: &mut SqliteConnection,
        item: &StockItem,
    ) -> DbResult<StockItem> {
        debug!(sku = %item.sku, quantity = item.quantity, "Updating stock");

        let result = sqlx::query(
            r#"
            UPDATE stock SET
                name = ?2,
                quantity = ?3,
                buy_price = ?4,
                sell_price = ?5
            WHERE sku = ?1
            "#,
        )
        .bind(&item.sku)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.buy_price)
        .bind(item.sell_price)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", &item.sku));
        }

        Ok(item.clone().mark_loaded())
    }

    pub async fn delete_in(&self, conn: &mut SqliteConnection, item: &StockItem) -> DbResult<()> {
        debug!(sku = %item.sku, "Deleting stock");

        let result = sqlx::query("DELETE FROM stock WHERE sku = ?1")
            .bind(&item.sku)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stock", &item.sku));
        }

        Ok(())
    }

    pub async fn save_in(
        &self,
        conn: &mut SqliteConnection,
        item: &StockItem,
    ) -> DbResult<StockItem> {
        if item.is_loaded() {
            self.update_in(conn, item).await
        } else {
            self.insert_in(conn, item).await
        }
    }
}
