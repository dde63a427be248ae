//! # Sale Repository
//!
//! Record store accessor for sales and their line items.
//!
//! ## Header + Lines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sale Persistence                                 │
//! │                                                                         │
//! │  insert(sale)                                                           │
//! │    BEGIN (savepoint if already inside a transaction)                    │
//! │    ├── INSERT sales header      (duplicate invoice → UniqueViolation)   │
//! │    ├── INSERT sale_items × N                                            │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  update(sale)                                                           │
//! │    BEGIN                                                                │
//! │    ├── UPDATE sales header      (missing invoice → NotFound)            │
//! │    ├── per line: loaded? UPDATE sale_items : INSERT sale_items          │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  delete(sale)                                                           │
//! │    BEGIN                                                                │
//! │    ├── DELETE sale_items        (lines before header)                   │
//! │    ├── DELETE sales header                                              │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Loaded sales always carry their line items, each flagged as loaded.

use chrono::{DateTime, Utc};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{DocumentStatus, Money, Sale, SaleItem};

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    invoice_id: String,
    date: DateTime<Utc>,
    status: DocumentStatus,
    note: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: i64,
    sku: String,
    quantity: i64,
    buy_price: Money,
    sell_price: Money,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        SaleItem::new(row.sku, row.quantity, row.buy_price, row.sell_price).mark_loaded(row.id)
    }
}

/// Repository for sale documents.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Pooled
    // =========================================================================

    /// Gets a sale with its line items. `NotFound` when absent.
    pub async fn find_by_id(&self, invoice_id: &str) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_id_in(&mut conn, invoice_id).await
    }

    /// Gets every sale, ordered by invoice id.
    pub async fn find_all(&self) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        self.find_all_in(&mut conn).await
    }

    /// Gets the sales with `status` dated within `[start, end)`, oldest first.
    /// `end = None` leaves the range open above.
    pub async fn find_by_status_and_date_range(
        &self,
        status: DocumentStatus,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_status_and_date_range_in(&mut conn, status, start, end)
            .await
    }

    /// Inserts a new sale and all its lines. Returns the stored sale.
    pub async fn insert(&self, sale: &Sale) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        self.insert_in(&mut conn, sale).await
    }

    /// Updates a sale header and upserts its lines. Returns the stored sale.
    pub async fn update(&self, sale: &Sale) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        self.update_in(&mut conn, sale).await
    }

    /// Deletes a sale and its lines. `NotFound` when absent.
    pub async fn delete(&self, sale: &Sale) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        self.delete_in(&mut conn, sale).await
    }

    /// Inserts or updates depending on whether the sale was loaded.
    pub async fn save(&self, sale: &Sale) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        self.save_in(&mut conn, sale).await
    }

    // =========================================================================
    // Connection-scoped
    // =========================================================================

    pub async fn find_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        invoice_id: &str,
    ) -> DbResult<Sale> {
        debug!(invoice_id = %invoice_id, "Loading sale");

        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT invoice_id, date, status, note
            FROM sales
            WHERE invoice_id = ?1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&mut *conn)
        .await?;

        let row = row.ok_or_else(|| DbError::not_found("Sale", invoice_id))?;
        self.hydrate(conn, row).await
    }

    pub async fn find_all_in(&self, conn: &mut SqliteConnection) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT invoice_id, date, status, note
            FROM sales
            ORDER BY invoice_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        self.hydrate_all(conn, rows).await
    }

    pub async fn find_by_status_and_date_range_in(
        &self,
        conn: &mut SqliteConnection,
        status: DocumentStatus,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Sale>> {
        debug!(%status, %start, ?end, "Loading sales by status and date range");

        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT invoice_id, date, status, note
            FROM sales
            WHERE status = ?1 AND date >= ?2 AND (?3 IS NULL OR date < ?3)
            ORDER BY date, invoice_id
            "#,
        )
        .bind(status)
        .bind(start)
        .bind(end)
        .fetch_all(&mut *conn)
        .await?;

        self.hydrate_all(conn, rows).await
    }

    pub async fn insert_in(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<Sale> {
        debug!(invoice_id = %sale.invoice_id, items = sale.items.len(), "Inserting sale");

        let mut tx = conn.begin().await.map_err(DbError::transaction)?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT invoice_id FROM sales WHERE invoice_id = ?1")
                .bind(&sale.invoice_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_some() {
            return Err(DbError::duplicate("invoice_id", &sale.invoice_id));
        }

        sqlx::query(
            r#"
            INSERT INTO sales (invoice_id, date, status, note)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&sale.invoice_id)
        .bind(sale.date)
        .bind(sale.status)
        .bind(&sale.note)
        .execute(&mut *tx)
        .await?;

        for item in sale.items.values() {
            insert_item(&mut tx, &sale.invoice_id, item).await?;
        }

        let stored = self.find_by_id_in(&mut tx, &sale.invoice_id).await?;
        tx.commit().await.map_err(DbError::transaction)?;
        Ok(stored)
    }

    pub async fn update_in(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<Sale> {
        debug!(
            invoice_id = %sale.invoice_id,
            status = %sale.status,
            items = sale.items.len(),
            "Updating sale"
        );

        let mut tx = conn.begin().await.map_err(DbError::transaction)?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                date = ?2,
                status = ?3,
                note = ?4
            WHERE invoice_id = ?1
            "#,
        )
        .bind(&sale.invoice_id)
        .bind(sale.date)
        .bind(sale.status)
        .bind(&sale.note)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.invoice_id));
        }

        for item in sale.items.values() {
            match item.id {
                Some(id) if item.is_loaded() => update_item(&mut tx, id, item).await?,
                _ => insert_item(&mut tx, &sale.invoice_id, item).await?,
            }
        }

        let stored = self.find_by_id_in(&mut tx, &sale.invoice_id).await?;
        tx.commit().await.map_err(DbError::transaction)?;
        Ok(stored)
    }

    pub async fn delete_in(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(invoice_id = %sale.invoice_id, "Deleting sale");

        let mut tx = conn.begin().await.map_err(DbError::transaction)?;

        sqlx::query("DELETE FROM sale_items WHERE invoice_id = ?1")
            .bind(&sale.invoice_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE invoice_id = ?1")
            .bind(&sale.invoice_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.invoice_id));
        }

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }

    pub async fn save_in(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<Sale> {
        if sale.is_loaded() {
            self.update_in(conn, sale).await
        } else {
            self.insert_in(conn, sale).await
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn hydrate(&self, conn: &mut SqliteConnection, row: SaleRow) -> DbResult<Sale> {
        let items: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT id, sku, quantity, buy_price, sell_price
            FROM sale_items
            WHERE invoice_id = ?1
            ORDER BY id
            "#,
        )
        .bind(&row.invoice_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut sale = Sale::new(row.invoice_id, row.date, row.note);
        sale.status = row.status;
        for item in items {
            let item = SaleItem::from(item);
            sale.items.insert(item.sku.clone(), item);
        }
        Ok(sale.mark_loaded())
    }

    async fn hydrate_all(
        &self,
        conn: &mut SqliteConnection,
        rows: Vec<SaleRow>,
    ) -> DbResult<Vec<Sale>> {
        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            sales.push(self.hydrate(conn, row).await?);
        }
        Ok(sales)
    }
}

async fn insert_item(conn: &mut SqliteConnection, invoice_id: &str, item: &SaleItem) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (invoice_id, sku, quantity, buy_price, sell_price)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(invoice_id)
    .bind(&item.sku)
    .bind(item.quantity)
    .bind(item.buy_price)
    .bind(item.sell_price)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn update_item(conn: &mut SqliteConnection, id: i64, item: &SaleItem) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE sale_items SET
            quantity = ?2,
            buy_price = ?3,
            sell_price = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(item.quantity)
    .bind(item.buy_price)
    .bind(item.sell_price)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("SaleItem", id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn sale(invoice_id: &str, date: DateTime<Utc>) -> Sale {
        let mut sale = Sale::new(invoice_id, date, "walk-in");
        sale.add_item(SaleItem::new("A", 2, Money::from_cents(100), Money::from_cents(150)))
            .unwrap();
        sale.add_item(SaleItem::new("B", 1, Money::from_cents(200), Money::from_cents(260)))
            .unwrap();
        sale
    }

    #[tokio::test]
    async fn test_insert_and_find_with_items() {
        let db = setup().await;
        let repo = db.sales();

        let stored = repo.insert(&sale("INV1", at(1))).await.unwrap();
        assert!(stored.is_loaded());
        assert!(stored.items.values().all(|item| item.is_loaded() && item.id.is_some()));

        let found = repo.find_by_id("INV1").await.unwrap();
        assert_eq!(found.status, DocumentStatus::Draft);
        assert_eq!(found.date, at(1));
        assert_eq!(found.note, "walk-in");
        assert_eq!(found.items.len(), 2);
        assert_eq!(found.items["A"].sell_price.cents(), 150);
    }

    #[tokio::test]
    async fn test_insert_duplicate_invoice_fails() {
        let db = setup().await;
        let repo = db.sales();

        repo.insert(&sale("INV1", at(1))).await.unwrap();
        let err = repo.insert(&sale("INV1", at(2))).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let db = setup().await;
        assert!(db.sales().find_by_id("NOPE").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_changes_status_and_upserts_items() {
        let db = setup().await;
        let repo = db.sales();

        let mut stored = repo.insert(&sale("INV1", at(1))).await.unwrap();
        stored.status = DocumentStatus::Done;
        if let Some(line) = stored.items.get_mut("A") {
            line.quantity = 5;
        }
        stored
            .add_item(SaleItem::new("C", 1, Money::from_cents(10), Money::from_cents(20)))
            .unwrap();

        let updated = repo.update(&stored).await.unwrap();

        assert_eq!(updated.status, DocumentStatus::Done);
        assert_eq!(updated.items.len(), 3);
        assert_eq!(updated.items["A"].quantity, 5);
        assert_eq!(updated.items["A"].id, stored.items["A"].id);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = setup().await;
        let err = db.sales().update(&sale("NOPE", at(1))).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_dispatches_on_loaded_flag() {
        let db = setup().await;
        let repo = db.sales();

        let mut stored = repo.save(&sale("INV1", at(1))).await.unwrap();
        stored.note = "changed".to_string();
        repo.save(&stored).await.unwrap();

        assert_eq!(repo.find_by_id("INV1").await.unwrap().note, "changed");
    }

    #[tokio::test]
    async fn test_delete_removes_items_first() {
        let db = setup().await;
        let repo = db.sales();

        let stored = repo.insert(&sale("INV1", at(1))).await.unwrap();
        repo.delete(&stored).await.unwrap();

        assert!(repo.find_by_id("INV1").await.unwrap_err().is_not_found());
        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);

        assert!(repo.delete(&stored).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_by_status_and_date_range() {
        let db = setup().await;
        let repo = db.sales();

        for (invoice, day, status) in [
            ("INV1", 1, DocumentStatus::Done),
            ("INV2", 2, DocumentStatus::Done),
            ("INV3", 2, DocumentStatus::Draft),
            ("INV4", 5, DocumentStatus::Done),
        ] {
            let mut sale = sale(invoice, at(day));
            sale.status = status;
            repo.insert(&sale).await.unwrap();
        }

        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        let found = repo
            .find_by_status_and_date_range(DocumentStatus::Done, start, Some(end))
            .await
            .unwrap();

        let ids: Vec<&str> = found.iter().map(|sale| sale.invoice_id.as_str()).collect();
        assert_eq!(ids, vec!["INV1", "INV2"]);
        assert!(found.iter().all(|sale| sale.items.len() == 2));

        let open = repo
            .find_by_status_and_date_range(DocumentStatus::Done, end, None)
            .await
            .unwrap();
        let ids: Vec<&str> = open.iter().map(|sale| sale.invoice_id.as_str()).collect();
        assert_eq!(ids, vec!["INV4"]);
    }

    #[tokio::test]
    async fn test_insert_inside_rolled_back_transaction() {
        let db = setup().await;
        let repo = db.sales();

        let mut tx = db.begin().await.unwrap();
        repo.insert_in(&mut tx, &sale("INV1", at(1))).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
