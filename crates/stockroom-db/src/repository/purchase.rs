//! # Purchase Repository
//!
//! Record store accessor for purchases (stock replenishment) and their
//! line items. Same header-then-lines contract as [`SaleRepository`].
//!
//! [`SaleRepository`]: super::sale::SaleRepository

use chrono::{DateTime, Utc};
use sqlx::{Connection, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{DocumentStatus, Money, Purchase, PurchaseItem};

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    purchase_id: String,
    date: DateTime<Utc>,
    status: DocumentStatus,
    note: String,
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseItemRow {
    id: i64,
    sku: String,
    quantity: i64,
    buy_price: Money,
    note: String,
}

impl From<PurchaseItemRow> for PurchaseItem {
    fn from(row: PurchaseItemRow) -> Self {
        PurchaseItem::new(row.sku, row.quantity, row.buy_price, row.note).mark_loaded(row.id)
    }
}

/// Repository for purchase documents.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    // =========================================================================
    // Pooled
    // =========================================================================

    /// Gets a purchase with its line items. `NotFound` when absent.
    pub async fn find_by_id(&self, purchase_id: &str) -> DbResult<Purchase> {
        let mut conn = self.pool.acquire().await?;
        self.find_by_id_in(&mut conn, purchase_id).await
    }

    /// Gets every purchase, ordered by purchase id.
    pub async fn find_all(&self) -> DbResult<Vec<Purchase>> {
        let mut conn = self.pool.acquire().await?;
        self.find_all_in(&mut conn).await
    }

    pub async fn insert(&self, purchase: &Purchase) -> DbResult<Purchase> {
        let mut conn = self.pool.acquire().await?;
        self.insert_in(&mut conn, purchase).await
    }

    pub async fn update(&self, purchase: &Purchase) -> DbResult<Purchase> {
        let mut conn = self.pool.acquire().await?;
        self.update_in(&mut conn, purchase).await
    }

    pub async fn delete(&self, purchase: &Purchase) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        self.delete_in(&mut conn, purchase).await
    }

    pub async fn save(&self, purchase: &Purchase) -> DbResult<Purchase> {
        let mut conn = self.pool.acquire().await?;
        self.save_in(&mut conn, purchase).await
    }

    // =========================================================================
    // Connection-scoped
    // =========================================================================

    pub async fn find_by_id_in(
        &self,
        conn: &mut SqliteConnection,
        purchase_id: &str,
    ) -> DbResult<Purchase> {
        debug!(purchase_id = %purchase_id, "Loading purchase");

        let row: Option<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT purchase_id, date, status, note
            FROM purchases
            WHERE purchase_id = ?1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *conn)
        .await?;

        let row = row.ok_or_else(|| DbError::not_found("Purchase", purchase_id))?;
        self.hydrate(conn, row).await
    }

    pub async fn find_all_in(&self, conn: &mut SqliteConnection) -> DbResult<Vec<Purchase>> {
        let rows: Vec<PurchaseRow> = sqlx::query_as(
            r#"
            SELECT purchase_id, date, status, note
            FROM purchases
            ORDER BY purchase_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut purchases = Vec::with_capacity(rows.len());
        for row in rows {
            purchases.push(self.hydrate(conn, row).await?);
        }
        Ok(purchases)
    }

    pub async fn insert_in(
        &self,
        conn: &mut SqliteConnection,
        purchase: &Purchase,
    ) -> DbResult<Purchase> {
        debug!(
            purchase_id = %purchase.purchase_id,
            items = purchase.items.len(),
            "Inserting purchase"
        );

        let mut tx = conn.begin().await.map_err(DbError::transaction)?;

        let exists: Option<String> =
            sqlx::query_scalar("SELECT purchase_id FROM purchases WHERE purchase_id = ?1")
                .bind(&purchase.purchase_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_some() {
            return Err(DbError::duplicate("purchase_id", &purchase.purchase_id));
        }

        sqlx::query(
            r#"
            INSERT INTO purchases (purchase_id, date, status, note)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&purchase.purchase_id)
        .bind(purchase.date)
        .bind(purchase.status)
        .bind(&purchase.note)
        .execute(&mut *tx)
        .await?;

        for item in purchase.items.values() {
            insert_item(&mut tx, &purchase.purchase_id, item).await?;
        }

        let stored = self.find_by_id_in(&mut tx, &purchase.purchase_id).await?;
        tx.commit().await.map_err(DbError::transaction)?;
        Ok(stored)
    }

    pub async fn update_in(
        &self,
        conn: &mut SqliteConnection,
        purchase: &Purchase,
    ) -> DbResult<Purchase> {
        debug!(
            purchase_id = %purchase.purchase_id,
            status = %purchase.status,
            "Updating purchase"
        );

        let mut tx = conn.begin().await.map_err(DbError::transaction)?;

        let result = sqlx::query(
            r#"
            UPDATE purchases SET
                date = ?2,
                status = ?3,
                note = ?4
            WHERE purchase_id = ?1
            "#,
        )
        .bind(&purchase.purchase_id)
        .bind(purchase.date)
        .bind(purchase.status)
        .bind(&purchase.note)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", &purchase.purchase_id));
        }

        for item in purchase.items.values() {
            match item.id {
                Some(id) if item.is_loaded() => update_item(&mut tx, id, item).await?,
                _ => insert_item(&mut tx, &purchase.purchase_id, item).await?,
            }
        }

        let stored = self.find_by_id_in(&mut tx, &purchase.purchase_id).await?;
        tx.commit().await.map_err(DbError::transaction)?;
        Ok(stored)
    }

    pub async fn delete_in(&self, conn: &mut SqliteConnection, purchase: &Purchase) -> DbResult<()> {
        debug!(purchase_id = %purchase.purchase_id, "Deleting purchase");

        let mut tx = conn.begin().await.map_err(DbError::transaction)?;

        sqlx::query("DELETE FROM purchase_items WHERE purchase_id = ?1")
            .bind(&purchase.purchase_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM purchases WHERE purchase_id = ?1")
            .bind(&purchase.purchase_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", &purchase.purchase_id));
        }

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }

    pub async fn save_in(
        &self,
        conn: &mut SqliteConnection,
        purchase: &Purchase,
    ) -> DbResult<Purchase> {
        if purchase.is_loaded() {
            self.update_in(conn, purchase).await
        } else {
            self.insert_in(conn, purchase).await
        }
    }

    async fn hydrate(&self, conn: &mut SqliteConnection, row: PurchaseRow) -> DbResult<Purchase> {
        let items: Vec<PurchaseItemRow> = sqlx::query_as(
            r#"
            SELECT id, sku, quantity, buy_price, note
            FROM purchase_items
            WHERE purchase_id = ?1
            ORDER BY id
            "#,
        )
        .bind(&row.purchase_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut purchase = Purchase::new(row.purchase_id, row.date, row.note);
        purchase.status = row.status;
        for item in items {
            let item = PurchaseItem::from(item);
            purchase.items.insert(item.sku.clone(), item);
        }
        Ok(purchase.mark_loaded())
    }
}

async fn insert_item(
    conn: &mut SqliteConnection,
    purchase_id: &str,
    item: &PurchaseItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_items (purchase_id, sku, quantity, buy_price, note)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(purchase_id)
    .bind(&item.sku)
    .bind(item.quantity)
    .bind(item.buy_price)
    .bind(&item.note)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn update_item(conn: &mut SqliteConnection, id: i64, item: &PurchaseItem) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE purchase_items SET
            quantity = ?2,
            buy_price = ?3,
            note = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(item.quantity)
    .bind(item.buy_price)
    .bind(&item.note)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("PurchaseItem", id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn purchase(purchase_id: &str) -> Purchase {
        let mut purchase = Purchase::new(purchase_id, Utc::now(), "supplier restock");
        purchase
            .add_item(PurchaseItem::new("A", 10, Money::from_cents(90), "box of 10"))
            .unwrap();
        purchase
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = setup().await;
        let repo = db.purchases();

        repo.insert(&purchase("PO-1")).await.unwrap();

        let found = repo.find_by_id("PO-1").await.unwrap();
        assert!(found.is_loaded());
        assert_eq!(found.status, DocumentStatus::Draft);
        assert_eq!(found.items["A"].note, "box of 10");
        assert_eq!(found.total(), Some(Money::from_cents(900)));
    }

    #[tokio::test]
    async fn test_insert_duplicate_fails() {
        let db = setup().await;
        let repo = db.purchases();

        repo.insert(&purchase("PO-1")).await.unwrap();
        let err = repo.insert(&purchase("PO-1")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_save_updates_loaded_purchase() {
        let db = setup().await;
        let repo = db.purchases();

        let mut stored = repo.save(&purchase("PO-1")).await.unwrap();
        stored.status = DocumentStatus::Canceled;
        repo.save(&stored).await.unwrap();

        assert_eq!(
            repo.find_by_id("PO-1").await.unwrap().status,
            DocumentStatus::Canceled
        );
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = setup().await;
        let repo = db.purchases();

        let stored = repo.insert(&purchase("PO-1")).await.unwrap();
        repo.delete(&stored).await.unwrap();

        assert!(repo.find_by_id("PO-1").await.unwrap_err().is_not_found());
        assert!(repo.delete(&stored).await.unwrap_err().is_not_found());
        assert!(repo.update(&stored).await.unwrap_err().is_not_found());
    }
}
