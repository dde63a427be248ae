//! # Inventory Service
//!
//! The service struct, its construction, and the stock record operations.
//! Sale, purchase and report operations live in sibling modules as further
//! `impl InventoryService` blocks.
//!
//! ## Transaction Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut tx = self.db.begin().await?;                                   │
//! │  let result = self.some_op_in(&mut tx, ..).await;                       │
//! │  finish(tx, "some_op", result).await                                    │
//! │      │                                                                  │
//! │      ├── Ok(_)  ──► COMMIT    (commit failure surfaces as Storage)      │
//! │      └── Err(e) ──► ROLLBACK  (e is returned unchanged)                 │
//! │                                                                         │
//! │  Everything inside `some_op_in` uses the `*_in(&mut tx, ..)` accessor   │
//! │  methods so no step can escape the transaction.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::validation::{validate_sku, validate_sku_input};
use stockroom_core::{CoreError, SkuInput, StockItem};
use stockroom_db::{
    Database, DbError, DbResult, PurchaseRepository, SaleRepository, Sqlite, SqliteConnection,
    StockRepository, Transaction,
};
use tracing::{debug, info, warn};

use crate::error::{ServiceError, ServiceResult};

/// Inventory operations over the stock, purchase and sale records.
///
/// Cheap to clone; clones share the same pool.
#[derive(Debug, Clone)]
pub struct InventoryService {
    pub(crate) db: Database,
    pub(crate) stock: StockRepository,
    pub(crate) purchases: PurchaseRepository,
    pub(crate) sales: SaleRepository,
}

impl InventoryService {
    /// Creates a service from explicit collaborators.
    ///
    /// The repositories must share `db`'s pool; transactions opened on `db`
    /// are handed to their `*_in` methods.
    pub fn new(
        db: Database,
        stock: StockRepository,
        purchases: PurchaseRepository,
        sales: SaleRepository,
    ) -> Self {
        InventoryService {
            db,
            stock,
            purchases,
            sales,
        }
    }

    /// Creates a service with the repositories of `db`.
    pub fn from_database(db: Database) -> Self {
        let stock = db.stock();
        let purchases = db.purchases();
        let sales = db.sales();
        InventoryService::new(db, stock, purchases, sales)
    }

    // =========================================================================
    // Stock Records
    // =========================================================================

    /// Returns the stock record for `sku`. `NotFound` when absent.
    pub async fn get_item_info(&self, sku: &str) -> ServiceResult<StockItem> {
        debug!(sku = %sku, "get_item_info");
        Ok(self.stock.find_by_sku(sku).await?)
    }

    /// Returns every stock record, ordered by SKU.
    pub async fn list_stock(&self) -> ServiceResult<Vec<StockItem>> {
        Ok(self.stock.find_all().await?)
    }

    /// Registers a new SKU.
    ///
    /// ## Errors
    /// - `Validation` for a malformed SKU, a negative quantity or price
    /// - `Validation(SkuExists)` when the SKU is already registered
    pub async fn add_sku(&self, input: SkuInput) -> ServiceResult<StockItem> {
        validate_sku_input(&input)?;

        let item = StockItem::new(
            input.sku,
            input.name.unwrap_or_default(),
            input.quantity,
            input.buy_price,
            input.sell_price,
        );

        let saved = match self.stock.insert(&item).await {
            Ok(saved) => saved,
            Err(DbError::UniqueViolation { .. }) => {
                return Err(CoreError::SkuExists(item.sku).into())
            }
            Err(err) => return Err(err.into()),
        };

        info!(sku = %saved.sku, quantity = saved.quantity, "SKU added");
        Ok(saved)
    }

    /// Overwrites quantity and prices (and the name, when given) of an
    /// existing SKU. `NotFound` when absent.
    pub async fn update_sku(&self, input: SkuInput) -> ServiceResult<StockItem> {
        validate_sku_input(&input)?;

        let mut tx = self.db.begin().await?;
        let result = self.update_sku_in(&mut tx, input).await;
        let saved = finish(tx, "update_sku", result).await?;

        info!(sku = %saved.sku, quantity = saved.quantity, "SKU updated");
        Ok(saved)
    }

    async fn update_sku_in(
        &self,
        conn: &mut SqliteConnection,
        input: SkuInput,
    ) -> ServiceResult<StockItem> {
        let mut item = self.stock.find_by_sku_in(conn, &input.sku).await?;

        if let Some(name) = input.name {
            item.name = name;
        }
        item.quantity = input.quantity;
        item.buy_price = input.buy_price;
        item.sell_price = input.sell_price;

        Ok(self.stock.update_in(conn, &item).await?)
    }

    /// Loads a stock record inside a document transaction. A missing SKU
    /// there means the document references an invalid item.
    pub(crate) async fn require_stock_in(
        &self,
        conn: &mut SqliteConnection,
        sku: &str,
    ) -> ServiceResult<StockItem> {
        validate_sku(sku)?;
        match self.stock.find_by_sku_in(conn, sku).await {
            Ok(item) => Ok(item),
            Err(err) if err.is_not_found() => Err(CoreError::UnknownSku(sku.to_string()).into()),
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Commits on success, rolls back on failure.
pub(crate) async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    operation: &'static str,
    result: ServiceResult<T>,
) -> ServiceResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(DbError::transaction)?;
            debug!(operation, "Transaction committed");
            Ok(value)
        }
        Err(err) => {
            warn!(operation, error = %err, "Rolling back transaction");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(operation, error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

/// `Ok(None)` for a missing record, everything else unchanged.
pub(crate) fn optional<T>(result: DbResult<T>) -> Result<Option<T>, ServiceError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{service, sku};
    use stockroom_core::Money;

    #[tokio::test]
    async fn test_add_and_get_item() {
        let svc = service().await;

        let added = svc
            .add_sku(sku("SSI-D00791015-LL-BWH", 10, 55_000_00, 60_000_00).named("Blouse"))
            .await
            .unwrap();
        assert_eq!(added.quantity, 10);

        let found = svc.get_item_info("SSI-D00791015-LL-BWH").await.unwrap();
        assert_eq!(found.name, "Blouse");
        assert_eq!(found.sell_price, Money::from_cents(60_000_00));
    }

    #[tokio::test]
    async fn test_get_missing_item_is_not_found() {
        let svc = service().await;
        let err = svc.get_item_info("NOPE").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_add_duplicate_sku_is_validation_error() {
        let svc = service().await;
        svc.add_sku(sku("A", 1, 100, 150)).await.unwrap();

        let err = svc.add_sku(sku("A", 5, 100, 150)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(CoreError::SkuExists(_))));
        assert_eq!(svc.get_item_info("A").await.unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_add_sku_rejects_bad_input() {
        let svc = service().await;

        for input in [
            sku("", 1, 100, 150),
            sku("A", -1, 100, 150),
            sku("A", 1, -100, 150),
            sku("A", 1, 100, -150),
        ] {
            let err = svc.add_sku(input).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(svc.list_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_sku() {
        let svc = service().await;
        svc.add_sku(sku("A", 1, 100, 150).named("Old")).await.unwrap();

        let updated = svc.update_sku(sku("A", 8, 120, 170)).await.unwrap();
        assert_eq!(updated.quantity, 8);
        assert_eq!(updated.name, "Old");

        let renamed = svc.update_sku(sku("A", 8, 120, 170).named("New")).await.unwrap();
        assert_eq!(renamed.name, "New");
        assert_eq!(svc.get_item_info("A").await.unwrap().buy_price.cents(), 120);
    }

    #[tokio::test]
    async fn test_update_missing_sku_is_not_found() {
        let svc = service().await;
        let err = svc.update_sku(sku("A", 1, 100, 150)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // the rolled back transaction released its connection
        assert!(svc.list_stock().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_stock_ordered() {
        let svc = service().await;
        for code in ["B", "C", "A"] {
            svc.add_sku(sku(code, 1, 1, 1)).await.unwrap();
        }
        let skus: Vec<String> = svc
            .list_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.sku)
            .collect();
        assert_eq!(skus, ["A", "B", "C"]);
    }
}
