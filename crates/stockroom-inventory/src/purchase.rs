//! # Purchase Workflow
//!
//! Purchases replenish stock. They follow the same status machine as
//! sales, with the stock movement reversed:
//!
//! ```text
//! Draft → Done      every line: stock.quantity += line.quantity
//!                               stock.buy_price = line.buy_price
//! Draft → Canceled  no stock effect
//! ```

use chrono::Utc;
use stockroom_core::validation::{validate_document_id, validate_purchase_lines};
use stockroom_core::{
    CoreError, DocumentStatus, Purchase, PurchaseItem, PurchaseLine, ValidationError,
};
use stockroom_db::SqliteConnection;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::service::{finish, optional, InventoryService};

const DOCUMENT: &str = "Purchase";

impl InventoryService {
    /// Drafts a purchase. Every SKU must already be registered; a line
    /// without a buy price takes the SKU's current one.
    pub async fn create_purchase(
        &self,
        purchase_id: &str,
        note: &str,
        lines: &[PurchaseLine],
    ) -> ServiceResult<Purchase> {
        validate_document_id("purchase_id", purchase_id)?;
        validate_purchase_lines(lines)?;

        let mut tx = self.db.begin().await?;
        let result = self
            .create_purchase_in(&mut tx, purchase_id, note, lines)
            .await;
        let purchase = finish(tx, "create_purchase", result).await?;

        info!(
            purchase_id = %purchase.purchase_id,
            items = purchase.items.len(),
            total = ?purchase.total(),
            "Purchase drafted"
        );
        Ok(purchase)
    }

    async fn create_purchase_in(
        &self,
        conn: &mut SqliteConnection,
        purchase_id: &str,
        note: &str,
        lines: &[PurchaseLine],
    ) -> ServiceResult<Purchase> {
        if optional(self.purchases.find_by_id_in(conn, purchase_id).await)?.is_some() {
            return Err(CoreError::DuplicateDocument {
                document: DOCUMENT,
                id: purchase_id.to_string(),
            }
            .into());
        }

        let mut purchase = Purchase::new(purchase_id, Utc::now(), note);
        for line in lines {
            let stock = self.require_stock_in(conn, &line.sku).await?;
            let buy_price = line.buy_price.unwrap_or(stock.buy_price);
            purchase.add_item(PurchaseItem::new(
                stock.sku,
                line.quantity,
                buy_price,
                line.note.clone(),
            ))?;
        }

        Ok(self.purchases.insert_in(conn, &purchase).await?)
    }

    /// Returns a purchase with its lines. `NotFound` when absent.
    pub async fn get_purchase(&self, purchase_id: &str) -> ServiceResult<Purchase> {
        debug!(purchase_id = %purchase_id, "get_purchase");
        Ok(self.purchases.find_by_id(purchase_id).await?)
    }

    /// Moves a purchase to `status`. Transition rules match
    /// [`update_sale`](InventoryService::update_sale); Done receives the
    /// goods into stock atomically.
    pub async fn update_purchase(
        &self,
        purchase_id: &str,
        status: DocumentStatus,
    ) -> ServiceResult<Purchase> {
        validate_document_id("purchase_id", purchase_id)?;

        let mut tx = self.db.begin().await?;
        let result = self.update_purchase_in(&mut tx, purchase_id, status).await;
        let purchase = finish(tx, "update_purchase", result).await?;

        info!(
            purchase_id = %purchase.purchase_id,
            status = %purchase.status,
            "Purchase updated"
        );
        Ok(purchase)
    }

    async fn update_purchase_in(
        &self,
        conn: &mut SqliteConnection,
        purchase_id: &str,
        status: DocumentStatus,
    ) -> ServiceResult<Purchase> {
        let mut purchase = self.purchases.find_by_id_in(conn, purchase_id).await?;
        let current = purchase.status;

        if !current.can_transition_to(status) {
            return Err(CoreError::InvalidStatusTransition {
                document: DOCUMENT,
                id: purchase.purchase_id,
                from: current,
                to: status,
            }
            .into());
        }

        if current.is_terminal() {
            return Ok(purchase);
        }

        if status == DocumentStatus::Done {
            for item in purchase.items.values() {
                let mut stock = self.require_stock_in(conn, &item.sku).await?;
                stock.quantity = stock.quantity.checked_add(item.quantity).ok_or_else(|| {
                    ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 0,
                        max: i64::MAX,
                    }
                })?;
                stock.buy_price = item.buy_price;

                self.stock.update_in(conn, &stock).await?;
                debug!(sku = %stock.sku, quantity = stock.quantity, "Stock received");
            }
        }

        purchase.status = status;
        Ok(self.purchases.update_in(conn, &purchase).await?)
    }
}
