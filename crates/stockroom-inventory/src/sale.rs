//! # Sale Workflow
//!
//! Drafting sales and moving them through their status machine.
//!
//! ## Finalization
//! ```text
//! update_sale(invoice, Done)
//!   BEGIN
//!   ├── load sale (with lines)                         NotFound → abort
//!   ├── check transition                               invalid  → abort
//!   ├── for each line, in SKU order:
//!   │     re-read stock                                missing  → abort
//!   │     stock.quantity ≥ line.quantity ?             short    → abort
//!   │     stock.quantity -= line.quantity; UPDATE stock
//!   ├── sale.status = Done; UPDATE sale
//!   COMMIT                        (any abort above → ROLLBACK, nothing changed)
//! ```
//!
//! Drafting a sale only checks stock; nothing is reserved until Done.

use chrono::Utc;
use stockroom_core::validation::{validate_document_id, validate_sale_lines};
use stockroom_core::{CoreError, DocumentStatus, Sale, SaleItem, SaleLine};
use stockroom_db::SqliteConnection;
use tracing::{debug, info};

use crate::error::ServiceResult;
use crate::service::{finish, optional, InventoryService};

const DOCUMENT: &str = "Sale";

impl InventoryService {
    /// Drafts a sale.
    ///
    /// Every line's SKU must exist and have at least the requested quantity
    /// on hand. Buy and sell prices are frozen from the current stock
    /// records. Stock is not deducted.
    ///
    /// ## Errors
    /// - `Validation` for empty / duplicate / non-positive lines
    /// - `Validation(UnknownSku)` for a SKU with no stock record
    /// - `Validation(InsufficientStock)` when a line exceeds stock on hand
    /// - `Validation(DuplicateDocument)` when the invoice id is taken
    pub async fn create_sale(
        &self,
        invoice_id: &str,
        note: &str,
        lines: &[SaleLine],
    ) -> ServiceResult<Sale> {
        validate_document_id("invoice_id", invoice_id)?;
        validate_sale_lines(lines)?;

        let mut tx = self.db.begin().await?;
        let result = self.create_sale_in(&mut tx, invoice_id, note, lines).await;
        let sale = finish(tx, "create_sale", result).await?;

        info!(
            invoice_id = %sale.invoice_id,
            items = sale.items.len(),
            quantity = ?sale.total_quantity(),
            "Sale drafted"
        );
        Ok(sale)
    }

    async fn create_sale_in(
        &self,
        conn: &mut SqliteConnection,
        invoice_id: &str,
        note: &str,
        lines: &[SaleLine],
    ) -> ServiceResult<Sale> {
        if optional(self.sales.find_by_id_in(conn, invoice_id).await)?.is_some() {
            return Err(CoreError::DuplicateDocument {
                document: DOCUMENT,
                id: invoice_id.to_string(),
            }
            .into());
        }

        let mut sale = Sale::new(invoice_id, Utc::now(), note);
        for line in lines {
            let stock = self.require_stock_in(conn, &line.sku).await?;
            if !stock.has_available(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    sku: stock.sku,
                    available: stock.quantity,
                    requested: line.quantity,
                }
                .into());
            }
            sale.add_item(SaleItem::from_stock(&stock, line.quantity))?;
        }

        Ok(self.sales.insert_in(conn, &sale).await?)
    }

    /// Returns a sale with its lines. `NotFound` when absent.
    pub async fn get_sale(&self, invoice_id: &str) -> ServiceResult<Sale> {
        debug!(invoice_id = %invoice_id, "get_sale");
        Ok(self.sales.find_by_id(invoice_id).await?)
    }

    /// Moves a sale to `status`.
    ///
    /// ## Transitions
    /// ```text
    /// Draft    → Draft     saved, no stock effect
    /// Draft    → Canceled  saved, no stock effect
    /// Draft    → Done      stock deducted for every line, all or nothing
    /// Done     → Done      no-op
    /// Canceled → Canceled  no-op
    /// anything else        Validation(InvalidStatusTransition)
    /// ```
    ///
    /// ## Errors
    /// - `NotFound` when the invoice does not exist
    /// - `Validation(InsufficientStock)` when any line is short at the
    ///   moment of finalization; no stock or sale change is kept
    pub async fn update_sale(&self, invoice_id: &str, status: DocumentStatus) -> ServiceResult<Sale> {
        validate_document_id("invoice_id", invoice_id)?;

        let mut tx = self.db.begin().await?;
        let result = self.update_sale_in(&mut tx, invoice_id, status).await;
        let sale = finish(tx, "update_sale", result).await?;

        info!(invoice_id = %sale.invoice_id, status = %sale.status, "Sale updated");
        Ok(sale)
    }

    async fn update_sale_in(
        &self,
        conn: &mut SqliteConnection,
        invoice_id: &str,
        status: DocumentStatus,
    ) -> ServiceResult<Sale> {
        let mut sale = self.sales.find_by_id_in(conn, invoice_id).await?;
        let current = sale.status;

        if !current.can_transition_to(status) {
            return Err(CoreError::InvalidStatusTransition {
                document: DOCUMENT,
                id: sale.invoice_id,
                from: current,
                to: status,
            }
            .into());
        }

        if current.is_terminal() {
            debug!(invoice_id = %invoice_id, %status, "Sale already in requested status");
            return Ok(sale);
        }

        if status == DocumentStatus::Done {
            for item in sale.items.values() {
                let mut stock = self.require_stock_in(conn, &item.sku).await?;
                if !stock.has_available(item.quantity) {
                    return Err(CoreError::InsufficientStock {
                        sku: stock.sku,
                        available: stock.quantity,
                        requested: item.quantity,
                    }
                    .into());
                }

                stock.quantity -= item.quantity;
                self.stock.update_in(conn, &stock).await?;
                debug!(sku = %stock.sku, remaining = stock.quantity, "Stock deducted");
            }
        }

        sale.status = status;
        Ok(self.sales.update_in(conn, &sale).await?)
    }
}
