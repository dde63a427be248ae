//! # Subcommands
//!
//! One subcommand per service operation. Every run prints a single JSON
//! envelope on stdout:
//!
//! ```text
//! success  { "code": "S", "message": "Inquiry successful", "data": { ... } }
//! failure  { "code": "F", "message": "Error: ...",         "data": { "code": "NOT_FOUND" } }
//! ```
//!
//! Line arguments are `SKU:QTY` for sales and `SKU:QTY[:BUY_CENTS]` for
//! purchases. Prices are integer cents. Dates are `YYYY-MM-DD`.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use stockroom_core::{DocumentStatus, Money, PurchaseLine, SaleLine, SkuInput};
use stockroom_inventory::InventoryService;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

pub const CODE_SUCCESSFUL: &str = "S";
pub const CODE_FAILED: &str = "F";

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the stock record of one SKU
    Item { sku: String },

    /// Register a new SKU
    AddSku(SkuArgs),

    /// Overwrite quantity and prices of an existing SKU
    UpdateSku(SkuArgs),

    /// Draft a sale (stock is checked, not moved)
    CreateSale {
        /// Invoice number; generated when omitted
        #[arg(long)]
        invoice_id: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
        /// SKU:QTY
        #[arg(required = true, value_parser = parse_sale_line)]
        lines: Vec<SaleLine>,
    },

    /// Move a sale to draft, done or canceled
    UpdateSale {
        invoice_id: String,
        #[arg(value_parser = parse_status)]
        status: DocumentStatus,
    },

    /// Draft a purchase
    CreatePurchase {
        /// Purchase number; generated when omitted
        #[arg(long)]
        purchase_id: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
        /// SKU:QTY[:BUY_CENTS]
        #[arg(required = true, value_parser = parse_purchase_line)]
        lines: Vec<PurchaseLine>,
    },

    /// Move a purchase to draft, done or canceled
    UpdatePurchase {
        purchase_id: String,
        #[arg(value_parser = parse_status)]
        status: DocumentStatus,
    },

    /// Value of all stock on hand at buy price
    StockValue,

    /// Turnover and profit of done sales, both dates included
    SalesValue {
        #[arg(value_parser = parse_date)]
        start: NaiveDate,
        #[arg(value_parser = parse_date)]
        end: NaiveDate,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SkuArgs {
    pub sku: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub quantity: i64,
    /// Unit cost in cents
    #[arg(long)]
    pub buy_price: i64,
    /// Unit price in cents
    #[arg(long)]
    pub sell_price: i64,
}

impl From<SkuArgs> for SkuInput {
    fn from(args: SkuArgs) -> Self {
        let input = SkuInput::new(
            args.sku,
            args.quantity,
            Money::from_cents(args.buy_price),
            Money::from_cents(args.sell_price),
        );
        match args.name {
            Some(name) => input.named(name),
            None => input,
        }
    }
}

// =============================================================================
// Response Envelope
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub code: &'static str,
    pub message: String,
    pub data: Value,
}

impl Response {
    fn success(message: &str, data: impl Serialize) -> Result<Self, ApiError> {
        let data = serde_json::to_value(data)
            .map_err(|e| ApiError::internal(format!("JSON encoding failed: {}", e)))?;
        Ok(Response {
            code: CODE_SUCCESSFUL,
            message: message.to_string(),
            data,
        })
    }

    fn failure(err: ApiError) -> Self {
        Response {
            code: CODE_FAILED,
            message: format!("Error: {}", err.message),
            data: json!({ "code": err.code }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESSFUL
    }
}

/// Runs one subcommand against the service.
pub async fn run(service: &InventoryService, command: Command) -> Response {
    match dispatch(service, command).await {
        Ok(response) => response,
        Err(err) => Response::failure(err),
    }
}

async fn dispatch(service: &InventoryService, command: Command) -> Result<Response, ApiError> {
    debug!(?command, "dispatch");

    match command {
        Command::Item { sku } => {
            let item = service.get_item_info(&sku).await?;
            Response::success("Inquiry successful", item)
        }
        Command::AddSku(args) => {
            let item = service.add_sku(args.into()).await?;
            Response::success("Addition successful", item)
        }
        Command::UpdateSku(args) => {
            let item = service.update_sku(args.into()).await?;
            Response::success("Update successful", item)
        }
        Command::CreateSale {
            invoice_id,
            note,
            lines,
        } => {
            let invoice_id = invoice_id.unwrap_or_else(|| generate_id("INV"));
            let sale = service.create_sale(&invoice_id, &note, &lines).await?;
            Response::success("Sale created successfully", sale)
        }
        Command::UpdateSale { invoice_id, status } => {
            let sale = service.update_sale(&invoice_id, status).await?;
            Response::success("Update successful", sale)
        }
        Command::CreatePurchase {
            purchase_id,
            note,
            lines,
        } => {
            let purchase_id = purchase_id.unwrap_or_else(|| generate_id("PO"));
            let purchase = service
                .create_purchase(&purchase_id, &note, &lines)
                .await?;
            Response::success("Purchase created successfully", purchase)
        }
        Command::UpdatePurchase {
            purchase_id,
            status,
        } => {
            let purchase = service.update_purchase(&purchase_id, status).await?;
            Response::success("Update successful", purchase)
        }
        Command::StockValue => {
            let report = service.get_all_stock_value().await?;
            Response::success("Inquiry successful", report)
        }
        Command::SalesValue { start, end } => {
            let report = service.get_all_sales_value(start, end).await?;
            Response::success("Inquiry successful", report)
        }
    }
}

/// `INV-1a2b3c4d5e6f`
fn generate_id(prefix: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &simple[..12])
}

// =============================================================================
// Argument Parsers
// =============================================================================

fn parse_quantity(sku: &str, raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid quantity '{}' for {}", raw, sku))
}

pub fn parse_sale_line(raw: &str) -> Result<SaleLine, String> {
    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [sku, qty] if !sku.trim().is_empty() => {
            Ok(SaleLine::new(sku.trim(), parse_quantity(sku, qty)?))
        }
        _ => Err(format!("expected SKU:QTY, got '{}'", raw)),
    }
}

pub fn parse_purchase_line(raw: &str) -> Result<PurchaseLine, String> {
    match raw.split(':').collect::<Vec<_>>().as_slice() {
        [sku, qty] if !sku.trim().is_empty() => {
            Ok(PurchaseLine::new(sku.trim(), parse_quantity(sku, qty)?))
        }
        [sku, qty, buy] if !sku.trim().is_empty() => {
            let cents: i64 = buy
                .trim()
                .parse()
                .map_err(|_| format!("invalid buy price '{}' for {}", buy, sku))?;
            Ok(PurchaseLine::new(sku.trim(), parse_quantity(sku, qty)?)
                .with_buy_price(Money::from_cents(cents)))
        }
        _ => Err(format!("expected SKU:QTY[:BUY_CENTS], got '{}'", raw)),
    }
}

pub fn parse_status(raw: &str) -> Result<DocumentStatus, String> {
    raw.parse().map_err(|e: stockroom_core::ValidationError| e.to_string())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use stockroom_db::{Database, DbConfig};

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    fn parse(args: &[&str]) -> Command {
        let mut argv = vec!["stockroom"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().command
    }

    async fn service() -> InventoryService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        InventoryService::from_database(db)
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(parse_sale_line("A:3").unwrap(), SaleLine::new("A", 3));
        assert!(parse_sale_line("A").is_err());
        assert!(parse_sale_line("A:x").is_err());
        assert!(parse_sale_line(":3").is_err());

        let line = parse_purchase_line("B:5:120").unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(line.buy_price, Some(Money::from_cents(120)));
        assert_eq!(parse_purchase_line("B:5").unwrap().buy_price, None);
        assert!(parse_purchase_line("B:5:1:2").is_err());
    }

    #[test]
    fn test_parse_status_and_date() {
        assert_eq!(parse_status("done").unwrap(), DocumentStatus::Done);
        assert_eq!(parse_status("S").unwrap(), DocumentStatus::Done);
        assert!(parse_status("shipped").is_err());

        assert_eq!(
            parse_date("2024-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_date("01/03/2024").is_err());
    }

    #[test]
    fn test_clap_subcommands() {
        match parse(&["create-sale", "--invoice-id", "INV1", "A:1", "B:2"]) {
            Command::CreateSale {
                invoice_id, lines, ..
            } => {
                assert_eq!(invoice_id.as_deref(), Some("INV1"));
                assert_eq!(lines.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            parse(&["sales-value", "2024-03-01", "2024-03-31"]),
            Command::SalesValue { .. }
        ));
        assert!(TestCli::try_parse_from(["stockroom", "create-sale"]).is_err());
    }

    #[test]
    fn test_generated_ids() {
        let id = generate_id("INV");
        assert!(id.starts_with("INV-"));
        assert_eq!(id.len(), 16);
        assert_ne!(id, generate_id("INV"));
    }

    #[tokio::test]
    async fn test_sale_flow_envelopes() {
        let svc = service().await;

        let added = run(
            &svc,
            parse(&[
                "add-sku", "A", "--quantity", "5", "--buy-price", "100", "--sell-price", "150",
            ]),
        )
        .await;
        assert!(added.is_success());
        assert_eq!(added.message, "Addition successful");
        assert_eq!(added.data["quantity"], 5);

        let created = run(&svc, parse(&["create-sale", "--invoice-id", "INV1", "A:2"])).await;
        assert!(created.is_success());
        assert_eq!(created.data["status"], "draft");

        let done = run(&svc, parse(&["update-sale", "INV1", "done"])).await;
        assert!(done.is_success());

        let item = run(&svc, parse(&["item", "A"])).await;
        assert_eq!(item.data["quantity"], 3);

        let value = run(&svc, parse(&["stock-value"])).await;
        assert_eq!(value.data["total_amount"], 300);
    }

    #[tokio::test]
    async fn test_failure_envelope() {
        let svc = service().await;

        let missing = run(&svc, parse(&["item", "GHOST"])).await;
        assert!(!missing.is_success());
        assert_eq!(missing.code, "F");
        assert!(missing.message.starts_with("Error: "));
        assert_eq!(missing.data["code"], "NOT_FOUND");

        let range = run(&svc, parse(&["sales-value", "2024-03-05", "2024-03-01"])).await;
        assert_eq!(range.data["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generated_invoice_id() {
        let svc = service().await;
        run(
            &svc,
            parse(&[
                "add-sku", "A", "--quantity", "5", "--buy-price", "100", "--sell-price", "150",
            ]),
        )
        .await;

        let created = run(&svc, parse(&["create-sale", "A:1"])).await;
        assert!(created.is_success());
        assert!(created.data["invoice_id"].as_str().unwrap().starts_with("INV-"));
    }
}
