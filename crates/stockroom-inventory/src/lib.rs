//! # stockroom-inventory: The Inventory Service
//!
//! Cross-entity operations over stock, purchases and sales. Every operation
//! that touches more than one record runs inside a single store
//! transaction and either commits completely or leaves nothing behind.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Callers (CLI, tests, an HTTP layer)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             stockroom-inventory (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   service.rs   InventoryService, stock records, tx helpers      │   │
//! │  │   sale.rs      create_sale, update_sale (finalization)          │   │
//! │  │   purchase.rs  create_purchase, update_purchase (receiving)     │   │
//! │  │   report.rs    get_all_stock_value, get_all_sales_value         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                               │                                 │
//! │       ▼                               ▼                                 │
//! │  stockroom-core (rules, reports)   stockroom-db (records, transactions) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_core::{DocumentStatus, SaleLine};
//! use stockroom_db::{Database, DbConfig};
//! use stockroom_inventory::InventoryService;
//!
//! let db = Database::new(DbConfig::new("stockroom.db")).await?;
//! let inventory = InventoryService::from_database(db);
//!
//! inventory.create_sale("INV-001", "", &[SaleLine::new("SSI-D00791015-LL-BWH", 2)]).await?;
//! inventory.update_sale("INV-001", DocumentStatus::Done).await?;
//! ```

pub mod error;
mod purchase;
mod report;
mod sale;
mod service;

#[cfg(test)]
mod test_support;

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use service::InventoryService;
