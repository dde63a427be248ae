//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! This crate holds the inventory domain as plain data and pure functions.
//! Nothing in here touches a database, a socket or the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Callers (CLI, HTTP layer, tests)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          stockroom-inventory (InventoryService)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stockroom-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │ StockItem │  │   Money   │  │ StockValue│  │   rules   │  │   │
//! │  │   │   Sale    │  │           │  │ SalesValue│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockroom-db (Record Store)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockItem, Sale, Purchase, DocumentStatus)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`report`] - Stock value and sales value aggregation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::{Money, StockItem};
//!
//! let item = StockItem::new("SSI-D00791015-LL-BWH", "Zalekia Plain Casual Blouse", 10,
//!     Money::from_cents(55_000_00), Money::from_cents(60_000_00));
//!
//! assert_eq!(item.stock_value(), Some(Money::from_cents(550_000_00)));
//! ```

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use report::{SalesValueItem, SalesValueReport, StockValueItem, StockValueReport};
pub use types::*;

/// Maximum number of line items accepted on a single sale or purchase.
pub const MAX_DOCUMENT_LINES: usize = 200;
