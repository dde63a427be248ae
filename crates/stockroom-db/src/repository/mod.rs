//! # Repository Module
//!
//! Record store accessors for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  InventoryService                                                       │
//! │       │                                                                 │
//! │       │  stock.find_by_sku_in(&mut tx, "A-1")                           │
//! │       ▼                                                                 │
//! │  StockRepository / PurchaseRepository / SaleRepository                  │
//! │  ├── find_by_*   → record | DbError::NotFound                           │
//! │  ├── find_all    → ordered list                                         │
//! │  ├── insert      → fails on duplicate identity                          │
//! │  ├── update      → fails with NotFound when absent                      │
//! │  ├── delete      → fails with NotFound when absent                      │
//! │  └── save        → insert or update by the loaded flag                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`StockRepository`](stock::StockRepository) - Stock on hand by SKU
//! - [`PurchaseRepository`](purchase::PurchaseRepository) - Purchases and purchase lines
//! - [`SaleRepository`](sale::SaleRepository) - Sales and sale lines

pub mod purchase;
pub mod sale;
pub mod stock;
