//! # Report Aggregation
//!
//! Pure builders for the stock value and sales value reports. The service
//! layer fetches the records; this module does the arithmetic.
//!
//! ## Report Shapes
//! ```text
//! StockValueReport                      SalesValueReport
//! ├── date                              ├── start_date / end_date
//! ├── total_quantity   Σ quantity       ├── total_quantity   Σ line quantity
//! ├── total_amount     Σ buy × qty      ├── total_item_kind  distinct SKUs sold
//! ├── total_item_kind  distinct SKUs    ├── sale_count
//! └── items[]                           ├── turnover         Σ sell × qty
//!                                       ├── profit           Σ (sell − buy) × qty
//!                                       └── items[]          one per sale line
//! ```
//!
//! Every product and sum is checked; a total that does not fit in `i64`
//! is a `CoreError::AmountOverflow`, never a wrapped value.
//!
//! Formatting (JSON, CSV, ...) belongs to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Sale, StockItem};

// =============================================================================
// Stock Value
// =============================================================================

/// One SKU's contribution to the stock value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockValueItem {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub buy_price: Money,
    /// `buy_price × quantity`
    pub total_amount: Money,
}

/// Value of everything on hand, at buy price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockValueReport {
    /// When the report was produced.
    pub date: DateTime<Utc>,
    pub total_quantity: i64,
    pub total_amount: Money,
    pub total_item_kind: usize,
    pub items: Vec<StockValueItem>,
}

impl StockValueReport {
    /// Aggregates a stock listing.
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use stockroom_core::{Money, StockItem, StockValueReport};
    ///
    /// let stock = vec![
    ///     StockItem::new("A", "", 2, Money::from_cents(100), Money::from_cents(150)),
    ///     StockItem::new("B", "", 3, Money::from_cents(50), Money::from_cents(80)),
    /// ];
    /// let report = StockValueReport::from_stock(Utc::now(), &stock).unwrap();
    ///
    /// assert_eq!(report.total_amount.cents(), 350);
    /// assert_eq!(report.total_quantity, 5);
    /// assert_eq!(report.total_item_kind, 2);
    /// ```
    pub fn from_stock(date: DateTime<Utc>, stock: &[StockItem]) -> CoreResult<Self> {
        let mut items = Vec::with_capacity(stock.len());
        let mut total_quantity: i64 = 0;
        let mut total_amount = Money::zero();

        for item in stock {
            let amount = item
                .stock_value()
                .ok_or_else(|| overflow(format!("Stock value of {}", item.sku)))?;
            total_quantity = total_quantity
                .checked_add(item.quantity)
                .ok_or_else(|| overflow("Total stock quantity"))?;
            total_amount = total_amount
                .checked_add(amount)
                .ok_or_else(|| overflow("Total stock value"))?;

            items.push(StockValueItem {
                sku: item.sku.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                buy_price: item.buy_price,
                total_amount: amount,
            });
        }

        let kinds: BTreeSet<&str> = stock.iter().map(|item| item.sku.as_str()).collect();

        Ok(StockValueReport {
            date,
            total_quantity,
            total_amount,
            total_item_kind: kinds.len(),
            items,
        })
    }
}

fn overflow(what: impl Into<String>) -> CoreError {
    CoreError::AmountOverflow(what.into())
}

// =============================================================================
// Sales Value
// =============================================================================

/// One sale line in the sales value breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesValueItem {
    pub invoice_id: String,
    pub date: DateTime<Utc>,
    pub sku: String,
    pub quantity: i64,
    pub buy_price: Money,
    pub sell_price: Money,
    /// Line profit, `(sell_price − buy_price) × quantity`.
    pub profit: Money,
}

/// Turnover and profit of the sales in a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesValueReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_quantity: i64,
    pub total_item_kind: usize,
    pub sale_count: usize,
    pub turnover: Money,
    pub profit: Money,
    pub items: Vec<SalesValueItem>,
}

impl SalesValueReport {
    /// Aggregates the given sales. Status filtering is the caller's job.
    pub fn from_sales(
        start_date: NaiveDate,
        end_date: NaiveDate,
        sales: &[Sale],
    ) -> CoreResult<Self> {
        let mut report = SalesValueReport {
            start_date,
            end_date,
            total_quantity: 0,
            total_item_kind: 0,
            sale_count: sales.len(),
            turnover: Money::zero(),
            profit: Money::zero(),
            items: Vec::new(),
        };
        let mut kinds = BTreeSet::new();

        for sale in sales {
            for item in sale.items.values() {
                let line = || format!("Sale {} line {}", sale.invoice_id, item.sku);
                let turnover = item
                    .turnover()
                    .ok_or_else(|| overflow(format!("Turnover of {}", line())))?;
                let profit = item
                    .profit()
                    .ok_or_else(|| overflow(format!("Profit of {}", line())))?;

                report.total_quantity = report
                    .total_quantity
                    .checked_add(item.quantity)
                    .ok_or_else(|| overflow("Total sold quantity"))?;
                report.turnover = report
                    .turnover
                    .checked_add(turnover)
                    .ok_or_else(|| overflow("Total turnover"))?;
                report.profit = report
                    .profit
                    .checked_add(profit)
                    .ok_or_else(|| overflow("Total profit"))?;

                kinds.insert(item.sku.as_str());
                report.items.push(SalesValueItem {
                    invoice_id: sale.invoice_id.clone(),
                    date: sale.date,
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    buy_price: item.buy_price,
                    sell_price: item.sell_price,
                    profit,
                });
            }
        }

        report.total_item_kind = kinds.len();
        Ok(report)
    }
}
