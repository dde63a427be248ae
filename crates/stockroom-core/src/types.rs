//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockItem     │   │      Sale       │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku (key)      │   │  invoice_id     │   │  purchase_id    │       │
//! │  │  name           │   │  date, status   │   │  date, status   │       │
//! │  │  quantity ≥ 0   │   │  note           │   │  note           │       │
//! │  │  buy / sell     │   │  items by SKU   │   │  items by SKU   │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │                 │
//! │                        ┌────────▼────────┐   ┌────────▼────────┐       │
//! │                        │    SaleItem     │   │  PurchaseItem   │       │
//! │                        │  buy/sell frozen│   │  buy price, note│       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Loaded-From-Storage Flag
//! Every record remembers whether it was read from the record store. The
//! repositories use it to choose between INSERT (new) and UPDATE (loaded)
//! when a record or one of its line items is saved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Document Status
// =============================================================================

/// Status of a sale or purchase.
///
/// ## State Machine
/// ```text
///            ┌──────────► Done      (stock moves)
///   Draft ───┤
///     ▲ │    └──────────► Canceled  (no stock effect)
///     └─┘
///
///   Done → Done and Canceled → Canceled are accepted as no-ops.
///   Leaving Done or Canceled is rejected.
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Document is being prepared. Stock is untouched.
    Draft,
    /// Document is finalized and its stock movement applied.
    Done,
    /// Document was abandoned.
    Canceled,
}

impl DocumentStatus {
    /// Canonical lowercase name, as stored and serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Done => "done",
            DocumentStatus::Canceled => "canceled",
        }
    }

    /// Legacy single-letter status code (`D`, `S`, `C`).
    pub const fn code(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "D",
            DocumentStatus::Done => "S",
            DocumentStatus::Canceled => "C",
        }
    }

    /// Done and Canceled cannot be left once reached.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Done | DocumentStatus::Canceled)
    }

    /// Whether a document currently in `self` may be saved with status `next`.
    ///
    /// ```rust
    /// use stockroom_core::DocumentStatus::*;
    ///
    /// assert!(Draft.can_transition_to(Done));
    /// assert!(Done.can_transition_to(Done));
    /// assert!(!Done.can_transition_to(Draft));
    /// ```
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        !self.is_terminal() || *self == next
    }

    /// All statuses, in lifecycle order.
    pub const ALL: [DocumentStatus; 3] = [
        DocumentStatus::Draft,
        DocumentStatus::Done,
        DocumentStatus::Canceled,
    ];
}

impl Default for DocumentStatus {
    fn default() -> Self {
        DocumentStatus::Draft
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical names and the legacy codes, case-insensitively.
impl FromStr for DocumentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocumentStatus::ALL
            .into_iter()
            .find(|status| {
                wanted.eq_ignore_ascii_case(status.as_str())
                    || wanted.eq_ignore_ascii_case(status.code())
            })
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: DocumentStatus::ALL
                    .iter()
                    .map(|status| status.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Stock Item
// =============================================================================

/// Stock on hand for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Stock Keeping Unit - the identity of the record.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Quantity on hand. Never negative.
    pub quantity: i64,

    /// Price paid to the supplier per unit.
    pub buy_price: Money,

    /// Price charged to the customer per unit.
    pub sell_price: Money,

    #[serde(skip)]
    loaded: bool,
}

impl StockItem {
    /// Creates a stock record that has not been persisted yet.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        quantity: i64,
        buy_price: Money,
        sell_price: Money,
    ) -> Self {
        StockItem {
            sku: sku.into(),
            name: name.into(),
            quantity,
            buy_price,
            sell_price,
            loaded: false,
        }
    }

    /// Whether this record was read from the record store.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Flags the record as read from the record store.
    pub fn mark_loaded(mut self) -> Self {
        self.loaded = true;
        self
    }

    /// Value of the stock on hand at buy price. `None` on overflow.
    #[inline]
    pub fn stock_value(&self) -> Option<Money> {
        self.buy_price.checked_mul_quantity(self.quantity)
    }

    /// Whether `quantity` units can be taken from this record.
    #[inline]
    pub fn has_available(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale line. Prices are frozen at the moment the sale is drafted so later
/// price changes on the stock record do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Storage-assigned row id, `None` until persisted.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub sku: String,
    pub quantity: i64,
    /// Buy price at time of sale.
    pub buy_price: Money,
    /// Sell price at time of sale.
    pub sell_price: Money,
    #[serde(skip)]
    loaded: bool,
}

impl SaleItem {
    /// Creates a line that will be inserted on the next save.
    pub fn new(sku: impl Into<String>, quantity: i64, buy_price: Money, sell_price: Money) -> Self {
        SaleItem {
            id: None,
            sku: sku.into(),
            quantity,
            buy_price,
            sell_price,
            loaded: false,
        }
    }

    /// Snapshots the current prices of a stock record.
    pub fn from_stock(stock: &StockItem, quantity: i64) -> Self {
        SaleItem::new(stock.sku.clone(), quantity, stock.buy_price, stock.sell_price)
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Flags the line as read from storage under row `id`.
    pub fn mark_loaded(mut self, id: i64) -> Self {
        self.id = Some(id);
        self.loaded = true;
        self
    }

    /// `sell_price × quantity`, `None` on overflow.
    #[inline]
    pub fn turnover(&self) -> Option<Money> {
        self.sell_price.checked_mul_quantity(self.quantity)
    }

    /// `(sell_price − buy_price) × quantity`, `None` on overflow.
    #[inline]
    pub fn profit(&self) -> Option<Money> {
        self.sell_price
            .checked_sub(self.buy_price)?
            .checked_mul_quantity(self.quantity)
    }
}

/// A sale document. At most one line per SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub invoice_id: String,
    pub date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub note: String,
    /// Line items keyed by SKU.
    pub items: BTreeMap<String, SaleItem>,
    #[serde(skip)]
    loaded: bool,
}

impl Sale {
    /// Creates an empty draft sale.
    pub fn new(invoice_id: impl Into<String>, date: DateTime<Utc>, note: impl Into<String>) -> Self {
        Sale {
            invoice_id: invoice_id.into(),
            date,
            status: DocumentStatus::Draft,
            note: note.into(),
            items: BTreeMap::new(),
            loaded: false,
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(mut self) -> Self {
        self.loaded = true;
        self
    }

    /// Adds a line, rejecting a second line for the same SKU.
    pub fn add_item(&mut self, item: SaleItem) -> Result<(), ValidationError> {
        if self.items.contains_key(&item.sku) {
            return Err(ValidationError::Duplicate {
                field: "sku".to_string(),
                value: item.sku,
            });
        }
        self.items.insert(item.sku.clone(), item);
        Ok(())
    }

    /// Total units across all lines. `None` on overflow.
    pub fn total_quantity(&self) -> Option<i64> {
        self.items
            .values()
            .try_fold(0i64, |acc, item| acc.checked_add(item.quantity))
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A purchase line: units received from a supplier at a buy price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub sku: String,
    pub quantity: i64,
    pub buy_price: Money,
    pub note: String,
    #[serde(skip)]
    loaded: bool,
}

impl PurchaseItem {
    pub fn new(
        sku: impl Into<String>,
        quantity: i64,
        buy_price: Money,
        note: impl Into<String>,
    ) -> Self {
        PurchaseItem {
            id: None,
            sku: sku.into(),
            quantity,
            buy_price,
            note: note.into(),
            loaded: false,
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(mut self, id: i64) -> Self {
        self.id = Some(id);
        self.loaded = true;
        self
    }

    /// `buy_price × quantity`, `None` on overflow.
    #[inline]
    pub fn total(&self) -> Option<Money> {
        self.buy_price.checked_mul_quantity(self.quantity)
    }
}

/// A purchase document. At most one line per SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub purchase_id: String,
    pub date: DateTime<Utc>,
    pub status: DocumentStatus,
    pub note: String,
    pub items: BTreeMap<String, PurchaseItem>,
    #[serde(skip)]
    loaded: bool,
}

impl Purchase {
    pub fn new(purchase_id: impl Into<String>, date: DateTime<Utc>, note: impl Into<String>) -> Self {
        Purchase {
            purchase_id: purchase_id.into(),
            date,
            status: DocumentStatus::Draft,
            note: note.into(),
            items: BTreeMap::new(),
            loaded: false,
        }
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn mark_loaded(mut self) -> Self {
        self.loaded = true;
        self
    }

    pub fn add_item(&mut self, item: PurchaseItem) -> Result<(), ValidationError> {
        if self.items.contains_key(&item.sku) {
            return Err(ValidationError::Duplicate {
                field: "sku".to_string(),
                value: item.sku,
            });
        }
        self.items.insert(item.sku.clone(), item);
        Ok(())
    }

    /// Total cost of the purchase. `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.items
            .values()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.total()?))
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Requested line of a new sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub sku: String,
    pub quantity: i64,
}

impl SaleLine {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        SaleLine {
            sku: sku.into(),
            quantity,
        }
    }
}

/// Requested line of a new purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub sku: String,
    pub quantity: i64,
    /// Unit cost; the SKU's current buy price when absent.
    #[serde(default)]
    pub buy_price: Option<Money>,
    #[serde(default)]
    pub note: String,
}

impl PurchaseLine {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        PurchaseLine {
            sku: sku.into(),
            quantity,
            buy_price: None,
            note: String::new(),
        }
    }

    pub fn with_buy_price(mut self, buy_price: Money) -> Self {
        self.buy_price = Some(buy_price);
        self
    }
}

/// Input for adding or overwriting a SKU's stock record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuInput {
    pub sku: String,
    /// Display name. Left unchanged on update when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: i64,
    pub buy_price: Money,
    pub sell_price: Money,
}

impl SkuInput {
    pub fn new(sku: impl Into<String>, quantity: i64, buy_price: Money, sell_price: Money) -> Self {
        SkuInput {
            sku: sku.into(),
            name: None,
            quantity,
            buy_price,
            sell_price,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("done".parse::<DocumentStatus>().unwrap(), DocumentStatus::Done);
        assert_eq!("S".parse::<DocumentStatus>().unwrap(), DocumentStatus::Done);
        assert_eq!(" Draft ".parse::<DocumentStatus>().unwrap(), DocumentStatus::Draft);
        assert_eq!("c".parse::<DocumentStatus>().unwrap(), DocumentStatus::Canceled);
        assert!("shipped".parse::<DocumentStatus>().is_err());
        assert!("".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn test_status_transitions() {
        use DocumentStatus::*;

        for next in DocumentStatus::ALL {
            assert!(Draft.can_transition_to(next));
        }
        assert!(Done.can_transition_to(Done));
        assert!(!Done.can_transition_to(Draft));
        assert!(!Done.can_transition_to(Canceled));
        assert!(Canceled.can_transition_to(Canceled));
        assert!(!Canceled.can_transition_to(Done));
    }

    #[test]
    fn test_status_default_and_display() {
        assert_eq!(DocumentStatus::default(), DocumentStatus::Draft);
        assert_eq!(DocumentStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn test_sale_rejects_duplicate_sku() {
        let mut sale = Sale::new("INV1", Utc::now(), "");
        let line = SaleItem::new("A", 1, Money::from_cents(100), Money::from_cents(150));

        sale.add_item(line.clone()).unwrap();
        let err = sale.add_item(line).unwrap_err();

        assert!(matches!(err, ValidationError::Duplicate { .. }));
        assert_eq!(sale.items.len(), 1);
    }

    #[test]
    fn test_sale_item_snapshot_and_profit() {
        let stock = StockItem::new("A", "Item A", 5, Money::from_cents(100), Money::from_cents(150));
        let item = SaleItem::from_stock(&stock, 3);

        assert_eq!(item.buy_price, stock.buy_price);
        assert_eq!(item.sell_price, stock.sell_price);
        assert_eq!(item.turnover(), Some(Money::from_cents(450)));
        assert_eq!(item.profit(), Some(Money::from_cents(150)));
        assert!(!item.is_loaded());
    }

    #[test]
    fn test_loaded_flag() {
        let stock = StockItem::new("A", "", 1, Money::zero(), Money::zero());
        assert!(!stock.is_loaded());
        assert!(stock.mark_loaded().is_loaded());

        let item = PurchaseItem::new("A", 2, Money::from_cents(10), "").mark_loaded(7);
        assert_eq!(item.id, Some(7));
        assert!(item.is_loaded());
    }

    #[test]
    fn test_purchase_total() {
        let mut purchase = Purchase::new("PO-1", Utc::now(), "restock");
        purchase
            .add_item(PurchaseItem::new("A", 10, Money::from_cents(100), ""))
            .unwrap();
        purchase
            .add_item(PurchaseItem::new("B", 2, Money::from_cents(250), ""))
            .unwrap();

        assert_eq!(purchase.total(), Some(Money::from_cents(1500)));
    }

    #[test]
    fn test_line_amounts_report_overflow() {
        let stock = StockItem::new(
            "A",
            "",
            i64::MAX / 2 + 1,
            Money::from_cents(2),
            Money::from_cents(3),
        );
        assert_eq!(stock.stock_value(), None);

        let item = SaleItem::new(
            "A",
            5_000_000_000,
            Money::from_cents(1),
            Money::from_cents(4_000_000_000),
        );
        assert_eq!(item.turnover(), None);
        assert_eq!(item.profit(), None);

        let mut purchase = Purchase::new("PO-1", Utc::now(), "");
        purchase
            .add_item(PurchaseItem::new("A", i64::MAX, Money::from_cents(2), ""))
            .unwrap();
        assert_eq!(purchase.total(), None);
    }
}
