//! # Validation Module
//!
//! Input validation for Stockroom requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (CLI / HTTP)                                           │
//! │  └── Parsing: numbers, dates, status strings                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by InventoryService)                      │
//! │  ├── SKU / id format                                                    │
//! │  ├── Quantities and prices                                              │
//! │  └── One line per SKU                                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── PRIMARY KEY / UNIQUE constraints                                   │
//! │  └── CHECK (quantity >= 0)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PurchaseLine, SaleLine, SkuInput};
use crate::MAX_DOCUMENT_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_SKU_LEN: usize = 64;
const MAX_NAME_LEN: usize = 200;
const MAX_DOCUMENT_ID_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, hyphens, underscores, dots and slashes only
///
/// ```rust
/// use stockroom_core::validation::validate_sku;
///
/// assert!(validate_sku("SSI-D00791015-LL-BWH").is_ok());
/// assert!(validate_sku("SHIRT/L/RED").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    validate_identifier("sku", sku, MAX_SKU_LEN)
}

/// Validates an invoice or purchase id. Same character rules as a SKU.
pub fn validate_document_id(field: &str, id: &str) -> ValidationResult<()> {
    validate_identifier(field, id, MAX_DOCUMENT_ID_LEN)
}

fn validate_identifier(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, '-', '_', '.' and '/'".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name. Empty names are allowed.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity on a sale or purchase line (must be > 0).
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock quantity (0 is allowed, negative is not).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a price (0 is allowed, negative is not).
///
/// ```rust
/// use stockroom_core::{money::Money, validation::validate_price};
///
/// assert!(validate_price("buy_price", Money::from_cents(0)).is_ok());
/// assert!(validate_price("buy_price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates the input of `add_sku` / `update_sku`.
pub fn validate_sku_input(input: &SkuInput) -> ValidationResult<()> {
    validate_sku(&input.sku)?;
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    validate_stock_quantity(input.quantity)?;
    validate_price("buy_price", input.buy_price)?;
    validate_price("sell_price", input.sell_price)?;
    Ok(())
}

/// Validates the requested lines of a new sale.
///
/// ## Rules
/// - At least one line, at most `MAX_DOCUMENT_LINES`
/// - Every SKU well formed, every quantity positive
/// - No SKU repeated
pub fn validate_sale_lines(lines: &[SaleLine]) -> ValidationResult<()> {
    validate_line_count(lines.len())?;
    let mut seen = BTreeSet::new();
    for line in lines {
        validate_sku(&line.sku)?;
        validate_line_quantity(line.quantity)?;
        ensure_unique(&mut seen, &line.sku)?;
    }
    Ok(())
}

/// Validates the requested lines of a new purchase.
pub fn validate_purchase_lines(lines: &[PurchaseLine]) -> ValidationResult<()> {
    validate_line_count(lines.len())?;
    let mut seen = BTreeSet::new();
    for line in lines {
        validate_sku(&line.sku)?;
        validate_line_quantity(line.quantity)?;
        if let Some(price) = line.buy_price {
            validate_price("buy_price", price)?;
        }
        ensure_unique(&mut seen, &line.sku)?;
    }
    Ok(())
}

fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    if count > MAX_DOCUMENT_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_DOCUMENT_LINES as i64,
        });
    }
    Ok(())
}

fn ensure_unique<'a>(seen: &mut BTreeSet<&'a str>, sku: &'a str) -> ValidationResult<()> {
    if !seen.insert(sku) {
        return Err(ValidationError::Duplicate {
            field: "sku".to_string(),
            value: sku.to_string(),
        });
    }
    Ok(())
}

/// Validates a report date range (inclusive on both ends).
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> CoreResult<()> {
    if start > end {
        return Err(CoreError::InvalidDateRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SSI-D00791015-LL-BWH").is_ok());
        assert!(validate_sku("item_1.v2").is_ok());
        assert!(validate_sku("SHIRT/L/RED").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku("A+B").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_line_quantity(1).is_ok());
        assert!(validate_line_quantity(0).is_err());
        assert!(validate_line_quantity(-3).is_err());

        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_sku_input() {
        let ok = SkuInput::new("A", 10, Money::from_cents(100), Money::from_cents(150));
        assert!(validate_sku_input(&ok).is_ok());

        let negative = SkuInput::new("A", -1, Money::from_cents(100), Money::from_cents(150));
        assert!(validate_sku_input(&negative).is_err());

        let bad_price = SkuInput::new("A", 1, Money::from_cents(-100), Money::from_cents(150));
        assert!(validate_sku_input(&bad_price).is_err());
    }

    #[test]
    fn test_validate_sale_lines() {
        assert!(validate_sale_lines(&[SaleLine::new("A", 1), SaleLine::new("B", 2)]).is_ok());

        let err = validate_sale_lines(&[]).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));

        let err = validate_sale_lines(&[SaleLine::new("A", 1), SaleLine::new("A", 2)]).unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { ref value, .. } if value == "A"));

        assert!(validate_sale_lines(&[SaleLine::new("A", 0)]).is_err());
    }

    #[test]
    fn test_validate_purchase_lines() {
        let lines = vec![
            PurchaseLine::new("A", 5).with_buy_price(Money::from_cents(90)),
            PurchaseLine::new("B", 1),
        ];
        assert!(validate_purchase_lines(&lines).is_ok());

        let negative = vec![PurchaseLine::new("A", 5).with_buy_price(Money::from_cents(-1))];
        assert!(validate_purchase_lines(&negative).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert!(validate_date_range(jan1, jan31).is_ok());
        assert!(validate_date_range(jan1, jan1).is_ok());
        assert!(matches!(
            validate_date_range(jan31, jan1),
            Err(CoreError::InvalidDateRange { .. })
        ));
    }
}
