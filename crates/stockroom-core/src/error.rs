//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                      │
//! │  ├── CoreError        - Domain rule violations                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  stockroom-db errors (separate crate)                                   │
//! │  └── DbError          - Record store failures (NotFound, ...)           │
//! │                                                                         │
//! │  stockroom-inventory errors                                             │
//! │  └── ServiceError     - NotFound | Validation | Storage                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::DocumentStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations.
///
/// Every variant here is a "the request was understood but is not allowed"
/// failure. Missing records and storage failures live in other layers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale or purchase references a SKU that is not in stock records.
    #[error("SKU {0} is not a valid item")]
    UnknownSku(String),

    /// A SKU being added already exists.
    #[error("SKU {0} already exists")]
    SkuExists(String),

    /// Not enough stock on hand to satisfy a line item.
    ///
    /// ## When This Occurs
    /// ```text
    /// create_sale(A × 3)  with stock A = 2      → rejected up front
    /// update_sale(Done)   with stock A now = 1  → rejected, rolled back
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A sale or purchase with this identifier already exists.
    #[error("{document} {id} already exists")]
    DuplicateDocument { document: &'static str, id: String },

    /// The requested status change is not allowed from the current status.
    #[error("{document} {id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        document: &'static str,
        id: String,
        from: DocumentStatus,
        to: DocumentStatus,
    },

    /// Report range where the start date is after the end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// A money or quantity total does not fit in 64 bits.
    #[error("{0} is too large to compute")]
    AmountOverflow(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any record is read or written.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The same value appears twice where it must be unique.
    #[error("{field} '{value}' appears more than once")]
    Duplicate { field: String, value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
