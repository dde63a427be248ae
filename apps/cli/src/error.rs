//! # API Error Type
//!
//! The failure half of the CLI response envelope.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Subcommand                                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InventoryService ── ServiceError::NotFound ─────► NOT_FOUND            │
//! │       │            ── Validation(InsufficientStock) ► INSUFFICIENT_STOCK│
//! │       │            ── Validation(InvalidStatusTransition) ► BUSINESS_LOGIC
//! │       │            ── Validation(..) ──────────────► VALIDATION_ERROR   │
//! │       │            ── Storage(..) ─────────────────► DATABASE_ERROR     │
//! │       ▼                                                                 │
//! │  { "code": "F", "message": "Error: ...", "data": { "code": ... } }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use stockroom_core::CoreError;
use stockroom_inventory::ServiceError;

/// Error returned from a subcommand.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Stock not found: SSI-D00791015-LL-BWH"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found, or nothing to report (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Database operation failed (500)
    DatabaseError,

    /// Status transition not allowed (422)
    BusinessLogic,

    /// Insufficient stock
    InsufficientStock,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ApiError::new(ErrorCode::NotFound, message),
            ServiceError::Validation(core) => ApiError::from(core),
            ServiceError::Storage(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InvalidStatusTransition { .. } => ErrorCode::BusinessLogic,
            _ => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
