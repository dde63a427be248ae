//! # Service Errors
//!
//! The one error type every `InventoryService` operation returns.
//!
//! ## Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbError::NotFound        ──►  ServiceError::NotFound                   │
//! │  other DbError            ──►  ServiceError::Storage                    │
//! │  CoreError                ──►  ServiceError::Validation                 │
//! │  ValidationError          ──►  ServiceError::Validation                 │
//! │                                                                         │
//! │  kind() ──► ErrorKind { NotFound | Validation | Storage }               │
//! │             for callers mapping to status codes                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Where a missing record means the *request* is wrong (an unknown SKU on a
//! new sale, an existing SKU on `add_sku`) the service rewrites the storage
//! error into a `Validation` error before returning.

use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;
use thiserror::Error;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Storage,
}

/// Errors returned by [`InventoryService`](crate::InventoryService).
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested record does not exist, or a report has nothing to cover.
    #[error("{0}")]
    NotFound(String),

    /// The request was understood but breaks a rule.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The record store failed.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl ServiceError {
    /// Coarse category for status-code mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            other => ServiceError::Storage(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Validation(CoreError::Validation(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
