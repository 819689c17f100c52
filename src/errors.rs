//! Unified error type for the ledger and its collaborators.
//!
//! Every failure aborts the whole operation. `Database` is the only variant for
//! which the operation is known to have had no effect *and* a blind retry can
//! succeed; all other variants describe a request that will fail again unchanged.

use crate::entities::CompletionStatus;
use sea_orm::DbErr;
use thiserror::Error;

/// Errors returned by every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Task completion {completion_id} was already {status}")]
    AlreadyProcessed {
        completion_id: i64,
        status: CompletionStatus,
    },

    #[error("Invalid point amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: i64 },

    #[error("Insufficient points: have {current}, need {required}")]
    InsufficientPoints { current: i64, required: i64 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Storage transaction failed: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the caller may retry the identical request.
    ///
    /// Storage failures roll back completely, so replaying is safe. Anything
    /// else is a property of the request itself.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
