//! # Engine Error Types
//!
//! The error taxonomy surfaced to the API layer.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  InvalidAmount / InsufficientWallet / InsufficientBalance /         │
//! │  ExceedsOutstanding / NotFound                                      │
//! │      → surfaced directly, no retry                                  │
//! │                                                                     │
//! │  StoreUnavailable                                                   │
//! │      → transaction rolled back, caller may retry                    │
//! │        (idempotency key recommended for CreateSale)                 │
//! │                                                                     │
//! │  NegativeBalance                                                    │
//! │      → fatal: the invariant layer was bypassed; abort, never clamp  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use khata_core::{LedgerError, ValidationError};
use khata_db::DbError;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Entity absent or owned by another tenant - never distinguished to
    /// the caller, so existence can't leak across the tenant boundary.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A balance rule or validation failure from the invariant layer.
    /// Carries the specific balances involved for actionable messages.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Transaction/infrastructure failure. The transaction was rolled back
    /// in full; the operation is eligible for caller-side retry.
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(String),
}

impl EngineError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether a caller-side retry can possibly succeed.
    ///
    /// Only transient store failures qualify; every other kind reports the
    /// same outcome on replay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}

/// NotFound stays NotFound; everything else from the store is a transient
/// infrastructure failure as far as callers are concerned.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => EngineError::NotFound { entity, id },
            other => EngineError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Ledger(LedgerError::Validation(err))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
