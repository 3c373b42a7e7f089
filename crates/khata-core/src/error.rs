//! # Error Types
//!
//! Domain-specific error types for khata-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           Error Types                               │
//! │                                                                     │
//! │  khata-core errors (this file)                                      │
//! │  ├── LedgerError      - Balance invariant violations                │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  khata-db errors (separate crate)                                   │
//! │  └── DbError          - Store operation failures                    │
//! │                                                                     │
//! │  khata-engine errors                                                │
//! │  └── EngineError      - What the API layer sees                     │
//! │                                                                     │
//! │  Flow: ValidationError → LedgerError → EngineError → caller         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every balance failure reports the balance involved, so the caller can
//!    present an actionable message ("have ₹X, need ₹Y")
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Ledger Error
// =============================================================================

/// Balance invariant violations.
///
/// These are business-rule failures surfaced directly to the caller with no
/// retry. None of them leaves any state behind: the invariant layer runs
/// before (or inside) the store transaction, and a failure aborts it whole.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A wallet-funded split needs more advance balance than the customer holds.
    ///
    /// ## When This Occurs
    /// - `FullAdvance` sale with `total > wallet`
    /// - `AdvancePlusCash` sale with `requested wallet portion > wallet`
    #[error("insufficient wallet balance: have {available}, need {required}")]
    InsufficientWallet { available: Money, required: Money },

    /// An explicit wallet debit request exceeds the balance.
    ///
    /// Distinct from [`LedgerError::InsufficientWallet`]: this is the direct
    /// `AdjustWallet(Debit)` path, not a sale split.
    #[error("wallet debit of {requested} exceeds balance {available}")]
    InsufficientBalance { available: Money, requested: Money },

    /// A payment collection exceeds the customer's outstanding dues.
    #[error("collection of {requested} exceeds outstanding dues of {outstanding}")]
    ExceedsOutstanding { outstanding: Money, requested: Money },

    /// Non-positive or malformed amount.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Money, reason: &'static str },

    /// A balance mutation would materialize a negative value.
    ///
    /// Should be unreachable given the prior checks - if hit, the invariant
    /// layer was bypassed and the operation must abort rather than clamp.
    /// This is a bug, not a user error.
    #[error("{field} balance {balance} with delta {delta} would go negative")]
    NegativeBalance {
        field: &'static str,
        balance: Money,
        delta: Money,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any balance logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// A sale needs at least one line item.
    #[error("sale must contain at least one item")]
    EmptySale,

    /// Too many line items on one sale.
    #[error("sale cannot have more than {max} items")]
    TooManyItems { max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_wallet_message() {
        let err = LedgerError::InsufficientWallet {
            available: Money::from_paise(40_000),
            required: Money::from_paise(50_000),
        };
        assert_eq!(
            err.to_string(),
            "insufficient wallet balance: have ₹400.00, need ₹500.00"
        );
    }

    #[test]
    fn test_exceeds_outstanding_message() {
        let err = LedgerError::ExceedsOutstanding {
            outstanding: Money::from_paise(100_000),
            requested: Money::from_paise(120_000),
        };
        assert_eq!(
            err.to_string(),
            "collection of ₹1200.00 exceeds outstanding dues of ₹1000.00"
        );
    }

    #[test]
    fn test_validation_converts_to_ledger_error() {
        let validation_err = ValidationError::EmptySale;
        let ledger_err: LedgerError = validation_err.into();
        assert!(matches!(ledger_err, LedgerError::Validation(_)));
    }
}
