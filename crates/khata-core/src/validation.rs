//! # Validation Module
//!
//! Input validation for engine requests, run before any balance logic.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Validation Layers                            │
//! │                                                                     │
//! │  Layer 1: Engine entry point (Rust)                                 │
//! │  └── THIS MODULE: shape and range checks                            │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Balance invariant layer                                   │
//! │  └── split rules, wallet/dues delta guards                          │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Store (SQLite)                                            │
//! │  └── CHECK constraints, foreign keys                                │
//! │                                                                     │
//! │  Defense in depth: each layer catches a different class of error    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::money::Money;
use crate::types::SaleItemDraft;
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LEN, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates that an operation amount is strictly positive.
///
/// Used by payment collection and wallet adjustment; a zero or negative
/// amount is rejected as [`LedgerError::InvalidAmount`] before any balance
/// is read, the same kind `split_payment` reports for a bad total.
pub fn validate_positive_amount(amount: Money, reason: &'static str) -> LedgerResult<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidAmount { amount, reason });
    }
    Ok(())
}

// =============================================================================
// Name Validators
// =============================================================================

/// Validates a customer or item name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_NAME_LEN`] characters
pub fn validate_name(name: &str, field: &'static str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required { field });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Sale Item Validators
// =============================================================================

/// Validates the line items of a sale-creation request.
///
/// ## Rules
/// - At least one item, at most [`MAX_SALE_ITEMS`]
/// - Every quantity in `1..=MAX_ITEM_QUANTITY`
/// - Every unit price strictly positive
/// - Every name non-empty
pub fn validate_sale_items(items: &[SaleItemDraft]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::EmptySale);
    }

    if items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::TooManyItems {
            max: MAX_SALE_ITEMS,
        });
    }

    for item in items {
        validate_name(&item.name, "item name")?;

        if item.quantity <= 0 || item.quantity > MAX_ITEM_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if !item.unit_price_paise.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "unit price",
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
