//! # Payment Splits and Balance Guards
//!
//! The balance invariant layer: pure, side-effect-free functions that every
//! balance mutation in the engine must pass through.
//!
//! ## Split Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  payment_type     cash_paid        wallet_used       due_amount     │
//! │  ─────────────    ─────────────    ──────────────    ────────────   │
//! │  Cash             total            0                 0              │
//! │  Credit           0                0                 total          │
//! │  DuesPlusCash     min(req, total)  0                 total - cash   │
//! │  AdvancePlusCash  total - wallet   min(req, total)*  0              │
//! │  FullAdvance      0                total*            0              │
//! │                                                                     │
//! │  * fails InsufficientWallet when it exceeds the current wallet      │
//! │                                                                     │
//! │  GUARANTEE: cash_paid + wallet_used + due_amount == total, exactly  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delta Guards
//! - [`apply_wallet_delta`] refuses any result below zero.
//! - [`apply_dues_delta`] clamps at the zero floor **only** for reversals of
//!   a recorded due; forward accrual never clamps.
//!
//! No function here touches a database. If a split or delta is rejected,
//! the enclosing transaction aborts with nothing written.

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;
use crate::types::{PaymentType, SaleStatus};

// =============================================================================
// Payment Split
// =============================================================================

/// The three-way split of a sale's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSplit {
    pub cash_paid: Money,
    pub wallet_used: Money,
    pub due_amount: Money,
}

impl PaymentSplit {
    /// Settlement status implied by this split.
    pub fn status(&self, total: Money) -> SaleStatus {
        if self.due_amount.is_zero() {
            SaleStatus::Paid
        } else if self.due_amount == total {
            SaleStatus::Due
        } else {
            SaleStatus::PartiallyDue
        }
    }
}

/// Computes the payment-type-driven split of `total` across cash, wallet,
/// and dues.
///
/// ## Arguments
/// * `payment_type` - the rule set to apply
/// * `total` - the sale total; must be positive
/// * `requested` - the caller-tendered cash (`DuesPlusCash`) or wallet
///   portion (`AdvancePlusCash`); ignored by the other types
/// * `wallet` - the customer's current wallet balance
///
/// ## Errors
/// * [`LedgerError::InvalidAmount`] - non-positive total, or negative
///   requested amount
/// * [`LedgerError::InsufficientWallet`] - a wallet-funded type needs more
///   than `wallet`, reported with the shortfall
///
/// ## Example
/// ```rust
/// use khata_core::{split_payment, Money, PaymentType};
///
/// let split = split_payment(
///     PaymentType::AdvancePlusCash,
///     Money::from_paise(60_000),
///     Money::from_paise(60_000),
///     Money::from_paise(100_000),
/// ).unwrap();
/// assert_eq!(split.wallet_used.paise(), 60_000);
/// assert_eq!(split.cash_paid.paise(), 0);
/// ```
pub fn split_payment(
    payment_type: PaymentType,
    total: Money,
    requested: Money,
    wallet: Money,
) -> LedgerResult<PaymentSplit> {
    if !total.is_positive() {
        return Err(LedgerError::InvalidAmount {
            amount: total,
            reason: "sale total must be positive",
        });
    }
    if requested.is_negative() {
        return Err(LedgerError::InvalidAmount {
            amount: requested,
            reason: "requested amount cannot be negative",
        });
    }

    let split = match payment_type {
        PaymentType::Cash => PaymentSplit {
            cash_paid: total,
            wallet_used: Money::zero(),
            due_amount: Money::zero(),
        },

        PaymentType::Credit => PaymentSplit {
            cash_paid: Money::zero(),
            wallet_used: Money::zero(),
            due_amount: total,
        },

        PaymentType::DuesPlusCash => {
            // Cash is capped at the total so the three-way sum holds even
            // when the counter tenders more than the bill.
            let cash_paid = requested.min(total);
            PaymentSplit {
                cash_paid,
                wallet_used: Money::zero(),
                due_amount: total - cash_paid,
            }
        }

        PaymentType::AdvancePlusCash => {
            let wallet_used = requested.min(total);
            if wallet_used > wallet {
                return Err(LedgerError::InsufficientWallet {
                    available: wallet,
                    required: wallet_used,
                });
            }
            PaymentSplit {
                cash_paid: total - wallet_used,
                wallet_used,
                due_amount: Money::zero(),
            }
        }

        PaymentType::FullAdvance => {
            if total > wallet {
                return Err(LedgerError::InsufficientWallet {
                    available: wallet,
                    required: total,
                });
            }
            PaymentSplit {
                cash_paid: Money::zero(),
                wallet_used: total,
                due_amount: Money::zero(),
            }
        }
    };

    debug_assert_eq!(
        split.cash_paid + split.wallet_used + split.due_amount,
        total
    );

    Ok(split)
}

// =============================================================================
// Wallet Delta
// =============================================================================

/// Applies a signed delta to a wallet balance.
///
/// ## Errors
/// [`LedgerError::NegativeBalance`] if the result would drop below zero.
/// The wallet never clamps: a debit that cannot be covered is a bug in the
/// caller (the split and adjust paths check before they get here).
pub fn apply_wallet_delta(balance: Money, delta: Money) -> LedgerResult<Money> {
    let next = balance + delta;
    if next.is_negative() {
        return Err(LedgerError::NegativeBalance {
            field: "wallet",
            balance,
            delta,
        });
    }
    Ok(next)
}

// =============================================================================
// Dues Delta
// =============================================================================

/// How a dues balance is being adjusted.
///
/// The distinction matters: forward accrual must never start from (or land
/// on) a negative balance, while reversal of a recorded due clamps at the
/// zero floor because a later collection may already have consumed part of
/// that due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuesAdjustment {
    /// New dues from a sale: added unconditionally, never clamped.
    Accrual(Money),
    /// Unwinding a recorded due (sale deletion): clamped at zero.
    Reversal(Money),
}

/// Applies a dues adjustment to a dues balance.
///
/// ## Errors
/// [`LedgerError::NegativeBalance`] if the starting balance is negative
/// (the invariant layer was bypassed somewhere) or an accrual amount is
/// negative.
pub fn apply_dues_delta(balance: Money, adjustment: DuesAdjustment) -> LedgerResult<Money> {
    if balance.is_negative() {
        return Err(LedgerError::NegativeBalance {
            field: "dues",
            balance,
            delta: Money::zero(),
        });
    }

    match adjustment {
        DuesAdjustment::Accrual(amount) => {
            if amount.is_negative() {
                return Err(LedgerError::NegativeBalance {
                    field: "dues",
                    balance,
                    delta: amount,
                });
            }
            Ok(balance + amount)
        }
        DuesAdjustment::Reversal(amount) => Ok(balance.saturating_sub_floor(amount)),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
