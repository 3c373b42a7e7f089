//! # Domain Types
//!
//! Core domain types for the customer financial ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                               │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │   Customer    │   │     Sale      │   │   SaleItem    │          │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │          │
//! │  │ id (UUID)     │   │ id (UUID)     │   │ id (UUID)     │          │
//! │  │ owner_id      │   │ owner_id      │   │ sale_id (FK)  │          │
//! │  │ wallet ≥ 0    │   │ cash+wallet   │   │ quantity > 0  │          │
//! │  │ dues ≥ 0      │   │  +due = total │   │ unit_price    │          │
//! │  └───────────────┘   └───────────────┘   └───────────────┘          │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐          │
//! │  │   Payment     │   │  LedgerEntry  │   │  PaymentType  │          │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │          │
//! │  │ dues          │   │ append-only   │   │ Cash, Credit, │          │
//! │  │ collection    │   │ balance audit │   │ FullAdvance..│           │
//! │  └───────────────┘   └───────────────┘   └───────────────┘          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Scoping
//! Every entity carries `owner_id`. No entity may be read, mutated, or have
//! its existence confirmed across tenant boundaries; the store layer filters
//! every query on it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Type
// =============================================================================

/// The rule set governing how a sale's total is split across immediate cash,
/// wallet debit, and new dues. See [`crate::split::split_payment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Entire total paid in cash at the counter.
    Cash,
    /// Entire total goes on the customer's khata as dues.
    Credit,
    /// Part cash now, remainder accrues as dues.
    DuesPlusCash,
    /// Part funded from the prepaid wallet, remainder in cash.
    AdvancePlusCash,
    /// Entire total funded from the prepaid wallet.
    FullAdvance,
}

impl PaymentType {
    /// Whether this type can debit the wallet.
    #[inline]
    pub const fn uses_wallet(&self) -> bool {
        matches!(self, PaymentType::AdvancePlusCash | PaymentType::FullAdvance)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Settlement status of a sale, derived from its recorded split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// No dues recorded: fully settled by cash and/or wallet.
    Paid,
    /// Part of the total accrued as dues.
    PartiallyDue,
    /// The entire total accrued as dues.
    Due,
}

// =============================================================================
// Wallet Direction
// =============================================================================

/// Direction of an explicit wallet adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletDirection {
    /// Top-up: always succeeds for a positive amount.
    Credit,
    /// Withdrawal: fails if it exceeds the balance.
    Debit,
}

// =============================================================================
// Ledger Entry Kind
// =============================================================================

/// What a ledger entry explains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    SaleCreated,
    SaleDeleted,
    PaymentCollected,
    WalletCredit,
    WalletDebit,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with the two per-customer balances the engine maintains.
///
/// Invariant: both balances are always non-negative. They are never
/// materialized as negative and never silently clamped after the fact; every
/// mutation goes through the guards in [`crate::split`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this customer belongs to.
    pub owner_id: String,

    /// Display name.
    pub name: String,

    /// Optional contact number.
    pub phone: Option<String>,

    /// Prepaid wallet (advance) balance, in paise. Always >= 0.
    pub wallet_paise: Money,

    /// Outstanding dues balance, in paise. Always >= 0.
    pub dues_paise: Money,

    /// When the customer was registered.
    pub created_at: DateTime<Utc>,

    /// Refreshed by every balance mutation.
    pub last_active_at: DateTime<Utc>,
}

impl Customer {
    /// Wallet balance accessor.
    #[inline]
    pub fn wallet(&self) -> Money {
        self.wallet_paise
    }

    /// Outstanding dues accessor.
    #[inline]
    pub fn dues(&self) -> Money {
        self.dues_paise
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// The sale is the unit that explains every wallet/dues delta: reversal on
/// deletion is always derived from the recorded `wallet_used_paise` and
/// `due_paise`, never recomputed from the current customer balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub owner_id: String,
    pub customer_id: String,

    /// Sum of all line totals. Always equals
    /// `cash_paid_paise + wallet_used_paise + due_paise`.
    pub total_paise: Money,
    pub cash_paid_paise: Money,
    pub wallet_used_paise: Money,
    pub due_paise: Money,

    pub payment_type: PaymentType,
    /// Free-form tender note ("upi", "cash", ...) recorded for the counter.
    pub payment_mode: Option<String>,
    pub status: SaleStatus,

    /// Optional date the dues portion is expected by.
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item, owned exclusively by its sale.
///
/// Never exists without a parent sale; deleted together with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub owner_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_paise: Money,
    pub line_total_paise: Money,
}

/// Caller-supplied line item for sale creation, before ids are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemDraft {
    pub name: String,
    pub quantity: i64,
    pub unit_price_paise: Money,
}

impl SaleItemDraft {
    /// Line total for this draft.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price_paise.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A durable collect-against-dues record.
///
/// Persisted alongside every dues collection so the balance history stays
/// reconstructible; the live dues balance is a cached projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub owner_id: String,
    pub customer_id: String,
    pub amount_paise: Money,
    pub collected_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// Append-only explanation of one balance mutation.
///
/// `wallet_delta_paise` and `dues_delta_paise` are signed: replaying all
/// entries for a customer from zero reproduces the live balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: String,
    pub owner_id: String,
    pub customer_id: String,
    pub kind: LedgerEntryKind,
    pub wallet_delta_paise: Money,
    pub dues_delta_paise: Money,
    /// The sale or payment this entry explains, when there is one.
    pub ref_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Account
// =============================================================================

/// A loosely-linked accounts-ledger row keyed by `customer_id`.
///
/// Out of core scope except as a cascade target during customer deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub customer_id: String,
    pub title: String,
    pub amount_paise: Money,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
