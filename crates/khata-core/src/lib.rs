//! # khata-core: Pure Business Logic for the Khata Ledger
//!
//! This crate is the **heart** of the customer financial ledger. It holds
//! the balance invariant layer as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Khata Ledger Architecture                     │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │              External API layer (out of scope)                │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │ authenticated principal             │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │                     khata-engine (Managers)                   │  │
//! │  │    create_sale, delete_sale, delete_customer, payments        │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │              ★ khata-core (THIS CRATE) ★                      │  │
//! │  │                                                               │  │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌────────────┐   │  │
//! │  │   │  types   │  │  money   │  │  split   │  │ validation │   │  │
//! │  │   │ Customer │  │  Money   │  │ payment  │  │   rules    │   │  │
//! │  │   │  Sale    │  │ (paise)  │  │  splits  │  │   checks   │   │  │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └────────────┘   │  │
//! │  │                                                               │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │                    khata-db (Ledger Store)                    │  │
//! │  │           SQLite queries, migrations, repositories            │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Sale, Payment, LedgerEntry, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`split`] - Payment splits and balance delta guards
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{LedgerError, LedgerResult, ValidationError};
pub use money::Money;
pub use split::{apply_dues_delta, apply_wallet_delta, split_payment, DuesAdjustment, PaymentSplit};
pub use types::*;
pub use validation::{validate_name, validate_positive_amount, validate_sale_items};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed on a single sale.
///
/// Prevents runaway requests; a khata sale with more lines than this is
/// almost certainly a client bug.
pub const MAX_SALE_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of a customer or item name.
pub const MAX_NAME_LEN: usize = 200;
