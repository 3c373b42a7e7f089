//! # khata-engine: Customer Financial Ledger Managers
//!
//! The orchestration layer of the Khata ledger. Maintains two per-customer
//! balances - a prepaid **wallet (advance) balance** and an **outstanding
//! dues balance** - and mutates them consistently as sales are created and
//! deleted, payments are collected, the wallet is topped up or debited, and
//! customers are deleted (a cascade through their sales, sale items,
//! payments and linked accounts with compensating balance reversal).
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  external request                                                   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Principal (tenant guard) ── owner_id attached to every store call  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  Manager (this crate) ──► khata-core (validate / split / guard)     │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  khata-db transaction (atomic apply, rollback on any failure)       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  response with updated balances                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//!
//! Each operation opens exactly one transaction and runs its entire
//! read-modify-write sequence inside it. A failure anywhere - validation,
//! split, invariant guard, store error, cancellation - drops the
//! transaction and rolls everything back. There is no compensating
//! "delete the sale if the wallet update failed" path, and no "fix
//! negative balances" maintenance path: negative balances are rejected by
//! construction, never repaired after the fact.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod customer;
pub mod error;
pub mod guard;
pub mod payment;
pub mod sale;

// =============================================================================
// Re-exports
// =============================================================================

pub use customer::{CreateCustomerRequest, CustomerDeletion};
pub use error::{EngineError, EngineResult};
pub use guard::Principal;
pub use payment::{PaymentReceipt, WalletAdjustment};
pub use sale::{CreateSaleRequest, SaleReceipt, SaleReversal};

use khata_db::Database;

// =============================================================================
// Ledger Engine
// =============================================================================

/// The customer financial ledger engine.
///
/// Holds no in-process state beyond the store handle; all durable state
/// lives in the ledger store, so any number of workers can share a clone.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    db: Database,
}

impl LedgerEngine {
    /// Creates an engine over an opened ledger store.
    pub fn new(db: Database) -> Self {
        LedgerEngine { db }
    }

    /// The underlying store handle.
    pub fn db(&self) -> &Database {
        &self.db
    }
}
