//! # khata-db: Ledger Store Adapter
//!
//! SQLite-backed storage for the Khata ledger, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Khata Ledger Data Flow                        │
//! │                                                                     │
//! │  khata-engine operation (create_sale, delete_customer, ...)         │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                    khata-db (THIS CRATE)                      │  │
//! │  │                                                               │  │
//! │  │   ┌─────────────┐    ┌──────────────┐    ┌──────────────┐    │  │
//! │  │   │  Database   │    │ Repositories │    │  Migrations  │    │  │
//! │  │   │  (pool.rs)  │    │ customer.rs  │    │  (embedded)  │    │  │
//! │  │   │             │    │ sale.rs      │    │              │    │  │
//! │  │   │ SqlitePool  │◄───│ payment.rs   │    │ 001_init.sql │    │  │
//! │  │   │ begin() tx  │    │ ledger.rs    │    │              │    │  │
//! │  │   └─────────────┘    └──────────────┘    └──────────────┘    │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys ON)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Discipline
//!
//! Repository functions take `&mut SqliteConnection` so a manager can run an
//! arbitrary sequence of them inside one [`sqlx::Transaction`] obtained from
//! [`Database::begin`]. Dropping the transaction without committing rolls
//! everything back - there is no partial-application path.
//!
//! SQLite admits a single writer at a time, and [`Database::begin`] opens
//! every transaction as `BEGIN IMMEDIATE`, so two transactions mutating the
//! same customer's balances cannot interleave their read-modify-write: the
//! second writer queues on the busy timeout rather than reading a stale
//! snapshot and failing its lock upgrade. A row-locking adapter (Postgres
//! `SELECT ... FOR UPDATE`) could be slotted behind the same function
//! signatures without engine changes.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
