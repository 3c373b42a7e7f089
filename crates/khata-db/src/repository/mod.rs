//! # Repository Functions
//!
//! One module per entity. Every function takes a `&mut SqliteConnection`
//! executor so managers can compose an arbitrary sequence of them inside a
//! single transaction from [`crate::Database::begin`], and every function
//! takes `owner_id` as a mandatory parameter - tenant scoping is part of the
//! call signature, not an optional filter.
//!
//! A lookup that misses because the row belongs to another tenant is
//! indistinguishable from a lookup that misses because the row does not
//! exist. That property is what keeps cross-tenant existence from leaking.

pub mod account;
pub mod customer;
pub mod ledger;
pub mod payment;
pub mod sale;
