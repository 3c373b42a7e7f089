//! # Tenant Guard
//!
//! Every engine entry point takes a [`Principal`]; its `owner_id` becomes a
//! mandatory parameter on every store call the operation makes. There is no
//! code path from an engine operation to a repository function that does not
//! pass through it.
//!
//! A lookup that would succeed for another tenant's row returns `NotFound`,
//! never a distinct "forbidden" error - the caller cannot learn whether the
//! row exists at all.

use serde::{Deserialize, Serialize};

/// The authenticated calling principal.
///
/// Resolved by the transport layer (bearer token, session, whatever) before
/// the engine is invoked; the engine treats it as ground truth and scopes
/// every read and write to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    owner_id: String,
}

impl Principal {
    /// Wraps a resolved owner id.
    pub fn new(owner_id: impl Into<String>) -> Self {
        Principal {
            owner_id: owner_id.into(),
        }
    }

    /// The tenant every store call is scoped to.
    #[inline]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}
