//! # Customer Lifecycle Manager
//!
//! Registration, balance inspection, statement, and the cascading delete.
//!
//! ## DeleteCustomer
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                              │
//! │    load customer (owner-scoped)                                     │
//! │    load all sales ── accumulate wallet_used / due per sale          │
//! │    delete all sale items, then all sales                            │
//! │    apply the ACCUMULATED deltas to the customer once                │
//! │    delete payments, ledger entries, idempotency keys, accounts      │
//! │    delete the customer row                                          │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  One logical unit: either the customer and every dependent row      │
//! │  disappear with balances correctly unwound, or none of it does.     │
//! │  A half-deleted customer is a correctness defect, not a log line.   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use khata_core::{
    apply_dues_delta, apply_wallet_delta, validate_name, Customer, DuesAdjustment, LedgerEntry,
    Money,
};
use khata_db::repository::{
    account as account_repo, customer as customer_repo, ledger as ledger_repo,
    payment as payment_repo, sale as sale_repo,
};
use khata_db::DbError;

use crate::error::{EngineError, EngineResult};
use crate::guard::Principal;
use crate::LedgerEngine;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Parameters for customer registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// What a cascading customer delete unwound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDeletion {
    pub deleted_sales: usize,
    /// Sum of recorded wallet usage across the deleted sales.
    pub wallet_restored: Money,
    /// Sum of recorded dues across the deleted sales (balance floored at
    /// zero when later collections already consumed part of them).
    pub dues_reversed: Money,
}

// =============================================================================
// Operations
// =============================================================================

impl LedgerEngine {
    /// Registers a customer with both balances at zero.
    pub async fn create_customer(
        &self,
        principal: &Principal,
        req: CreateCustomerRequest,
    ) -> EngineResult<Customer> {
        let owner_id = principal.owner_id();
        debug!(owner_id, name = %req.name, "create_customer");

        validate_name(&req.name, "customer name")?;

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: req.name.trim().to_string(),
            phone: req.phone,
            wallet_paise: Money::zero(),
            dues_paise: Money::zero(),
            created_at: now,
            last_active_at: now,
        };

        let mut conn = self.db().acquire().await?;
        customer_repo::insert(&mut conn, &customer).await?;

        info!(owner_id, customer_id = %customer.id, "Customer registered");

        Ok(customer)
    }

    /// Gets a customer (and thus both balances), owner-scoped.
    pub async fn get_customer(
        &self,
        principal: &Principal,
        customer_id: &str,
    ) -> EngineResult<Customer> {
        let mut conn = self.db().acquire().await?;

        customer_repo::get(&mut conn, principal.owner_id(), customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", customer_id))
    }

    /// The customer's append-only balance history, newest first.
    ///
    /// Replaying the deltas from zero reproduces the live balances; this is
    /// the reconstructibility the durable-record redesign buys.
    pub async fn customer_statement(
        &self,
        principal: &Principal,
        customer_id: &str,
    ) -> EngineResult<Vec<LedgerEntry>> {
        let owner_id = principal.owner_id();
        let mut conn = self.db().acquire().await?;

        // Existence check first so a cross-tenant id reads as NotFound
        // rather than an empty statement.
        customer_repo::get(&mut conn, owner_id, customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", customer_id))?;

        Ok(ledger_repo::list_by_customer(&mut conn, owner_id, customer_id).await?)
    }

    /// Deletes a customer and everything that exists only in its context,
    /// reversing the balance effects of every sale, as one transaction.
    pub async fn delete_customer(
        &self,
        principal: &Principal,
        customer_id: &str,
    ) -> EngineResult<CustomerDeletion> {
        let owner_id = principal.owner_id();
        debug!(owner_id, customer_id, "delete_customer");

        let mut tx = self.db().begin().await?;

        let customer = customer_repo::get(&mut tx, owner_id, customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", customer_id))?;

        let sales = sale_repo::list_by_customer(&mut tx, owner_id, customer_id).await?;

        // Wallet restoration only applies to wallet-funded payment types;
        // every sale can carry a recorded due.
        let mut wallet_restored = Money::zero();
        let mut dues_reversed = Money::zero();
        for sale in &sales {
            if sale.payment_type.uses_wallet() {
                wallet_restored += sale.wallet_used_paise;
            }
            dues_reversed += sale.due_paise;
        }

        sale_repo::delete_items_by_customer(&mut tx, owner_id, customer_id).await?;
        sale_repo::delete_sales_by_customer(&mut tx, owner_id, customer_id).await?;

        // One accumulated balance write instead of one per sale. The update
        // still runs through the guards even though the row is about to go:
        // a reversal that cannot produce valid balances must abort the
        // cascade, not be papered over by the delete.
        let now = Utc::now();
        let wallet = apply_wallet_delta(customer.wallet_paise, wallet_restored)?;
        let dues = apply_dues_delta(customer.dues_paise, DuesAdjustment::Reversal(dues_reversed))?;
        customer_repo::update_balances(&mut tx, owner_id, customer_id, wallet, dues, now).await?;

        payment_repo::delete_by_customer(&mut tx, owner_id, customer_id).await?;
        ledger_repo::delete_by_customer(&mut tx, owner_id, customer_id).await?;
        sale_repo::delete_idempotency_keys_by_customer(&mut tx, owner_id, customer_id).await?;
        account_repo::delete_by_customer(&mut tx, owner_id, customer_id).await?;
        customer_repo::delete(&mut tx, owner_id, customer_id).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            owner_id,
            customer_id,
            deleted_sales = sales.len(),
            wallet_restored = %wallet_restored,
            dues_reversed = %dues_reversed,
            "Customer deleted with cascade"
        );

        Ok(CustomerDeletion {
            deleted_sales: sales.len(),
            wallet_restored,
            dues_reversed,
        })
    }
}
