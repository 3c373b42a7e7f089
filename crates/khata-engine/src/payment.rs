//! # Payment & Wallet Operations
//!
//! Collect-payment-against-dues and wallet credit/debit: each a single
//! guarded balance mutation in its own transaction, each leaving a durable
//! record (a Payment row, a ledger entry) explaining the change.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use khata_core::{
    apply_wallet_delta, validate_positive_amount, LedgerEntry, LedgerEntryKind, LedgerError,
    Money, Payment, WalletDirection,
};
use khata_db::repository::{customer as customer_repo, ledger as ledger_repo, payment as payment_repo};
use khata_db::DbError;

use crate::error::{EngineError, EngineResult};
use crate::guard::Principal;
use crate::LedgerEngine;

// =============================================================================
// Response Types
// =============================================================================

/// Result of a dues collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub dues_balance: Money,
}

/// Result of an explicit wallet credit/debit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAdjustment {
    pub wallet_balance: Money,
}

// =============================================================================
// Operations
// =============================================================================

impl LedgerEngine {
    /// Collects a payment against the customer's outstanding dues.
    ///
    /// ## Errors
    /// * `Ledger(InvalidAmount)` - non-positive amount
    /// * `Ledger(ExceedsOutstanding)` - amount above the current dues,
    ///   reported with the outstanding balance
    /// * `NotFound` - customer absent under this principal
    pub async fn collect_payment(
        &self,
        principal: &Principal,
        customer_id: &str,
        amount: Money,
    ) -> EngineResult<PaymentReceipt> {
        let owner_id = principal.owner_id();
        debug!(owner_id, customer_id, amount = %amount, "collect_payment");

        validate_positive_amount(amount, "payment amount must be positive")?;

        let mut tx = self.db().begin().await?;

        let customer = customer_repo::get(&mut tx, owner_id, customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", customer_id))?;

        if amount > customer.dues_paise {
            return Err(LedgerError::ExceedsOutstanding {
                outstanding: customer.dues_paise,
                requested: amount,
            }
            .into());
        }

        let now = Utc::now();
        let dues = customer.dues_paise - amount;

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            customer_id: customer_id.to_string(),
            amount_paise: amount,
            collected_at: now,
        };

        payment_repo::insert(&mut tx, &payment).await?;
        customer_repo::update_balances(
            &mut tx,
            owner_id,
            customer_id,
            customer.wallet_paise,
            dues,
            now,
        )
        .await?;
        ledger_repo::append(
            &mut tx,
            &LedgerEntry {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                customer_id: customer_id.to_string(),
                kind: LedgerEntryKind::PaymentCollected,
                wallet_delta_paise: Money::zero(),
                dues_delta_paise: -amount,
                ref_id: Some(payment.id.clone()),
                created_at: now,
            },
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(owner_id, customer_id, payment_id = %payment.id, amount = %amount, dues = %dues, "Payment collected");

        Ok(PaymentReceipt {
            payment_id: payment.id,
            dues_balance: dues,
        })
    }

    /// Credits or debits the customer's prepaid wallet.
    ///
    /// ## Errors
    /// * `Ledger(InvalidAmount)` - non-positive amount
    /// * `Ledger(InsufficientBalance)` - debit above the current wallet,
    ///   reported with the available balance
    /// * `NotFound` - customer absent under this principal
    pub async fn adjust_wallet(
        &self,
        principal: &Principal,
        customer_id: &str,
        amount: Money,
        direction: WalletDirection,
    ) -> EngineResult<WalletAdjustment> {
        let owner_id = principal.owner_id();
        debug!(owner_id, customer_id, amount = %amount, direction = ?direction, "adjust_wallet");

        validate_positive_amount(amount, "wallet amount must be positive")?;

        let mut tx = self.db().begin().await?;

        let customer = customer_repo::get(&mut tx, owner_id, customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", customer_id))?;

        let (wallet, kind, delta) = match direction {
            WalletDirection::Credit => (
                apply_wallet_delta(customer.wallet_paise, amount)?,
                LedgerEntryKind::WalletCredit,
                amount,
            ),
            WalletDirection::Debit => {
                if amount > customer.wallet_paise {
                    return Err(LedgerError::InsufficientBalance {
                        available: customer.wallet_paise,
                        requested: amount,
                    }
                    .into());
                }
                (
                    apply_wallet_delta(customer.wallet_paise, -amount)?,
                    LedgerEntryKind::WalletDebit,
                    -amount,
                )
            }
        };

        let now = Utc::now();
        customer_repo::update_balances(
            &mut tx,
            owner_id,
            customer_id,
            wallet,
            customer.dues_paise,
            now,
        )
        .await?;
        ledger_repo::append(
            &mut tx,
            &LedgerEntry {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                customer_id: customer_id.to_string(),
                kind,
                wallet_delta_paise: delta,
                dues_delta_paise: Money::zero(),
                ref_id: None,
                created_at: now,
            },
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(owner_id, customer_id, wallet = %wallet, "Wallet adjusted");

        Ok(WalletAdjustment {
            wallet_balance: wallet,
        })
    }
}
