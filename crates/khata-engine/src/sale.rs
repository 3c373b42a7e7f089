//! # Sale Lifecycle Manager
//!
//! Creates and deletes sales, applying and reversing their wallet and dues
//! effects through the balance invariant layer, inside a single store
//! transaction.
//!
//! ## CreateSale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  validate items                                                     │
//! │       │                                                             │
//! │       ▼  BEGIN                                                      │
//! │  idempotency-key replay?  ──yes──► return original receipt          │
//! │       │ no                                                          │
//! │       ▼                                                             │
//! │  load customer (owner-scoped) ──► split_payment()                   │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  insert sale + items                                                │
//! │  debit wallet / accrue dues (guarded)                               │
//! │  update balances + append ledger entry + record key                 │
//! │       │                                                             │
//! │       ▼  COMMIT                                                     │
//! │  receipt with updated balances                                      │
//! │                                                                     │
//! │  Any failure inside the block drops the transaction: no sale row,   │
//! │  no balance change, no orphaned items.                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reversal on deletion is always derived from the sale's own recorded
//! `wallet_used_paise` / `due_paise`, never recomputed from the current
//! customer balance.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use khata_core::{
    apply_dues_delta, apply_wallet_delta, split_payment, validate_sale_items, DuesAdjustment,
    LedgerEntry, LedgerEntryKind, Money, PaymentType, Sale, SaleItem, SaleItemDraft,
};
use khata_db::repository::{customer as customer_repo, ledger as ledger_repo, sale as sale_repo};
use khata_db::DbError;

use crate::error::{EngineError, EngineResult};
use crate::guard::Principal;
use crate::LedgerEngine;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Parameters for sale creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_id: String,
    pub items: Vec<SaleItemDraft>,
    pub payment_type: PaymentType,
    /// Cash tendered (`DuesPlusCash`) or wallet portion (`AdvancePlusCash`).
    /// Ignored by the other payment types.
    #[serde(default)]
    pub requested: Money,
    /// Free-form tender note recorded on the sale.
    #[serde(default)]
    pub payment_mode: Option<String>,
    /// Optional date the dues portion is expected by.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Client-chosen retry key. A replayed key returns the original sale
    /// instead of debiting the wallet a second time.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// A created sale with the balances it left behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleReceipt {
    pub sale: Sale,
    pub wallet_balance: Money,
    pub dues_balance: Money,
    /// True when this receipt came from an idempotency-key replay.
    pub replayed: bool,
}

/// The unwound effect of a deleted sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleReversal {
    /// The sale's recorded wallet usage, credited back in full.
    pub wallet_restored: Money,
    /// The sale's recorded due amount. The dues balance itself is floored
    /// at zero, since a later collection may already have consumed part of
    /// this due.
    pub dues_reversed: Money,
    pub wallet_balance: Money,
    pub dues_balance: Money,
}

// =============================================================================
// Operations
// =============================================================================

impl LedgerEngine {
    /// Creates a sale and applies its balance effects atomically.
    ///
    /// ## Errors
    /// * `NotFound` - customer absent under this principal
    /// * `Ledger(InsufficientWallet)` - wallet-funded split short, with the
    ///   shortfall reported; nothing written
    /// * `Ledger(Validation(..))` - empty/oversized items, bad quantities
    /// * `StoreUnavailable` - transaction failure, fully rolled back
    pub async fn create_sale(
        &self,
        principal: &Principal,
        req: CreateSaleRequest,
    ) -> EngineResult<SaleReceipt> {
        let owner_id = principal.owner_id();
        debug!(owner_id, customer_id = %req.customer_id, payment_type = ?req.payment_type, "create_sale");

        validate_sale_items(&req.items)?;

        let mut tx = self.db().begin().await?;

        // Retried request? Return the original result, debit nothing.
        if let Some(key) = req.idempotency_key.as_deref() {
            if let Some(sale_id) = sale_repo::find_idempotency_key(&mut tx, owner_id, key).await? {
                let sale = sale_repo::get(&mut tx, owner_id, &sale_id)
                    .await?
                    .ok_or_else(|| EngineError::not_found("Sale", &sale_id))?;
                let customer = customer_repo::get(&mut tx, owner_id, &sale.customer_id)
                    .await?
                    .ok_or_else(|| EngineError::not_found("Customer", &sale.customer_id))?;

                info!(owner_id, sale_id = %sale.id, key, "Sale creation replayed from idempotency key");

                return Ok(SaleReceipt {
                    wallet_balance: customer.wallet_paise,
                    dues_balance: customer.dues_paise,
                    sale,
                    replayed: true,
                });
            }
        }

        let customer = customer_repo::get(&mut tx, owner_id, &req.customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", &req.customer_id))?;

        let total: Money = req.items.iter().map(SaleItemDraft::line_total).sum();
        let split = split_payment(req.payment_type, total, req.requested, customer.wallet_paise)?;

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            customer_id: customer.id.clone(),
            total_paise: total,
            cash_paid_paise: split.cash_paid,
            wallet_used_paise: split.wallet_used,
            due_paise: split.due_amount,
            payment_type: req.payment_type,
            payment_mode: req.payment_mode.clone(),
            status: split.status(total),
            due_date: req.due_date,
            created_at: now,
        };

        let items: Vec<SaleItem> = req
            .items
            .iter()
            .map(|draft| SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                owner_id: owner_id.to_string(),
                name: draft.name.trim().to_string(),
                quantity: draft.quantity,
                unit_price_paise: draft.unit_price_paise,
                line_total_paise: draft.line_total(),
            })
            .collect();

        sale_repo::insert_sale(&mut tx, &sale).await?;
        sale_repo::insert_items(&mut tx, &items).await?;

        let mut wallet = customer.wallet_paise;
        let mut dues = customer.dues_paise;

        if split.wallet_used.is_positive() {
            wallet = apply_wallet_delta(wallet, -split.wallet_used)?;
        }
        if split.due_amount.is_positive() {
            dues = apply_dues_delta(dues, DuesAdjustment::Accrual(split.due_amount))?;
        }

        customer_repo::update_balances(&mut tx, owner_id, &customer.id, wallet, dues, now).await?;

        ledger_repo::append(
            &mut tx,
            &LedgerEntry {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                customer_id: customer.id.clone(),
                kind: LedgerEntryKind::SaleCreated,
                wallet_delta_paise: -split.wallet_used,
                dues_delta_paise: split.due_amount,
                ref_id: Some(sale.id.clone()),
                created_at: now,
            },
        )
        .await?;

        if let Some(key) = req.idempotency_key.as_deref() {
            sale_repo::insert_idempotency_key(&mut tx, owner_id, key, &sale.id, &customer.id, now)
                .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            owner_id,
            sale_id = %sale.id,
            total = %total,
            cash = %split.cash_paid,
            wallet_used = %split.wallet_used,
            due = %split.due_amount,
            "Sale created"
        );

        Ok(SaleReceipt {
            sale,
            wallet_balance: wallet,
            dues_balance: dues,
            replayed: false,
        })
    }

    /// Deletes a sale and reverses its recorded balance effects atomically.
    ///
    /// Items, the sale row, and the balance reversal commit as one unit;
    /// never applied partially.
    pub async fn delete_sale(
        &self,
        principal: &Principal,
        sale_id: &str,
    ) -> EngineResult<SaleReversal> {
        let owner_id = principal.owner_id();
        debug!(owner_id, sale_id, "delete_sale");

        let mut tx = self.db().begin().await?;

        let sale = sale_repo::get(&mut tx, owner_id, sale_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;

        sale_repo::delete_items_by_sale(&mut tx, owner_id, sale_id).await?;
        sale_repo::delete_idempotency_keys_by_sale(&mut tx, owner_id, sale_id).await?;
        sale_repo::delete_sale(&mut tx, owner_id, sale_id).await?;

        let customer = customer_repo::get(&mut tx, owner_id, &sale.customer_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Customer", &sale.customer_id))?;

        let now = Utc::now();
        let wallet = apply_wallet_delta(customer.wallet_paise, sale.wallet_used_paise)?;
        let dues = apply_dues_delta(
            customer.dues_paise,
            DuesAdjustment::Reversal(sale.due_paise),
        )?;

        customer_repo::update_balances(&mut tx, owner_id, &customer.id, wallet, dues, now).await?;

        // The entry records the delta actually applied (post-clamp), so
        // replaying the log still reproduces the live balances.
        ledger_repo::append(
            &mut tx,
            &LedgerEntry {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.to_string(),
                customer_id: customer.id.clone(),
                kind: LedgerEntryKind::SaleDeleted,
                wallet_delta_paise: sale.wallet_used_paise,
                dues_delta_paise: dues - customer.dues_paise,
                ref_id: Some(sale.id.clone()),
                created_at: now,
            },
        )
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            owner_id,
            sale_id,
            wallet_restored = %sale.wallet_used_paise,
            dues_reversed = %sale.due_paise,
            "Sale deleted"
        );

        Ok(SaleReversal {
            wallet_restored: sale.wallet_used_paise,
            dues_reversed: sale.due_paise,
            wallet_balance: wallet,
            dues_balance: dues,
        })
    }

    /// Gets a sale with its items, owner-scoped.
    pub async fn get_sale(
        &self,
        principal: &Principal,
        sale_id: &str,
    ) -> EngineResult<(Sale, Vec<SaleItem>)> {
        let owner_id = principal.owner_id();

        let mut conn = self.db().acquire().await?;

        let sale = sale_repo::get(&mut conn, owner_id, sale_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;
        let items = sale_repo::get_items(&mut conn, owner_id, sale_id).await?;

        Ok((sale, items))
    }
}
