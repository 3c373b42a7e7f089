//! # Ledger Entry Repository
//!
//! The append-only event log keyed by customer id. Every balance mutation
//! appends exactly one row here in the same transaction; the live balances
//! on the customer row are a cached projection of these entries.

use sqlx::SqliteConnection;

use crate::error::DbResult;
use khata_core::LedgerEntry;

/// Appends one ledger entry.
pub async fn append(conn: &mut SqliteConnection, entry: &LedgerEntry) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, owner_id, customer_id, kind,
            wallet_delta_paise, dues_delta_paise, ref_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.owner_id)
    .bind(&entry.customer_id)
    .bind(entry.kind)
    .bind(entry.wallet_delta_paise)
    .bind(entry.dues_delta_paise)
    .bind(&entry.ref_id)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Lists a customer's entries under the given owner, newest first.
pub async fn list_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT id, owner_id, customer_id, kind,
               wallet_delta_paise, dues_delta_paise, ref_id, created_at
        FROM ledger_entries
        WHERE owner_id = ?1 AND customer_id = ?2
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(owner_id)
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(entries)
}

/// Deletes a customer's entries (cascade path).
pub async fn delete_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM ledger_entries WHERE owner_id = ?1 AND customer_id = ?2")
        .bind(owner_id)
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
