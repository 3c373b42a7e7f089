//! # Account Repository
//!
//! The separate accounts-ledger feature owns these rows; the engine's only
//! contract with it is "on customer deletion, cascade to account records
//! for that customer id". Insert exists so tests can seed cascade targets.

use sqlx::SqliteConnection;

use crate::error::DbResult;
use khata_core::Account;

/// Inserts an account row.
pub async fn insert(conn: &mut SqliteConnection, account: &Account) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO accounts (id, owner_id, customer_id, title, amount_paise, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&account.id)
    .bind(&account.owner_id)
    .bind(&account.customer_id)
    .bind(&account.title)
    .bind(account.amount_paise)
    .bind(account.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Counts a customer's account rows under the given owner.
pub async fn count_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM accounts WHERE owner_id = ?1 AND customer_id = ?2",
    )
    .bind(owner_id)
    .bind(customer_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(count)
}

/// Deletes a customer's account rows (cascade path).
pub async fn delete_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM accounts WHERE owner_id = ?1 AND customer_id = ?2")
        .bind(owner_id)
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
