//! # Customer Repository
//!
//! Row access for customers and their two balance columns. The balance
//! columns are the only contended resource in the schema; they are only
//! ever written through [`update_balances`] inside a transaction that also
//! read them.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{Customer, Money};

/// Inserts a newly registered customer.
pub async fn insert(conn: &mut SqliteConnection, customer: &Customer) -> DbResult<()> {
    debug!(id = %customer.id, owner_id = %customer.owner_id, "Inserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (
            id, owner_id, name, phone,
            wallet_paise, dues_paise,
            created_at, last_active_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.owner_id)
    .bind(&customer.name)
    .bind(&customer.phone)
    .bind(customer.wallet_paise)
    .bind(customer.dues_paise)
    .bind(customer.created_at)
    .bind(customer.last_active_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Gets a customer under the given owner.
///
/// Returns `None` for absent AND cross-tenant rows alike.
pub async fn get(
    conn: &mut SqliteConnection,
    owner_id: &str,
    id: &str,
) -> DbResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, owner_id, name, phone,
               wallet_paise, dues_paise,
               created_at, last_active_at
        FROM customers
        WHERE owner_id = ?1 AND id = ?2
        "#,
    )
    .bind(owner_id)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(customer)
}

/// Writes both balances in one statement and refreshes `last_active_at`.
///
/// Callers must have read the current balances inside the same transaction;
/// the values passed here come from the invariant layer, never from
/// arithmetic done outside it.
pub async fn update_balances(
    conn: &mut SqliteConnection,
    owner_id: &str,
    id: &str,
    wallet: Money,
    dues: Money,
    at: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE customers SET
            wallet_paise = ?3,
            dues_paise = ?4,
            last_active_at = ?5
        WHERE owner_id = ?1 AND id = ?2
        "#,
    )
    .bind(owner_id)
    .bind(id)
    .bind(wallet)
    .bind(dues)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", id));
    }

    Ok(())
}

/// Deletes the customer row itself.
///
/// Must run after every dependent row is gone; the foreign keys enforce
/// the ordering.
pub async fn delete(conn: &mut SqliteConnection, owner_id: &str, id: &str) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM customers WHERE owner_id = ?1 AND id = ?2")
        .bind(owner_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Customer", id));
    }

    Ok(())
}
