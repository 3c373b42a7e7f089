//! # Payment Repository
//!
//! Durable collect-against-dues records. A dues balance is never mutated
//! without one of these rows landing in the same transaction.

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use khata_core::Payment;

/// Inserts a payment record.
pub async fn insert(conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
    debug!(
        id = %payment.id,
        customer_id = %payment.customer_id,
        amount = %payment.amount_paise,
        "Recording payment"
    );

    sqlx::query(
        r#"
        INSERT INTO payments (id, owner_id, customer_id, amount_paise, collected_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payment.id)
    .bind(&payment.owner_id)
    .bind(&payment.customer_id)
    .bind(payment.amount_paise)
    .bind(payment.collected_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Lists a customer's payments under the given owner, newest first.
pub async fn list_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, owner_id, customer_id, amount_paise, collected_at
        FROM payments
        WHERE owner_id = ?1 AND customer_id = ?2
        ORDER BY collected_at DESC, id
        "#,
    )
    .bind(owner_id)
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(payments)
}

/// Deletes a customer's payments (cascade path).
pub async fn delete_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM payments WHERE owner_id = ?1 AND customer_id = ?2")
        .bind(owner_id)
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
