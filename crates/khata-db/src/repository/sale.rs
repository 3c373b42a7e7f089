//! # Sale Repository
//!
//! Row access for sales, their items, and sale-creation idempotency keys.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  CREATE (one transaction, khata-engine)                             │
//! │    insert_sale() + insert_items() + balance update + ledger entry   │
//! │    + insert_idempotency_key()                                       │
//! │                                                                     │
//! │  DELETE (one transaction)                                           │
//! │    delete_items_by_sale() + delete_sale() + balance reversal        │
//! │                                                                     │
//! │  Sales are written once and only mutated by deletion; no separate   │
//! │  locking discipline beyond the enclosing transaction.               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use khata_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, owner_id, customer_id, total_paise, cash_paid_paise, \
     wallet_used_paise, due_paise, payment_type, payment_mode, status, due_date, created_at";

/// Inserts a sale row.
pub async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, customer_id = %sale.customer_id, total = %sale.total_paise, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, owner_id, customer_id,
            total_paise, cash_paid_paise, wallet_used_paise, due_paise,
            payment_type, payment_mode, status, due_date, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.owner_id)
    .bind(&sale.customer_id)
    .bind(sale.total_paise)
    .bind(sale.cash_paid_paise)
    .bind(sale.wallet_used_paise)
    .bind(sale.due_paise)
    .bind(sale.payment_type)
    .bind(&sale.payment_mode)
    .bind(sale.status)
    .bind(sale.due_date)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Inserts all line items of a sale.
pub async fn insert_items(conn: &mut SqliteConnection, items: &[SaleItem]) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, owner_id, name,
                quantity, unit_price_paise, line_total_paise
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price_paise)
        .bind(item.line_total_paise)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Gets a sale under the given owner.
pub async fn get(
    conn: &mut SqliteConnection,
    owner_id: &str,
    sale_id: &str,
) -> DbResult<Option<Sale>> {
    let sale = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE owner_id = ?1 AND id = ?2"
    ))
    .bind(owner_id)
    .bind(sale_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale)
}

/// Lists all sales for a customer under the given owner, oldest first.
pub async fn list_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<Vec<Sale>> {
    let sales = sqlx::query_as::<_, Sale>(&format!(
        "SELECT {SALE_COLUMNS} FROM sales \
         WHERE owner_id = ?1 AND customer_id = ?2 ORDER BY created_at, id"
    ))
    .bind(owner_id)
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(sales)
}

/// Gets all line items of a sale under the given owner.
pub async fn get_items(
    conn: &mut SqliteConnection,
    owner_id: &str,
    sale_id: &str,
) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT id, sale_id, owner_id, name, quantity, unit_price_paise, line_total_paise
        FROM sale_items
        WHERE owner_id = ?1 AND sale_id = ?2
        ORDER BY id
        "#,
    )
    .bind(owner_id)
    .bind(sale_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(items)
}

/// Deletes all items of one sale. Runs before the sale row itself.
pub async fn delete_items_by_sale(
    conn: &mut SqliteConnection,
    owner_id: &str,
    sale_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM sale_items WHERE owner_id = ?1 AND sale_id = ?2")
        .bind(owner_id)
        .bind(sale_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Deletes a sale row under the given owner.
pub async fn delete_sale(
    conn: &mut SqliteConnection,
    owner_id: &str,
    sale_id: &str,
) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM sales WHERE owner_id = ?1 AND id = ?2")
        .bind(owner_id)
        .bind(sale_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Sale", sale_id));
    }

    Ok(())
}

/// Deletes every item of every sale of a customer (cascade path).
pub async fn delete_items_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM sale_items
        WHERE sale_id IN (
            SELECT id FROM sales WHERE owner_id = ?1 AND customer_id = ?2
        )
        "#,
    )
    .bind(owner_id)
    .bind(customer_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes every sale of a customer (cascade path). Items must go first.
pub async fn delete_sales_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM sales WHERE owner_id = ?1 AND customer_id = ?2")
        .bind(owner_id)
        .bind(customer_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Idempotency Keys
// =============================================================================

/// Looks up the sale a key was already used for, if any.
pub async fn find_idempotency_key(
    conn: &mut SqliteConnection,
    owner_id: &str,
    key: &str,
) -> DbResult<Option<String>> {
    let sale_id = sqlx::query_scalar::<_, String>(
        "SELECT sale_id FROM idempotency_keys WHERE owner_id = ?1 AND key = ?2",
    )
    .bind(owner_id)
    .bind(key)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(sale_id)
}

/// Records a sale-creation key in the same transaction as the sale.
pub async fn insert_idempotency_key(
    conn: &mut SqliteConnection,
    owner_id: &str,
    key: &str,
    sale_id: &str,
    customer_id: &str,
    created_at: chrono::DateTime<chrono::Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO idempotency_keys (owner_id, key, sale_id, customer_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(owner_id)
    .bind(key)
    .bind(sale_id)
    .bind(customer_id)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Drops the keys that point at one sale.
///
/// Runs when the sale itself is deleted; a later replay of such a key is a
/// fresh request, not a retry of a still-live sale.
pub async fn delete_idempotency_keys_by_sale(
    conn: &mut SqliteConnection,
    owner_id: &str,
    sale_id: &str,
) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM idempotency_keys WHERE owner_id = ?1 AND sale_id = ?2")
        .bind(owner_id)
        .bind(sale_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Drops a customer's idempotency keys (cascade path).
pub async fn delete_idempotency_keys_by_customer(
    conn: &mut SqliteConnection,
    owner_id: &str,
    customer_id: &str,
) -> DbResult<u64> {
    let result =
        sqlx::query("DELETE FROM idempotency_keys WHERE owner_id = ?1 AND customer_id = ?2")
            .bind(owner_id)
            .bind(customer_id)
            .execute(&mut *conn)
            .await?;

    Ok(result.rows_affected())
}
