//! Payment Repository
//!
//! One payment row per application (unique index). The PENDING → COMPLETED
//! transition is the workflow's serialization point for duplicate webhook
//! deliveries: `complete_if_pending` is a compare-and-set and exactly one
//! caller per session observes `true`. The winning transition carries the
//! application's PAID flip in the same transaction.

use super::{RepoError, RepoResult};
use shared::models::Payment;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, application_id, session_id, amount_cents, currency, status, \
                       transaction_hash, created_at, updated_at";

pub async fn find_by_application_id(
    pool: &SqlitePool,
    application_id: i64,
) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payment WHERE application_id = ?"
    ))
    .bind(application_id)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

pub async fn find_by_session_id(pool: &SqlitePool, session_id: &str) -> RepoResult<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payment WHERE session_id = ?"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    Ok(payment)
}

/// Create the PENDING payment for an application, or repoint the existing
/// PENDING row at a freshly created checkout session.
///
/// The application_id unique index guarantees a second concurrent checkout
/// cannot produce two rows. A payment that flipped to COMPLETED since the
/// caller's guard check matches neither arm and is rejected here.
pub async fn upsert_pending(
    pool: &SqlitePool,
    application_id: i64,
    session_id: &str,
    amount_cents: i64,
    currency: &str,
) -> RepoResult<Payment> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO payment (application_id, session_id, amount_cents, currency, status, \
         created_at, updated_at) VALUES (?, ?, ?, ?, 'PENDING', ?, ?) \
         ON CONFLICT(application_id) DO UPDATE SET \
         session_id = excluded.session_id, amount_cents = excluded.amount_cents, \
         currency = excluded.currency, updated_at = excluded.updated_at \
         WHERE payment.status = 'PENDING' \
         RETURNING {COLUMNS}"
    ))
    .bind(application_id)
    .bind(session_id)
    .bind(amount_cents)
    .bind(currency)
    .bind(now)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| RepoError::Validation("Payment already completed".to_string()))
}

/// PENDING → COMPLETED compare-and-set, with the application's
/// SELECTED → PAID flip in the same transaction.
///
/// Returns `true` for exactly one caller per session id; duplicates and
/// replays get `false`. The two writes commit together, so a completed
/// payment can never be observed with its application still SELECTED.
pub async fn complete_if_pending(pool: &SqlitePool, session_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE payment SET status = 'COMPLETED', updated_at = ? \
         WHERE session_id = ? AND status = 'PENDING'",
    )
    .bind(now)
    .bind(session_id)
    .execute(&mut *tx)
    .await?;

    let won = rows.rows_affected() == 1;
    if won {
        sqlx::query(
            "UPDATE application SET status = 'PAID', updated_at = ? \
             WHERE id = (SELECT application_id FROM payment WHERE session_id = ?)",
        )
        .bind(now)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(won)
}

/// Stamp the mint transaction hash - the durable idempotency marker
/// consulted by webhook replays and the reconciliation sweep.
pub async fn stamp_transaction_hash(
    pool: &SqlitePool,
    id: i64,
    transaction_hash: &str,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE payment SET transaction_hash = ?, updated_at = ? WHERE id = ?")
        .bind(transaction_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// COMPLETED payments that never got a mint stamp - input to the
/// reconciliation sweep.
pub async fn find_completed_unminted(pool: &SqlitePool) -> RepoResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {COLUMNS} FROM payment \
         WHERE status = 'COMPLETED' AND transaction_hash IS NULL ORDER BY updated_at ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(payments)
}
