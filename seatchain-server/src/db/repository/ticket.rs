//! Ticket Repository

use super::RepoResult;
use shared::models::Ticket;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, application_id, event_id, user_id, token_id, transaction_hash, \
                       checked_in, checked_in_at, created_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!("SELECT {COLUMNS} FROM ticket WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

pub async fn find_by_user_and_event(
    pool: &SqlitePool,
    user_id: i64,
    event_id: i64,
) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM ticket WHERE user_id = ? AND event_id = ?"
    ))
    .bind(user_id)
    .bind(event_id)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

pub async fn find_by_event_and_token(
    pool: &SqlitePool,
    event_id: i64,
    token_id: i64,
) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM ticket WHERE event_id = ? AND token_id = ?"
    ))
    .bind(event_id)
    .bind(token_id)
    .fetch_optional(pool)
    .await?;
    Ok(ticket)
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM ticket WHERE user_id = ? ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

/// Persist a freshly minted ticket.
///
/// The (user_id, event_id) unique index is the at-most-one-mint backstop:
/// concurrent replays that both pass the exists-check collapse into
/// `RepoError::Duplicate` here.
pub async fn create(
    pool: &SqlitePool,
    application_id: i64,
    event_id: i64,
    user_id: i64,
    token_id: i64,
    transaction_hash: &str,
) -> RepoResult<Ticket> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, Ticket>(&format!(
        "INSERT INTO ticket (application_id, event_id, user_id, token_id, transaction_hash, \
         checked_in, created_at) VALUES (?, ?, ?, ?, ?, 0, ?) RETURNING {COLUMNS}"
    ))
    .bind(application_id)
    .bind(event_id)
    .bind(user_id)
    .bind(token_id)
    .bind(transaction_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// checked_in false → true compare-and-set.
///
/// Returns `false` when the ticket was already checked in; `checked_in_at`
/// is therefore written exactly once.
pub async fn set_checked_in(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE ticket SET checked_in = 1, checked_in_at = ? WHERE id = ? AND checked_in = 0",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}
