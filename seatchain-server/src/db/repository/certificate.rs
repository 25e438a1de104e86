//! Certificate Repository

use super::RepoResult;
use shared::models::Certificate;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, ticket_id, user_id, event_id, certificate_id, file_hash, \
                       transaction_hash, attendee_name, event_title, created_at";

pub async fn find_by_ticket_id(pool: &SqlitePool, ticket_id: i64) -> RepoResult<Option<Certificate>> {
    let cert = sqlx::query_as::<_, Certificate>(&format!(
        "SELECT {COLUMNS} FROM certificate WHERE ticket_id = ?"
    ))
    .bind(ticket_id)
    .fetch_optional(pool)
    .await?;
    Ok(cert)
}

pub async fn find_by_certificate_id(
    pool: &SqlitePool,
    certificate_id: &str,
) -> RepoResult<Option<Certificate>> {
    let cert = sqlx::query_as::<_, Certificate>(&format!(
        "SELECT {COLUMNS} FROM certificate WHERE certificate_id = ?"
    ))
    .bind(certificate_id)
    .fetch_optional(pool)
    .await?;
    Ok(cert)
}

/// `created_at` comes from the caller: the issue date is rendered into the
/// artifact before the insert, and the stored row must match it exactly for
/// regeneration to stay byte-identical.
#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &SqlitePool,
    ticket_id: i64,
    user_id: i64,
    event_id: i64,
    certificate_id: &str,
    file_hash: &str,
    transaction_hash: Option<&str>,
    attendee_name: &str,
    event_title: &str,
    created_at: i64,
) -> RepoResult<Certificate> {
    let row = sqlx::query_as::<_, Certificate>(&format!(
        "INSERT INTO certificate (ticket_id, user_id, event_id, certificate_id, file_hash, \
         transaction_hash, attendee_name, event_title, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(ticket_id)
    .bind(user_id)
    .bind(event_id)
    .bind(certificate_id)
    .bind(file_hash)
    .bind(transaction_hash)
    .bind(attendee_name)
    .bind(event_title)
    .bind(created_at)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
