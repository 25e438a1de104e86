//! Application Repository

use super::{RepoError, RepoResult};
use shared::models::{Application, ApplicationStatus};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, user_id, event_id, status, application_order, lottery_round, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Application>> {
    let app =
        sqlx::query_as::<_, Application>(&format!("SELECT {COLUMNS} FROM application WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(app)
}

pub async fn exists_for_user_and_event(
    pool: &SqlitePool,
    user_id: i64,
    event_id: i64,
) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM application WHERE user_id = ? AND event_id = ?",
    )
    .bind(user_id)
    .bind(event_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

/// Record interest; status starts at APPLIED.
///
/// The (user_id, event_id) unique index turns a duplicate apply into
/// `RepoError::Duplicate`.
pub async fn create(pool: &SqlitePool, user_id: i64, event_id: i64) -> RepoResult<Application> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, Application>(&format!(
        "INSERT INTO application (user_id, event_id, status, created_at, updated_at) \
         VALUES (?, ?, 'APPLIED', ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(user_id)
    .bind(event_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// All APPLIED applications for an event, ordered by creation time
pub async fn find_applied_for_event(
    pool: &SqlitePool,
    event_id: i64,
) -> RepoResult<Vec<Application>> {
    let apps = sqlx::query_as::<_, Application>(&format!(
        "SELECT {COLUMNS} FROM application WHERE event_id = ? AND status = 'APPLIED' \
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(apps)
}

pub async fn find_by_event(pool: &SqlitePool, event_id: i64) -> RepoResult<Vec<Application>> {
    let apps = sqlx::query_as::<_, Application>(&format!(
        "SELECT {COLUMNS} FROM application WHERE event_id = ? ORDER BY created_at ASC, id ASC"
    ))
    .bind(event_id)
    .fetch_all(pool)
    .await?;
    Ok(apps)
}

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Application>> {
    let apps = sqlx::query_as::<_, Application>(&format!(
        "SELECT {COLUMNS} FROM application WHERE user_id = ? ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(apps)
}

/// Lottery result write: status + 1-based rank + round, in one statement.
///
/// Only APPLIED rows are eligible; the allocator owns this transition.
pub async fn assign_lottery_result(
    pool: &SqlitePool,
    id: i64,
    status: ApplicationStatus,
    application_order: i64,
    lottery_round: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE application SET status = ?, application_order = ?, lottery_round = ?, \
         updated_at = ? WHERE id = ? AND status = 'APPLIED'",
    )
    .bind(status)
    .bind(application_order)
    .bind(lottery_round)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Application {id} not found or not in APPLIED state"
        )));
    }
    Ok(())
}

/// Write the whole lottery outcome atomically: every applicant's status,
/// rank and round, plus the event's OPEN → LOTTERY_DONE commit, in a single
/// transaction. Any failure rolls the lot back, so a retry always starts
/// from the full APPLIED set.
///
/// Returns `false` (writing nothing) when the event was not OPEN - the
/// caller must treat that as a rejected re-trigger.
pub async fn commit_lottery_results(
    pool: &SqlitePool,
    event_id: i64,
    assignments: &[(i64, ApplicationStatus, i64)],
    lottery_round: i64,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE event SET status = 'LOTTERY_DONE', updated_at = ? \
         WHERE id = ? AND status = 'OPEN'",
    )
    .bind(now)
    .bind(event_id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() != 1 {
        tx.rollback().await?;
        return Ok(false);
    }

    for (id, status, application_order) in assignments {
        let rows = sqlx::query(
            "UPDATE application SET status = ?, application_order = ?, lottery_round = ?, \
             updated_at = ? WHERE id = ? AND status = 'APPLIED'",
        )
        .bind(status)
        .bind(application_order)
        .bind(lottery_round)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if rows.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(RepoError::NotFound(format!(
                "Application {id} not found or not in APPLIED state"
            )));
        }
    }

    tx.commit().await?;
    Ok(true)
}
