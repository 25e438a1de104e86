//! Event Repository
//!
//! Event CRUD belongs to an external collaborator; the workflow only needs
//! the read model. The OPEN → LOTTERY_DONE transition is written by the
//! allocator's transactional commit in the application repository.

use super::RepoResult;
use shared::models::{Event, EventCreate, EventStatus};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, title, description, location, event_date, price_cents, currency, \
                       max_seats, lottery_deadline, status, created_by, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Event>> {
    let event = sqlx::query_as::<_, Event>(&format!("SELECT {COLUMNS} FROM event WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(event)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Event>> {
    let events =
        sqlx::query_as::<_, Event>(&format!("SELECT {COLUMNS} FROM event ORDER BY event_date ASC"))
            .fetch_all(pool)
            .await?;
    Ok(events)
}

pub async fn create(pool: &SqlitePool, data: EventCreate, created_by: Option<i64>) -> RepoResult<Event> {
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, Event>(&format!(
        "INSERT INTO event (title, description, location, event_date, price_cents, currency, \
         max_seats, lottery_deadline, status, created_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(&data.title)
    .bind(&data.description)
    .bind(&data.location)
    .bind(data.event_date)
    .bind(data.price_cents)
    .bind(&data.currency)
    .bind(data.max_seats)
    .bind(data.lottery_deadline)
    .bind(data.status)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Status write used by the owning collaborator (and test fixtures)
pub async fn set_status(pool: &SqlitePool, id: i64, status: EventStatus) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE event SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
