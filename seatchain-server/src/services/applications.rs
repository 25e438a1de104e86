//! Application intake
//!
//! Records interest in an event: one application per (user, event),
//! and only while the event is OPEN.

use sqlx::SqlitePool;

use crate::db::repository::{RepoError, application, event};
use crate::utils::{AppError, AppResult};
use shared::models::{Application, EventStatus};

pub async fn apply(pool: &SqlitePool, user_id: i64, event_id: i64) -> AppResult<Application> {
    let event = event::find_by_id(pool, event_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Event {event_id} not found")))?;

    if event.status != EventStatus::Open {
        return Err(AppError::validation("Applications are closed for this event"));
    }

    if application::exists_for_user_and_event(pool, user_id, event_id).await? {
        return Err(AppError::validation("Already applied to this event"));
    }

    // The unique index still backstops a concurrent duplicate apply
    match application::create(pool, user_id, event_id).await {
        Ok(app) => {
            tracing::info!(user_id, event_id, application_id = app.id, "Application recorded");
            Ok(app)
        }
        Err(RepoError::Duplicate(_)) => {
            Err(AppError::validation("Already applied to this event"))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil;
    use shared::models::ApplicationStatus;

    #[tokio::test]
    async fn records_an_application_for_an_open_event() {
        let pool = testutil::pool().await;
        let user = testutil::seed_user(&pool, "a@example.com", None).await;
        let event = testutil::seed_open_event(&pool, 10, 0).await;

        let app = apply(&pool, user.id, event.id).await.unwrap();
        assert_eq!(app.status, ApplicationStatus::Applied);
        assert_eq!(app.application_order, None);
    }

    #[tokio::test]
    async fn rejects_duplicate_applications() {
        let pool = testutil::pool().await;
        let user = testutil::seed_user(&pool, "a@example.com", None).await;
        let event = testutil::seed_open_event(&pool, 10, 0).await;

        apply(&pool, user.id, event.id).await.unwrap();
        let err = apply(&pool, user.id, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_closed_events_and_unknown_events() {
        let pool = testutil::pool().await;
        let user = testutil::seed_user(&pool, "a@example.com", None).await;
        let event = testutil::seed_event(&pool, 10, 0, EventStatus::Draft, -1000).await;

        let err = apply(&pool, user.id, event.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = apply(&pool, user.id, 9999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
