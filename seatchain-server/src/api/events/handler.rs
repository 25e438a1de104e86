//! Event API handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use rand::SeedableRng;

use crate::auth::{CurrentUser, require_admin};
use crate::core::ServerState;
use crate::db::repository::{application, event};
use crate::services::lottery::{self, LotteryOutcome};
use crate::utils::validation::{MAX_NAME_LEN, MAX_TEXT_LEN, validate_optional_text, validate_positive, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::models::{Application, Event, EventCreate};

/// GET /api/events - all events, soonest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Event>>> {
    let events = event::find_all(&state.pool).await?;
    Ok(Json(events))
}

/// GET /api/events/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Event>> {
    let event = event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))?;
    Ok(Json(event))
}

/// POST /api/events - admin creation (seeding; full CRUD is owned elsewhere)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<EventCreate>,
) -> AppResult<Json<Event>> {
    require_admin(&user)?;

    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_NAME_LEN)?;
    validate_positive(payload.max_seats, "max_seats")?;
    if payload.price_cents < 0 {
        return Err(AppError::validation("price_cents must not be negative"));
    }

    let event = event::create(&state.pool, payload, Some(user.id)).await?;
    Ok(Json(event))
}

/// POST /api/events/{id}/lottery - run the seat lottery
pub async fn trigger_lottery(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<LotteryOutcome>> {
    require_admin(&user)?;

    // Owned rng: the shuffle happens across awaits, so it must be Send
    let mut rng = rand::rngs::StdRng::from_entropy();
    let outcome =
        lottery::trigger_lottery(&state.pool, &state.lottery_locks, id, &mut rng).await?;
    Ok(Json(outcome))
}

/// GET /api/events/{id}/applications - all applications for an event
pub async fn list_applications(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Application>>> {
    require_admin(&user)?;

    if event::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("Event {id} not found")));
    }
    let applications = application::find_by_event(&state.pool, id).await?;
    Ok(Json(applications))
}
