//! Check-in API handlers

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::auth::{CurrentUser, require_admin};
use crate::core::ServerState;
use crate::services::checkin;
use crate::utils::AppResult;
use shared::models::Ticket;

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub event_id: i64,
    pub token_id: i64,
}

/// POST /api/checkin - gate scan of a (event, token) pair
pub async fn check_in(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<Ticket>> {
    require_admin(&current)?;

    let ticket = checkin::check_in(
        &state.pool,
        &state.ledger,
        &state.live,
        payload.event_id,
        payload.token_id,
    )
    .await?;
    Ok(Json(ticket))
}
