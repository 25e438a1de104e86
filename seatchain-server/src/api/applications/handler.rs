//! Application API handlers

use axum::{
    Extension, Json,
    extract::State,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{application, user};
use crate::services::applications;
use crate::utils::AppResult;
use shared::models::Application;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub event_id: i64,
}

/// POST /api/applications - apply for an event's lottery
pub async fn apply(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ApplyRequest>,
) -> AppResult<Json<Application>> {
    // First workflow write for this identity mirrors it into the store
    user::upsert_identity(
        &state.pool,
        current.id,
        &current.email,
        &current.display_name,
        &current.role,
    )
    .await?;

    let app = applications::apply(&state.pool, current.id, payload.event_id).await?;
    Ok(Json(app))
}

/// GET /api/applications/me - the caller's applications
pub async fn my_applications(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Application>>> {
    let apps = application::find_by_user(&state.pool, current.id).await?;
    Ok(Json(apps))
}
