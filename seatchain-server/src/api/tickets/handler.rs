//! Ticket API handlers

use axum::{Extension, Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::ticket;
use crate::utils::AppResult;
use shared::models::Ticket;

/// GET /api/tickets/me - the caller's minted tickets, newest first
pub async fn my_tickets(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Ticket>>> {
    let tickets = ticket::find_by_user(&state.pool, current.id).await?;
    Ok(Json(tickets))
}
