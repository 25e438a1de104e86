//! Event API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/events | GET | bearer |
//! | /api/events/{id} | GET | bearer |
//! | /api/events | POST | admin |
//! | /api/events/{id}/lottery | POST | admin |
//! | /api/events/{id}/applications | GET | admin |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/events", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/lottery", post(handler::trigger_lottery))
        .route("/{id}/applications", get(handler::list_applications))
}
