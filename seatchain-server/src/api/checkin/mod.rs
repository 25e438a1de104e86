//! Check-in API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/checkin | POST | admin |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/", post(handler::check_in))
}
