//! Application API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/applications | POST | bearer |
//! | /api/applications/me | GET | bearer |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/applications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::apply))
        .route("/me", get(handler::my_applications))
}
