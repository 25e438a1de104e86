//! Ticket API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/tickets/me | GET | bearer |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tickets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/me", get(handler::my_tickets))
}
