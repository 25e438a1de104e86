//! Certificate API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/certificates/ticket/{ticket_id} | GET | bearer |
//! | /api/certificates/{certificate_id}/verify | GET | none |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/certificates", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/ticket/{ticket_id}", get(handler::download))
        .route("/{certificate_id}/verify", get(handler::verify))
}
