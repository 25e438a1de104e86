//! Payment API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/payments/checkout | POST | bearer |
//! | /api/payments/webhook | POST | HMAC signature |
//! | /api/payments/application/{id} | GET | bearer |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/checkout", post(handler::create_checkout))
        .route("/webhook", post(handler::webhook))
        .route("/application/{id}", get(handler::get_by_application))
}
