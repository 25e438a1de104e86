//! User API module
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/users/me | GET | bearer |
//! | /api/users/me/wallet | PUT | bearer |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/me", get(handler::me))
        .route("/me/wallet", put(handler::set_wallet))
}
