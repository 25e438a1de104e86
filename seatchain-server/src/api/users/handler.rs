//! User API handlers

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::{AppError, AppResult};
use shared::models::User;

/// GET /api/users/me - the caller's stored profile
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<User>> {
    let row = user::upsert_identity(
        &state.pool,
        current.id,
        &current.email,
        &current.display_name,
        &current.role,
    )
    .await?;
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct WalletRequest {
    pub wallet_address: String,
}

fn validate_wallet(address: &str) -> AppResult<()> {
    let hex_part = address.strip_prefix("0x").unwrap_or("");
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::validation(format!(
            "malformed wallet address: {address}"
        )));
    }
    Ok(())
}

/// PUT /api/users/me/wallet - bind the mint recipient address
pub async fn set_wallet(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<WalletRequest>,
) -> AppResult<Json<User>> {
    validate_wallet(&payload.wallet_address)?;

    user::upsert_identity(
        &state.pool,
        current.id,
        &current.email,
        &current.display_name,
        &current.role,
    )
    .await?;
    user::set_wallet_address(&state.pool, current.id, &payload.wallet_address).await?;

    let row = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::internal("User vanished after wallet update"))?;
    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_addresses_are_checked() {
        assert!(validate_wallet("0x1111111111111111111111111111111111111111").is_ok());
        assert!(validate_wallet("1111111111111111111111111111111111111111").is_err());
        assert!(validate_wallet("0x123").is_err());
        assert!(validate_wallet("0xzzzz111111111111111111111111111111111111").is_err());
    }
}
