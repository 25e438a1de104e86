//! Payment API handlers

use axum::{
    Extension, Json, body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{application, payment};
use crate::gateway::CheckoutSession;
use crate::services::payments;
use crate::utils::{AppError, AppResult};
use shared::models::Payment;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub application_id: i64,
}

/// POST /api/payments/checkout - open a checkout session for a selected
/// application
pub async fn create_checkout(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutSession>> {
    let app = application::find_by_id(&state.pool, payload.application_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Application {} not found", payload.application_id))
        })?;
    if app.user_id != current.id && !current.is_admin() {
        return Err(AppError::forbidden("not your application"));
    }

    let session = payments::create_checkout_session(
        &state.pool,
        state.payment_gateway.as_ref(),
        &state.config.payment,
        payload.application_id,
    )
    .await?;
    Ok(Json(session))
}

/// POST /api/payments/webhook - processor notification (raw body, HMAC
/// header)
pub async fn webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::authenticity("Missing webhook signature header"))?;

    payments::handle_notification(
        &state.pool,
        state.payment_gateway.as_ref(),
        &state.ledger,
        &state.config.public_base_url,
        &body,
        signature,
    )
    .await?;

    Ok(Json(serde_json::json!({ "received": true })))
}

/// GET /api/payments/application/{id} - payment status for an application
pub async fn get_by_application(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Payment>> {
    let app = application::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Application {id} not found")))?;
    if app.user_id != current.id && !current.is_admin() {
        return Err(AppError::forbidden("not your application"));
    }

    let pay = payment::find_by_application_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No payment for application {id}")))?;
    Ok(Json(pay))
}
