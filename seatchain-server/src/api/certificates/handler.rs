//! Certificate API handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::ticket;
use crate::services::certificates;
use crate::utils::{AppError, AppResult};

/// GET /api/certificates/ticket/{ticket_id} - issue (or regenerate) and
/// download the artifact
pub async fn download(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(ticket_id): Path<i64>,
) -> AppResult<Response> {
    let ticket_row = ticket::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {ticket_id} not found")))?;
    if ticket_row.user_id != current.id && !current.is_admin() {
        return Err(AppError::forbidden("not your ticket"));
    }

    let artifact = certificates::generate_certificate(
        &state.pool,
        &state.ledger,
        &state.config.public_base_url,
        ticket_id,
    )
    .await?;

    let filename = format!("{}.txt", artifact.certificate.certificate_id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        artifact.bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub certificate_id: String,
    pub valid: bool,
}

/// GET /api/certificates/{certificate_id}/verify - public existence check
pub async fn verify(
    State(state): State<ServerState>,
    Path(certificate_id): Path<String>,
) -> AppResult<Json<VerifyResponse>> {
    let valid = certificates::verify_certificate(&state.pool, &certificate_id).await?;
    Ok(Json(VerifyResponse {
        certificate_id,
        valid,
    }))
}
