//! Authentication middleware
//!
//! Validates `Authorization: Bearer <token>` and injects [`CurrentUser`]
//! into request extensions.
//!
//! # Paths that skip authentication
//!
//! - `OPTIONS *` (CORS preflight)
//! - non-`/api/` paths
//! - `/api/health`
//! - `/api/payments/webhook` (authenticated by HMAC signature instead)
//! - `/api/live/ws` (dashboard subscription)
//! - `/api/certificates/{id}/verify` (public verification)

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

fn is_public_path(path: &str) -> bool {
    path == "/api/health"
        || path == "/api/payments/webhook"
        || path == "/api/live/ws"
        || (path.starts_with("/api/certificates/") && path.ends_with("/verify"))
}

pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS || !path.starts_with("/api/") || is_public_path(path)
    {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without authorization header");
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {e}")))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(error = %e, uri = %req.uri(), "Token validation failed");
            Err(match e {
                crate::auth::jwt::JwtError::ExpiredToken => AppError::TokenExpired,
                other => AppError::invalid_token(other.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths_are_allowlisted() {
        assert!(is_public_path("/api/health"));
        assert!(is_public_path("/api/payments/webhook"));
        assert!(is_public_path("/api/certificates/CERT-AB12/verify"));
        assert!(!is_public_path("/api/certificates/ticket/9"));
        assert!(!is_public_path("/api/events"));
    }
}
