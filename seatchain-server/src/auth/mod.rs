//! Authentication module
//!
//! Identity is issued by an external auth service; this server only
//! validates bearer tokens signed with the shared secret and exposes the
//! caller as [`CurrentUser`].

pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtConfig, JwtService};
pub use middleware::require_auth;

use crate::utils::{AppError, AppResult};

pub const ROLE_ADMIN: &str = "ADMIN";

/// Authenticated caller, injected into request extensions by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = String;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| format!("non-numeric subject: {}", claims.sub))?;
        Ok(Self {
            id,
            email: claims.email,
            display_name: claims.name,
            role: claims.role,
        })
    }
}

/// Admin gate for operator-only endpoints (lottery trigger, check-in desk)
pub fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("admin role required"))
    }
}
