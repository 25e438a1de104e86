//! User Model

use serde::{Deserialize, Serialize};

/// User entity
///
/// Identity is owned by an external auth service; the server only keeps the
/// columns the ticketing workflow reads (wallet for minting, display name
/// for check-in broadcasts and certificates).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    /// On-chain wallet address; tickets for wallet-less users are minted to
    /// the null address
    pub wallet_address: Option<String>,
    pub role: String,
    pub created_at: i64,
}

impl User {
    /// Display name with email fallback
    pub fn name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub display_name: Option<String>,
    pub wallet_address: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "ATTENDEE".to_string()
}
