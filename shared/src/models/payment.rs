//! Payment Model

use serde::{Deserialize, Serialize};

/// Payment status
///
/// PENDING → COMPLETED happens exactly once per session; the transition is
/// a compare-and-set in the repository and serializes duplicate webhook
/// deliveries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentStatus {
    Pending,
    Completed,
}

/// Payment entity (1:1 with an application)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub application_id: i64,
    /// External checkout session id (unique)
    pub session_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: PaymentStatus,
    /// Mint transaction hash. Set once minting succeeds; doubles as the
    /// durable "ticket already minted" marker consulted by webhook replays.
    pub transaction_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
