//! Ticket Model

use serde::{Deserialize, Serialize};

/// Ticket entity
///
/// Created once per successful mint; at most one per (user, event).
/// `checked_in` flips false → true exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ticket {
    pub id: i64,
    pub application_id: i64,
    pub event_id: i64,
    pub user_id: i64,
    /// Ledger-assigned token identifier, extracted from the mint receipt
    pub token_id: i64,
    pub transaction_hash: String,
    pub checked_in: bool,
    pub checked_in_at: Option<i64>,
    pub created_at: i64,
}
