//! Application Model

use serde::{Deserialize, Serialize};

/// Application status
///
/// APPLIED → SELECTED | WAITLISTED (lottery) → PAID (payment reconciler).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ApplicationStatus {
    Applied,
    Selected,
    Waitlisted,
    Paid,
}

/// Application entity
///
/// At most one per (user, event) — enforced by a unique index.
/// `application_order` is the 1-based rank assigned by the lottery
/// permutation, dense within an event once the lottery has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub status: ApplicationStatus,
    pub application_order: Option<i64>,
    pub lottery_round: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}
