//! Event Model

use serde::{Deserialize, Serialize};

/// Event lifecycle status
///
/// The lottery is the only stage here that writes this field:
/// OPEN → LOTTERY_DONE is its commit point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EventStatus {
    Draft,
    Open,
    LotteryDone,
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Event entity
///
/// Event CRUD is owned by an external collaborator; the workflow reads
/// capacity, price and deadline, and flips `status` once the lottery runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Event date (Unix timestamp millis)
    pub event_date: i64,
    /// Ticket price in minor units (cents)
    pub price_cents: i64,
    pub currency: String,
    pub max_seats: i64,
    /// Applications close and the lottery may run from this instant on
    pub lottery_deadline: i64,
    pub status: EventStatus,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create event payload (admin / seeding)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreate {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub event_date: i64,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub max_seats: i64,
    pub lottery_deadline: i64,
    #[serde(default)]
    pub status: EventStatus,
}

fn default_currency() -> String {
    "USD".to_string()
}
