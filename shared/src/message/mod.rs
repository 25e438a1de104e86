//! Live-channel message types
//!
//! Messages published on the in-process broadcast bus and fanned out to
//! WebSocket subscribers. Topics are path-like strings, e.g.
//! `event/42/checkin`.

use serde::{Deserialize, Serialize};

/// Envelope for every live-channel message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub topic: String,
    pub payload: serde_json::Value,
    /// Publish time (Unix timestamp millis)
    pub timestamp: i64,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            timestamp: crate::util::now_millis(),
        }
    }
}

/// Check-in broadcast payload, published on `event/{event_id}/checkin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInNotice {
    pub event_id: i64,
    pub token_id: i64,
    pub attendee_name: String,
}

impl CheckInNotice {
    pub fn topic(&self) -> String {
        format!("event/{}/checkin", self.event_id)
    }
}
