//! Certificate Model

use serde::{Deserialize, Serialize};

/// Certificate entity (1:1 with a ticket)
///
/// `attendee_name` and `event_title` are snapshotted at issue time so a
/// later regeneration renders byte-identical bytes even if the user or
/// event record changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Certificate {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub event_id: i64,
    /// Globally unique, printable id (`CERT-` + 16 hex chars)
    pub certificate_id: String,
    /// SHA-256 of the rendered artifact, hex-encoded
    pub file_hash: String,
    /// On-chain anchor transaction; NULL while unanchored (best-effort)
    pub transaction_hash: Option<String>,
    pub attendee_name: String,
    pub event_title: String,
    pub created_at: i64,
}
