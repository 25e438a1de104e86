//! API route modules
//!
//! One module per resource, each exposing a `router()` nested under
//! `/api/...`:
//!
//! - [`health`] - liveness probe
//! - [`events`] - event read model, admin creation, lottery trigger
//! - [`applications`] - application intake and listings
//! - [`payments`] - checkout sessions and the processor webhook
//! - [`tickets`] - the caller's minted tickets
//! - [`checkin`] - gate scan
//! - [`certificates`] - artifact download and public verification
//! - [`users`] - profile and wallet binding
//! - [`live`] - WebSocket fan-out of the broadcast bus

pub mod applications;
pub mod certificates;
pub mod checkin;
pub mod events;
pub mod health;
pub mod live;
pub mod payments;
pub mod tickets;
pub mod users;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
