//! Workflow services
//!
//! The issuance pipeline, one module per stage:
//!
//! ```text
//! applications ─▶ lottery ─▶ payments ─▶ minting ─▶ checkin ─▶ certificates
//! ```
//!
//! Each arrow is a state transition gated on the previous stage's terminal
//! state, not a direct call; stages are re-enterable under retries and
//! duplicate deliveries. External-system failures after a durable local
//! commit are absorbed here (logged, left for retry), never rolled back.

pub mod applications;
pub mod certificates;
pub mod checkin;
pub mod lottery;
pub mod minting;
pub mod payments;

#[cfg(test)]
pub(crate) mod testutil;
