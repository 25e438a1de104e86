//! Shared domain types for the Seatchain workspace
//!
//! Holds everything both the server and its clients need to agree on:
//!
//! - **Models** (`models`): lottery / payment / ticket / certificate entities
//!   and their status machines
//! - **Messages** (`message`): live-channel payloads
//! - **Utilities** (`util`): timestamps
//!
//! Enable the `db` feature to derive `sqlx` row mappings on the models.

pub mod message;
pub mod models;
pub mod util;

pub use message::{BusMessage, CheckInNotice};
pub use models::{
    Application, ApplicationStatus, Certificate, Event, EventStatus, Payment, PaymentStatus,
    Ticket, User,
};
