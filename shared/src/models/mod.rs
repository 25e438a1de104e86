//! Domain models
//!
//! Entities follow the issuance workflow:
//!
//! ```text
//! Application (APPLIED) ──lottery──▶ SELECTED / WAITLISTED
//!       │ SELECTED
//!       ▼
//! Payment (PENDING) ──webhook──▶ COMPLETED ──mint──▶ Ticket
//!                                                      │ check-in
//!                                                      ▼
//!                                                 Certificate
//! ```
//!
//! Status fields are only ever written by the stage that owns the
//! transition; see the repository layer for the compare-and-set updates.

mod application;
mod certificate;
mod event;
mod payment;
mod ticket;
mod user;

pub use application::{Application, ApplicationStatus};
pub use certificate::Certificate;
pub use event::{Event, EventCreate, EventStatus};
pub use payment::{Payment, PaymentStatus};
pub use ticket::Ticket;
pub use user::{User, UserCreate};
