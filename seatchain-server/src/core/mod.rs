//! Core module - configuration, state, server lifecycle

pub mod config;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::{Config, LedgerConfig, LedgerMode, PaymentConfig};
pub use server::Server;
pub use state::ServerState;
