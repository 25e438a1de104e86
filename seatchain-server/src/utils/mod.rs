//! Utility module - common helpers and types
//!
//! - [`AppError`] / [`AppResponse`] - unified error and response types
//! - [`AppResult`] - application result alias
//! - [`logger`] - tracing setup
//! - [`validation`] - request payload checks

pub mod error;
pub mod logger;
pub mod result;
pub mod validation;

pub use error::{AppError, AppResponse};
pub use result::AppResult;
