//! Request payload validation helpers

use crate::utils::{AppError, AppResult};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TEXT_LEN: usize = 2000;

/// Validate a required text field is non-blank and within length bounds
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate an optional text field, if present
pub fn validate_optional_text(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) => validate_required_text(v, field, max_len),
        None => Ok(()),
    }
}

/// Validate a positive integer (seats, amounts)
pub fn validate_positive(value: i64, field: &str) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_text_is_rejected() {
        assert!(validate_required_text("  ", "title", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("Rust Conf", "title", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn non_positive_values_are_rejected() {
        assert!(validate_positive(0, "max_seats").is_err());
        assert!(validate_positive(-3, "max_seats").is_err());
        assert!(validate_positive(5, "max_seats").is_ok());
    }
}
