//! Input validation helpers shared by the CRUD handlers.

use crate::server::controller::error::CustomError;

/// Entity names: food, menu, category, person names.
pub const MAX_NAME_LEN: usize = 200;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Phone numbers and payment methods.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Image references.
pub const MAX_URL_LEN: usize = 2048;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

fn invalid(detail: String) -> CustomError {
    CustomError::BadRequest { detail }
}

/// Unwrap a required field.
pub fn required<T>(value: Option<T>, field: &str) -> Result<T, CustomError> {
    value.ok_or_else(|| invalid(format!("{field} is required")))
}

/// Validate that a required string is present, non-empty and within the length limit.
pub fn required_text(value: Option<String>, field: &str, max_len: usize) -> Result<String, CustomError> {
    let value = required(value, field)?;
    validate_text(&value, field, max_len)?;
    Ok(value)
}

/// Validate a string that is present, e.g. on a partial update.
pub fn validate_text(value: &str, field: &str, max_len: usize) -> Result<(), CustomError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(invalid(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), CustomError> {
    validate_text(value, "email", MAX_EMAIL_LEN)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid("email is invalid".to_string())),
    }
}

pub fn validate_password(value: &str) -> Result<(), CustomError> {
    if value.len() < MIN_PASSWORD_LEN || value.len() > MAX_PASSWORD_LEN {
        return Err(invalid(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} chars"
        )));
    }
    Ok(())
}

pub fn validate_price(value: f64, field: &str) -> Result<(), CustomError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{field} must be a non-negative number")));
    }
    Ok(())
}

/// Counts such as quantity, table number and guests start at one.
pub fn validate_count(value: i64, field: &str) -> Result<(), CustomError> {
    if value < 1 {
        return Err(invalid(format!("{field} must be at least 1")));
    }
    Ok(())
}
