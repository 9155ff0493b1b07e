/// Input validators for registration and profile updates
/// Features:
/// 1. Length limits on every field
/// 2. Email format validation
/// 3. Control-character rejection in names
/// 4. Password length policy (bcrypt only reads the first 72 bytes)

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 72;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).expect("email regex is valid");
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    // The local part is capped at 64 octets
    if let Some(at_pos) = trimmed.find('@') {
        if at_pos > 64 {
            return Err(ValidationError::SuspiciousContent("email"));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates a display name and returns it trimmed
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name"));
    }

    let length = trimmed.chars().count();
    if length < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort("name", MIN_NAME_LENGTH));
    }

    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name", MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("name"));
    }

    Ok(trimmed.to_string())
}

/// Validates password length. The password is never trimmed or echoed back.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
