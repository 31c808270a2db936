/// Input validation for login names.
///
/// Length limits keep pathological inputs out of the hot path; the charset
/// check rejects control characters and injection-style payloads before
/// anything reaches the store.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_LOGIN_LENGTH: usize = 3;
const MAX_LOGIN_LENGTH: usize = 64;

lazy_static! {
    static ref LOGIN_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap();
}

/// Validates a login name and returns the trimmed value.
pub fn is_valid_login(login: &str) -> Result<String, ValidationError> {
    let trimmed = login.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("login".to_string()));
    }

    if trimmed.len() < MIN_LOGIN_LENGTH {
        return Err(ValidationError::TooShort(
            "login".to_string(),
            MIN_LOGIN_LENGTH,
        ));
    }

    if trimmed.len() > MAX_LOGIN_LENGTH {
        return Err(ValidationError::TooLong(
            "login".to_string(),
            MAX_LOGIN_LENGTH,
        ));
    }

    if trimmed.contains('\0') || trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("login".to_string()));
    }

    if !LOGIN_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("login".to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_logins() {
        assert!(is_valid_login("alice").is_ok());
        assert!(is_valid_login("bob.smith").is_ok());
        assert!(is_valid_login("user_42").is_ok());
        assert!(is_valid_login("a-b-c").is_ok());
    }

    #[test]
    fn login_is_trimmed() {
        assert_eq!(is_valid_login("  alice  ").unwrap(), "alice");
    }

    #[test]
    fn rejects_empty_and_short() {
        assert!(is_valid_login("").is_err());
        assert!(is_valid_login("   ").is_err());
        assert!(is_valid_login("ab").is_err());
    }

    #[test]
    fn rejects_too_long() {
        let too_long = "a".repeat(MAX_LOGIN_LENGTH + 1);
        assert!(is_valid_login(&too_long).is_err());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(is_valid_login("alice bob").is_err());
        assert!(is_valid_login("alice'; DROP TABLE users--").is_err());
        assert!(is_valid_login(".leading-dot").is_err());
        assert!(is_valid_login("name\0null").is_err());
    }
}
