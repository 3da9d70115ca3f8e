//! Username and password format checks.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CasinoError, Result};

/// `user@domain.tld`, ASCII word characters, two or three letter TLD.
/// Matched against the lowercased username.
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_]+@[a-z0-9_]+\.[a-z]{2,3}$").expect("Failed to compile e-mail regex")
});

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MAX_PASSWORD_CHARS: usize = 12;

/// Validate registration/login input.
///
/// Checks run in order and the first failure is reported:
/// both fields present, e-mail shaped username, password length, then
/// password contents (one uppercase letter and one digit).
///
/// # Errors
///
/// Returns `CasinoError::InvalidInput` with a message suitable for showing
/// on the login page.
pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        return Err(CasinoError::InvalidInput(
            "Username and password cannot be empty".to_string(),
        ));
    }

    if !EMAIL.is_match(&username.to_lowercase()) {
        return Err(CasinoError::InvalidInput(
            "The username is not a valid e-mail address".to_string(),
        ));
    }

    let length = password.chars().count();
    if !(MIN_PASSWORD_CHARS..=MAX_PASSWORD_CHARS).contains(&length) {
        return Err(CasinoError::InvalidInput(format!(
            "The password must be between {} and {} characters",
            MIN_PASSWORD_CHARS, MAX_PASSWORD_CHARS
        )));
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_upper || !has_digit {
        return Err(CasinoError::InvalidInput(
            "The password must contain at least one number and one uppercase letter".to_string(),
        ));
    }

    Ok(())
}
