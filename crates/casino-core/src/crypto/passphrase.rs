//! Passphrase validation.
//!
//! Enforces minimum requirements for the credential file passphrase.

use crate::error::{CasinoError, Result};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_LENGTH: usize = 8;

/// Validate that the file passphrase meets minimum requirements.
///
/// # Examples
///
/// ```
/// use casino_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("my-secure-passphrase-123").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(CasinoError::InvalidInput(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(CasinoError::InvalidInput(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}
