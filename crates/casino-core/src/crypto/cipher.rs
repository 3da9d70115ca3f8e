//! Age encryption/decryption of byte buffers.
//!
//! Age derives the file key from the passphrase with scrypt. The work
//! factor is the base-2 logarithm of scrypt's N and is fixed per process
//! by configuration.

use std::io::{Read, Write};
use std::iter;

use age::secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::error::{CasinoError, Result};

/// Leading bytes of every age-encrypted payload.
pub const AGE_MAGIC: &[u8] = b"age-encryption.org/v1";

/// Returns `true` if `bytes` carry the age header.
pub fn is_age_payload(bytes: &[u8]) -> bool {
    bytes.starts_with(AGE_MAGIC)
}

/// Encrypt data using age passphrase-based encryption.
///
/// # Examples
///
/// ```
/// use age::secrecy::SecretString;
/// use casino_core::crypto::cipher::encrypt;
///
/// let passphrase = SecretString::from("my-secure-passphrase".to_string());
/// let encrypted = encrypt(b"secret data", &passphrase, 10).unwrap();
/// assert_ne!(encrypted.as_slice(), b"secret data");
/// ```
pub fn encrypt(data: &[u8], passphrase: &SecretString, work_factor: u8) -> Result<Vec<u8>> {
    if work_factor == 0 || work_factor >= 64 {
        return Err(CasinoError::InvalidInput(format!(
            "scrypt work factor must be between 1 and 63 (got {})",
            work_factor
        )));
    }

    let mut recipient =
        age::scrypt::Recipient::new(SecretString::from(passphrase.expose_secret().to_string()));
    recipient.set_work_factor(work_factor);

    let encryptor = age::Encryptor::with_recipients(iter::once(&recipient as &dyn age::Recipient))
        .map_err(|e| CasinoError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    let mut encrypted = Vec::new();
    let mut writer = encryptor
        .wrap_output(&mut encrypted)
        .map_err(|e| CasinoError::Crypto(format!("Failed to create encryptor: {}", e)))?;

    writer
        .write_all(data)
        .map_err(|e| CasinoError::Crypto(format!("Encryption write failed: {}", e)))?;

    writer
        .finish()
        .map_err(|e| CasinoError::Crypto(format!("Encryption finish failed: {}", e)))?;

    Ok(encrypted)
}

/// Decrypt data using age passphrase-based encryption.
///
/// # Errors
///
/// Returns `CasinoError::IncorrectPassphrase` if the passphrase does not
/// open the payload, and `CasinoError::Crypto` if the data is corrupted.
pub fn decrypt(encrypted_data: &[u8], passphrase: &SecretString) -> Result<Zeroizing<Vec<u8>>> {
    let decryptor = age::Decryptor::new(encrypted_data)
        .map_err(|e| CasinoError::Crypto(format!("Failed to create decryptor: {}", e)))?;

    let identity =
        age::scrypt::Identity::new(SecretString::from(passphrase.expose_secret().to_string()));
    let mut reader = decryptor
        .decrypt(iter::once(&identity as &dyn age::Identity))
        .map_err(|e| match e {
            age::DecryptError::NoMatchingKeys
            | age::DecryptError::DecryptionFailed
            | age::DecryptError::KeyDecryptionFailed => CasinoError::IncorrectPassphrase,
            _ => CasinoError::Crypto(format!("Decryption failed: {}", e)),
        })?;

    let mut decrypted = Zeroizing::new(Vec::new());
    reader
        .read_to_end(&mut decrypted)
        .map_err(|e| CasinoError::Crypto(format!("Failed to read decrypted data: {}", e)))?;

    Ok(decrypted)
}
