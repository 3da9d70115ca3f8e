//! In-place encryption of the credential file.
//!
//! `CryptoWrapper` owns the one credential file and a flag describing what
//! the file currently holds. The flag is only changed after the new bytes
//! have been renamed into place, and every transform first checks the age
//! header on disk, so the flag never disagrees with the file.
//!
//! The wrapper is not safe for concurrent use with itself; the credential
//! store keeps it behind a mutex.

use std::fs;
use std::path::{Path, PathBuf};

use age::secrecy::SecretString;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use super::cipher::{decrypt, encrypt, is_age_payload};
use crate::error::{CasinoError, Result};
use crate::fs::write_atomic;

/// Whole-file symmetric cipher over the credential file.
pub struct CryptoWrapper {
    path: PathBuf,
    passphrase: SecretString,
    work_factor: u8,
    encrypted: bool,
}

impl CryptoWrapper {
    /// Open the credential file, leaving it encrypted at rest.
    ///
    /// - A missing file is created empty and encrypted.
    /// - An encrypted file is test-decrypted so a wrong passphrase fails here
    ///   rather than on the first request.
    /// - A plaintext file (an operation was interrupted mid-flight) is
    ///   resealed immediately.
    ///
    /// # Errors
    ///
    /// Returns `CasinoError::IncorrectPassphrase` if the existing file does
    /// not open with `passphrase`, or a storage/crypto error if the file
    /// cannot be created or resealed.
    pub fn open(path: &Path, passphrase: SecretString, work_factor: u8) -> Result<Self> {
        let mut wrapper = Self {
            path: path.to_path_buf(),
            passphrase,
            work_factor,
            encrypted: false,
        };

        if !path.exists() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    CasinoError::Storage(format!(
                        "Failed to create credential directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            write_atomic(path, b"")?;
            wrapper.encrypt_in_place()?;
            info!(path = %path.display(), "created encrypted credential file");
            return Ok(wrapper);
        }

        let on_disk = fs::read(path)?;
        if is_age_payload(&on_disk) {
            decrypt(&on_disk, &wrapper.passphrase)?;
            wrapper.encrypted = true;
        } else {
            warn!(
                path = %path.display(),
                "credential file holds plaintext; resealing"
            );
            wrapper.encrypt_in_place()?;
        }

        Ok(wrapper)
    }

    /// Path of the credential file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` while the file holds ciphertext.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Replace the plaintext file with its ciphertext.
    ///
    /// Does nothing if the file is already encrypted. On failure the file is
    /// left as it was and the flag still describes it.
    pub fn encrypt_in_place(&mut self) -> Result<()> {
        self.transform(true)
    }

    /// Replace the encrypted file with its plaintext.
    ///
    /// Does nothing if the file is already plaintext. On failure the file is
    /// left as it was and the flag still describes it.
    pub fn decrypt_in_place(&mut self) -> Result<()> {
        self.transform(false)
    }

    fn transform(&mut self, encrypt_target: bool) -> Result<()> {
        if self.encrypted == encrypt_target {
            return Ok(());
        }

        let result = self.rewrite(encrypt_target);
        if let Err(err) = &result {
            let operation = if encrypt_target { "encrypt" } else { "decrypt" };
            error!(
                path = %self.path.display(),
                operation,
                encrypted = self.encrypted,
                error = %err,
                "credential file transform failed"
            );
        }
        result
    }

    fn rewrite(&mut self, encrypt_target: bool) -> Result<()> {
        let on_disk = Zeroizing::new(fs::read(&self.path)?);

        let actual = is_age_payload(&on_disk);
        if actual != self.encrypted {
            warn!(
                path = %self.path.display(),
                expected = self.encrypted,
                actual,
                "encryption flag disagreed with file contents; resynced"
            );
            self.encrypted = actual;
            if actual == encrypt_target {
                return Ok(());
            }
        }

        if encrypt_target {
            let ciphertext = encrypt(&on_disk, &self.passphrase, self.work_factor)?;
            write_atomic(&self.path, &ciphertext)?;
        } else {
            let plaintext = decrypt(&on_disk, &self.passphrase)?;
            write_atomic(&self.path, &plaintext)?;
        }

        self.encrypted = encrypt_target;
        debug!(path = %self.path.display(), encrypted = encrypt_target, "credential file rewritten");
        Ok(())
    }
}

impl std::fmt::Debug for CryptoWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoWrapper")
            .field("path", &self.path)
            .field("passphrase", &"[REDACTED]")
            .field("work_factor", &self.work_factor)
            .field("encrypted", &self.encrypted)
            .finish()
    }
}
