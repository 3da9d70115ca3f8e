//! Encrypted flat-file credential store.
//!
//! Every operation runs one critical section under a single mutex:
//! decrypt the file in place, read or rewrite it, re-encrypt it. The
//! [`Plaintext`] guard re-encrypts on drop, so early returns and errors
//! never leave the file in plaintext once the lock is released.
//!
//! Password hashing happens before the lock is taken and verification
//! after it is released; only file access is serialized.

mod record;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use age::secrecy::SecretString;
use tracing::{debug, error, info};
use zeroize::Zeroizing;

use crate::crypto::{validate_passphrase, CryptoWrapper, PasswordHasher, PasswordParams};
use crate::error::{CasinoError, Result};
use crate::fs::write_atomic;

pub use record::{check_username, UserRecord};

/// Tuning for the store's two one-way/symmetric primitives.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// scrypt work factor (log2 N) used when sealing the file.
    pub work_factor: u8,
    /// Argon2id cost for new password hashes.
    pub password: PasswordParams,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            work_factor: 15,
            password: PasswordParams::default(),
        }
    }
}

/// The encrypted user database.
pub struct CredentialStore {
    wrapper: Mutex<CryptoWrapper>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    /// Open (or create) the credential file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the passphrase is too weak or does not open the file, or if
    /// the file cannot be created or resealed.
    pub fn open(path: &Path, passphrase: &str, options: StoreOptions) -> Result<Self> {
        validate_passphrase(passphrase)?;
        let hasher = PasswordHasher::new(options.password)?;
        let wrapper = CryptoWrapper::open(
            path,
            SecretString::from(passphrase.to_string()),
            options.work_factor,
        )?;

        Ok(Self {
            wrapper: Mutex::new(wrapper),
            hasher,
        })
    }

    /// Path of the credential file.
    pub fn path(&self) -> Result<PathBuf> {
        Ok(self.lock()?.path().to_path_buf())
    }

    /// `true` while the file holds ciphertext. Always `true` between
    /// operations unless a reseal failed.
    pub fn is_encrypted(&self) -> Result<bool> {
        Ok(self.lock()?.is_encrypted())
    }

    /// Returns `true` if a record for `username` exists.
    pub fn find_user(&self, username: &str) -> Result<bool> {
        self.with_plaintext("find_user", |file| {
            Ok(file.lookup(username)?.is_some())
        })
    }

    /// Register a new user.
    ///
    /// Returns `Ok(false)` without writing if the username is taken.
    pub fn create_user(&self, username: &str, password: &str) -> Result<bool> {
        check_username(username)?;
        let record = UserRecord {
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
        };

        let created = self.with_plaintext("create_user", |file| {
            if file.lookup(username)?.is_some() {
                return Ok(false);
            }
            file.append(&record)?;
            Ok(true)
        })?;

        if created {
            info!(user = username, "user registered");
        } else {
            debug!(user = username, "registration rejected: user exists");
        }
        Ok(created)
    }

    /// Check `password` against the stored hash for `username`.
    ///
    /// Unknown users and wrong passwords both return `Ok(false)`.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let stored = self.with_plaintext("authenticate", |file| file.lookup(username))?;

        match stored {
            Some(record) => self.hasher.verify(password, &record.password_hash),
            None => Ok(false),
        }
    }

    /// All registered usernames in file order.
    pub fn usernames(&self) -> Result<Vec<String>> {
        self.with_plaintext("usernames", |file| {
            let contents = file.read()?;
            let names = record::records(&contents).map(|r| r.username).collect();
            Ok(names)
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, CryptoWrapper>> {
        self.wrapper
            .lock()
            .map_err(|_| CasinoError::Storage("Credential store lock poisoned".to_string()))
    }

    /// Run `op` against the decrypted file and reseal before unlocking.
    fn with_plaintext<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&mut Plaintext<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut wrapper = self.lock()?;
        let mut file = Plaintext::open(&mut wrapper)?;

        let outcome = op(&mut file);
        let sealed = file.seal();

        if let Err(err) = &outcome {
            error!(operation, error = %err, "credential store operation failed");
        }
        match (outcome, sealed) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) => Err(err),
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("wrapper", &self.wrapper)
            .field("hasher", &self.hasher)
            .finish()
    }
}

/// Scoped plaintext access to the credential file.
///
/// Exists only while the store lock is held. Dropping it without calling
/// [`Plaintext::seal`] still re-encrypts the file.
struct Plaintext<'a> {
    wrapper: &'a mut CryptoWrapper,
}

impl<'a> Plaintext<'a> {
    fn open(wrapper: &'a mut CryptoWrapper) -> Result<Self> {
        wrapper.decrypt_in_place()?;
        Ok(Self { wrapper })
    }

    fn read(&self) -> Result<Zeroizing<String>> {
        let contents = fs::read_to_string(self.wrapper.path()).map_err(|e| {
            CasinoError::Storage(format!("Failed to read credential file: {}", e))
        })?;
        Ok(Zeroizing::new(contents))
    }

    fn lookup(&self, username: &str) -> Result<Option<UserRecord>> {
        let contents = self.read()?;
        let found = record::records(&contents).find(|r| r.username == username);
        Ok(found)
    }

    fn append(&mut self, record: &UserRecord) -> Result<()> {
        let mut contents = self.read()?;
        if !contents.is_empty() && !contents.ends_with('\n') {
            contents.push('\n');
        }
        contents.push_str(&record.to_line());
        write_atomic(self.wrapper.path(), contents.as_bytes())
    }

    fn seal(self) -> Result<()> {
        self.wrapper.encrypt_in_place()
    }
}

impl Drop for Plaintext<'_> {
    fn drop(&mut self) {
        if !self.wrapper.is_encrypted() {
            // seal() failed or was skipped; one more attempt, then report.
            if let Err(err) = self.wrapper.encrypt_in_place() {
                error!(
                    path = %self.wrapper.path().display(),
                    error = %err,
                    "credential file left in plaintext"
                );
            }
        }
    }
}
