//! Password hashing using Argon2id.
//!
//! Each stored credential is a PHC string (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`)
//! produced with a fresh random salt. Verification reads the parameters
//! back from the stored string, so records hashed under older parameters
//! keep verifying after the configuration changes.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{CasinoError, Result};

/// Argon2id cost parameters.
///
/// Defaults follow the `argon2` crate's recommended minimums:
/// - Memory: 19 MiB
/// - Iterations: 2
/// - Parallelism: 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way password hasher with a fixed cost for the process lifetime.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Build a hasher from cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `CasinoError::Crypto` if Argon2 rejects the parameters.
    pub fn new(params: PasswordParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| CasinoError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CasinoError::Crypto(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored PHC string.
    ///
    /// A mismatch is `Ok(false)`; a malformed stored hash is an error.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| CasinoError::Crypto(format!("Stored password hash is invalid: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CasinoError::Crypto(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(PasswordParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_verifies() {
        let hasher = cheap();
        let hash = hasher.hash("Secreto1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Secreto1", &hash).unwrap());
        assert!(!hasher.verify("Secreto2", &hash).unwrap());
    }

    #[test]
    fn test_salt_differs_per_hash() {
        let hasher = cheap();
        let first = hasher.hash("Secreto1").unwrap();
        let second = hasher.hash("Secreto1").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_never_contains_field_separator() {
        let hash = cheap().hash("Secreto1").unwrap();
        assert!(!hash.contains(':'));
        assert!(!hash.contains('\n'));
    }

    #[test]
    fn test_verify_uses_stored_parameters() {
        let hash = cheap().hash("Secreto1").unwrap();
        let stronger = PasswordHasher::new(PasswordParams {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();

        assert!(stronger.verify("Secreto1", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = cheap().verify("Secreto1", "not-a-phc-string");
        assert!(matches!(result, Err(CasinoError::Crypto(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PasswordHasher::new(PasswordParams {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        });
        assert!(result.is_err());
    }
}
