//! Cryptographic operations for the credential file.
//!
//! - **Age**: whole-file passphrase encryption of the credential file
//!   (https://age-encryption.org/)
//! - **Argon2id**: salted, memory-hard password hashes stored per user
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the credential file at rest
//! - Offline brute-force of individual user passwords
//!
//! We do NOT defend against:
//! - A compromised host reading the file while an operation holds it in
//!   plaintext
//! - Theft of the server configuration holding the file passphrase

pub mod cipher;
pub mod passphrase;
pub mod password;
pub mod wrapper;

pub use passphrase::validate_passphrase;
pub use password::{PasswordHasher, PasswordParams};
pub use wrapper::CryptoWrapper;
