//! # Casino Core
//!
//! Core library for the casino server: the pieces of a hand-rolled HTTP
//! server that carry protocol, concurrency and failure-handling concerns.
//!
//! This crate is independent of sockets, configuration files and page
//! content; the server crate wires it to the network.
//!
//! ## Architecture
//!
//! - **crypto**: whole-file `age` encryption of the credential file and
//!   Argon2id password hashing
//! - **store**: the encrypted flat-file user database and its locking
//! - **session**: in-memory username ↔ session token registry
//! - **http**: request parsing, form decoding and response headers
//! - **validation**: username/password format checks

pub mod crypto;
pub mod error;
pub mod fs;
pub mod http;
pub mod session;
pub mod store;
pub mod validation;

pub use error::{CasinoError, Result};
pub use session::SessionRegistry;
pub use store::{CredentialStore, StoreOptions};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
