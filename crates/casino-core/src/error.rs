//! Error types for casino core operations.
//!
//! Errors are descriptive at the core level; the server maps them to
//! log events and user-facing page messages.

use thiserror::Error;

/// Result type alias for casino core operations.
pub type Result<T> = std::result::Result<T, CasinoError>;

/// Core error type.
#[derive(Debug, Error)]
pub enum CasinoError {
    /// Incorrect passphrase while decrypting the credential file
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// Encryption or decryption error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Credential file or lock error
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error (fallback)
    #[error("{0}")]
    Other(String),
}
