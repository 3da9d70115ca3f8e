//! Line format of the credential file: `username:passwordHash`.

use crate::error::{CasinoError, Result};

/// One registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

impl UserRecord {
    /// Parse one line of the credential file.
    ///
    /// Blank lines and lines without a `:` separator yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (username, password_hash) = line.split_once(':')?;
        if username.is_empty() {
            return None;
        }
        Some(Self {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    /// Serialize as a newline-terminated line.
    pub fn to_line(&self) -> String {
        format!("{}:{}\n", self.username, self.password_hash)
    }
}

/// Reject usernames that would break the line format.
pub fn check_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(CasinoError::InvalidInput(
            "Username cannot be empty".to_string(),
        ));
    }
    if username.contains([':', '\r', '\n']) {
        return Err(CasinoError::InvalidInput(
            "Username cannot contain ':' or line breaks".to_string(),
        ));
    }
    Ok(())
}

/// Iterate the records of a plaintext credential file.
pub fn records(contents: &str) -> impl Iterator<Item = UserRecord> + '_ {
    contents.lines().filter_map(UserRecord::parse_line)
}
