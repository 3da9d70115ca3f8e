//! In-memory session registry.
//!
//! One active token per username: issuing a new token for a user
//! invalidates the previous one. Tokens never expire; they live until
//! superseded, removed at logout, or the process exits.
//!
//! Identity is always resolved from the token the client presents
//! ([`SessionRegistry::owner`]), never from shared "current user" state.

use dashmap::DashMap;
use uuid::Uuid;

/// Concurrent username ↔ token mapping.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_user: DashMap<String, String>,
    by_token: DashMap<String, String>,
}

/// Result of issuing a fresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issued {
    pub token: String,
    /// The token this one replaced, if the user already had a session.
    pub superseded: Option<String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token for `username`.
    pub fn get(&self, username: &str) -> Option<String> {
        self.by_user.get(username).map(|entry| entry.value().clone())
    }

    /// Register `token` as the only valid token for `username`.
    ///
    /// Returns the token it replaced.
    pub fn put(&self, username: &str, token: &str) -> Option<String> {
        self.by_token
            .insert(token.to_string(), username.to_string());
        let previous = self
            .by_user
            .insert(username.to_string(), token.to_string());

        if let Some(old) = &previous {
            if old != token {
                self.by_token.remove_if(old, |_, owner| owner == username);
            }
        }
        previous.filter(|old| old != token)
    }

    /// Generate a new random token for `username` and register it.
    pub fn issue(&self, username: &str) -> Issued {
        let token = Uuid::new_v4().to_string();
        let superseded = self.put(username, &token);
        Issued { token, superseded }
    }

    /// `true` if `token` is the current token of `username`.
    pub fn matches(&self, username: &str, token: &str) -> bool {
        !token.is_empty()
            && self
                .by_user
                .get(username)
                .is_some_and(|current| current.value() == token)
    }

    /// Username owning `token`, if the token is still current.
    pub fn owner(&self, token: &str) -> Option<String> {
        if token.is_empty() {
            return None;
        }
        let username = self.by_token.get(token).map(|entry| entry.value().clone())?;
        if self.matches(&username, token) {
            Some(username)
        } else {
            None
        }
    }

    /// Destroy the session of `username`. Returns the removed token.
    pub fn remove(&self, username: &str) -> Option<String> {
        let (_, token) = self.by_user.remove(username)?;
        self.by_token.remove(&token);
        Some(token)
    }

    /// Number of users with an active session.
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}
