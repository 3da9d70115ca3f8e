//! State shared by every connection worker.

use casino_core::{CredentialStore, SessionRegistry};
use tracing::info;

use crate::games::Games;

#[derive(Debug)]
pub struct AppState {
    pub store: CredentialStore,
    pub sessions: SessionRegistry,
    pub games: Games,
}

impl AppState {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            sessions: SessionRegistry::new(),
            games: Games::standard(),
        }
    }

    /// Start a session for `username`, reusing `presented` if it already is
    /// the user's current token. Game state of a replaced token is dropped.
    pub fn start_session(&self, username: &str, presented: &str) -> String {
        if self.sessions.matches(username, presented) {
            return presented.to_string();
        }

        let issued = self.sessions.issue(username);
        if let Some(old) = &issued.superseded {
            self.games.forget(old);
            info!(user = username, "previous session replaced");
        }
        issued.token
    }

    /// End the session of `username` and drop its game state.
    pub fn end_session(&self, username: &str) {
        if let Some(token) = self.sessions.remove(username) {
            self.games.forget(&token);
        }
    }
}
