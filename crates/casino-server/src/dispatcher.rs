//! Request routing.
//!
//! Every request is answered from its own cookie: the session token is
//! resolved to its owner through the registry, so no routing decision
//! depends on another request.

use std::io::{self, Write};

use casino_core::http::{build, Method, Request, StatusClass};
use casino_core::validation::validate_credentials;
use casino_core::CasinoError;
use chrono::Local;
use tracing::{debug, error, info, warn};

use crate::games::Game;
use crate::pages::{self, Notice};
use crate::state::AppState;

const LOGIN_FAILED: &str = "Error: wrong username or password.";
const USER_EXISTS: &str = "Error: that user already exists.";
const ACCOUNT_CREATED: &str = "Congratulations! Your account has been created.";
const STORE_UNAVAILABLE: &str = "The service is temporarily unavailable. Please try again.";

/// A reply ready to be written to the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusClass,
    pub body: String,
    /// Token for the `Set-Cookie` header; empty clears the cookie.
    pub session_id: String,
}

impl Reply {
    pub fn page(body: String, session_id: String) -> Self {
        Self {
            status: StatusClass::Ok,
            body,
            session_id,
        }
    }

    /// Redirect to `/`, clearing the cookie.
    pub fn redirect() -> Self {
        Self {
            status: StatusClass::Redirect,
            body: String::new(),
            session_id: String::new(),
        }
    }

    pub fn not_found(session_id: String) -> Self {
        Self {
            status: StatusClass::NotFound,
            body: pages::error(),
            session_id,
        }
    }

    /// Reply to a request that could not be parsed.
    pub fn bad_request() -> Self {
        Self::not_found(String::new())
    }

    /// Status line and headers.
    pub fn head(&self) -> String {
        build(self.body.len(), self.status, &self.session_id)
    }

    /// Write headers and, unless redirecting, the body.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.head().as_bytes())?;
        if self.status.has_body() {
            writer.write_all(self.body.as_bytes())?;
        }
        writer.flush()
    }
}

/// Route one request.
pub fn dispatch(state: &AppState, request: &Request) -> Reply {
    let path = request.path.as_str();
    match &request.method {
        Method::Get => match path {
            "/" => Reply::page(pages::login(None), valid_cookie(state, request)),
            "/index" => gated(state, request, |username, token| {
                Reply::page(pages::index(username, Local::now()), token.to_string())
            }),
            "/logout" => gated(state, request, |username, _| {
                state.end_session(username);
                info!(user = username, "logged out");
                Reply::page(pages::logout(), String::new())
            }),
            _ => match state.games.by_path(path) {
                Some(game) => gated(state, request, |_, token| {
                    Reply::page(game.render(&game.view(token)), token.to_string())
                }),
                None => Reply::not_found(valid_cookie(state, request)),
            },
        },
        Method::Post => match path {
            "/" => login(state, request),
            _ => match state.games.by_path(path) {
                Some(game) => gated(state, request, |username, token| {
                    play(state, game, username, token, request)
                }),
                None => Reply::not_found(valid_cookie(state, request)),
            },
        },
        Method::Other(method) => {
            debug!(method = %method, path, "unsupported method");
            Reply::not_found(valid_cookie(state, request))
        }
    }
}

/// The presented cookie if it is a live session, otherwise empty.
fn valid_cookie(state: &AppState, request: &Request) -> String {
    match state.sessions.owner(&request.session_id) {
        Some(_) => request.session_id.clone(),
        None => String::new(),
    }
}

/// Run `handler` for the session owner, or redirect to the login page.
fn gated<F>(state: &AppState, request: &Request, handler: F) -> Reply
where
    F: FnOnce(&str, &str) -> Reply,
{
    match state.sessions.owner(&request.session_id) {
        Some(username) => handler(&username, &request.session_id),
        None => {
            debug!(path = %request.path, "no valid session; redirecting");
            Reply::redirect()
        }
    }
}

fn play(
    state: &AppState,
    game: &dyn Game,
    username: &str,
    token: &str,
    request: &Request,
) -> Reply {
    let outcome = game.play(token, &request.form());

    // The session may have ended while the move was played; sessions are
    // removed before their game state is dropped, so a dead token seen
    // here owns whatever `play` just stored.
    if state.sessions.owner(token).is_none() {
        game.forget(token);
        debug!(game = game.name(), user = username, "session ended during play");
        return Reply::redirect();
    }

    if let Some(input) = &outcome.rejected {
        warn!(game = game.name(), user = username, input = %input, "invalid game input");
    }
    Reply::page(game.render(&outcome.substitutions), token.to_string())
}

fn login(state: &AppState, request: &Request) -> Reply {
    let form = request.form();
    let username = form.value("user");
    let password = form.value("pass");
    let action = form.value("accion");
    let cookie = valid_cookie(state, request);

    if let Err(err) = validate_credentials(username, password) {
        warn!(user = username, action, reason = %err, "credentials rejected");
        let message = match err {
            CasinoError::InvalidInput(message) => message,
            other => other.to_string(),
        };
        return login_page(Notice::Error(message), cookie);
    }

    match action {
        "login" => match state.store.authenticate(username, password) {
            Ok(true) => {
                let token = state.start_session(username, &request.session_id);
                info!(user = username, "logged in");
                Reply::page(pages::index(username, Local::now()), token)
            }
            Ok(false) => {
                warn!(user = username, "login failed");
                login_page(Notice::Error(LOGIN_FAILED.to_string()), cookie)
            }
            Err(err) => {
                error!(user = username, error = %err, "authentication unavailable");
                login_page(Notice::Error(STORE_UNAVAILABLE.to_string()), cookie)
            }
        },
        "crear" => match state.store.create_user(username, password) {
            Ok(true) => login_page(Notice::Success(ACCOUNT_CREATED.to_string()), cookie),
            Ok(false) => {
                warn!(user = username, "registration rejected: user exists");
                login_page(Notice::Error(USER_EXISTS.to_string()), cookie)
            }
            Err(err) => {
                error!(user = username, error = %err, "registration unavailable");
                login_page(Notice::Error(STORE_UNAVAILABLE.to_string()), cookie)
            }
        },
        other => {
            warn!(user = username, action = other, "unknown login action");
            login_page(Notice::Error("Unknown action.".to_string()), cookie)
        }
    }
}

fn login_page(notice: Notice, cookie: String) -> Reply {
    Reply::page(pages::login(Some(&notice)), cookie)
}
