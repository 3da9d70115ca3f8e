//! # Casino Server
//!
//! Wires the core library to the network: configuration, logging, the
//! TCP acceptor, request routing, page templates and the games.

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod games;
pub mod helpers;
pub mod logging;
pub mod pages;
pub mod server;
pub mod state;

pub use dispatcher::{dispatch, Reply};
pub use server::{Server, ServerOptions};
pub use state::AppState;
