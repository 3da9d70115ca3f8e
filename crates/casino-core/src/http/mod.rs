//! Hand-rolled HTTP/1.1 subset.
//!
//! One request per connection: request line, headers, and an optional
//! `Content-Length`-delimited body. No keep-alive, no chunked encoding.

mod form;
mod request;
mod response;

pub use form::Form;
pub use request::{Method, ParseLimits, Request, RequestError};
pub use response::{build, StatusClass, SESSION_COOKIE};
