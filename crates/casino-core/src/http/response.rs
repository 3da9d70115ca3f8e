//! Response header assembly.

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionID";

/// The three reply shapes the server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// `200 OK` with a page body.
    Ok,
    /// `302 Found` to `/`, never with a body.
    Redirect,
    /// `404 Not Found` with the error page.
    NotFound,
}

impl StatusClass {
    /// Map a status class code: `200`, `300` (redirect), anything else
    /// collapses to not-found.
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => StatusClass::Ok,
            300 | 302 => StatusClass::Redirect,
            _ => StatusClass::NotFound,
        }
    }

    /// Code put on the wire.
    pub fn code(self) -> u16 {
        match self {
            StatusClass::Ok => 200,
            StatusClass::Redirect => 302,
            StatusClass::NotFound => 404,
        }
    }

    pub fn status_line(self) -> &'static str {
        match self {
            StatusClass::Ok => "HTTP/1.1 200 OK",
            StatusClass::Redirect => "HTTP/1.1 302 Found",
            StatusClass::NotFound => "HTTP/1.1 404 Not Found",
        }
    }

    /// Whether a body follows the headers.
    pub fn has_body(self) -> bool {
        self != StatusClass::Redirect
    }
}

impl From<u16> for StatusClass {
    fn from(code: u16) -> Self {
        Self::from_code(code)
    }
}

/// Build the status line and headers, including the terminating blank line.
///
/// `body_len` is the body size in bytes; it is forced to 0 for a redirect.
/// An empty `session_id` clears the cookie.
pub fn build(body_len: usize, status: StatusClass, session_id: &str) -> String {
    let mut head = String::with_capacity(160);
    let body_len = if status.has_body() { body_len } else { 0 };

    head.push_str(status.status_line());
    head.push_str("\r\n");
    if status == StatusClass::Redirect {
        head.push_str("Location: /\r\n");
    }
    head.push_str("Content-Type: text/html; charset=UTF-8\r\n");
    head.push_str(&format!("Content-Length: {}\r\n", body_len));
    if session_id.is_empty() {
        head.push_str(&format!("Set-Cookie: {}=; Path=/; Max-Age=0;\r\n", SESSION_COOKIE));
    } else {
        head.push_str(&format!("Set-Cookie: {}={}; Path=/;\r\n", SESSION_COOKIE, session_id));
    }
    head.push_str("\r\n");
    head
}
