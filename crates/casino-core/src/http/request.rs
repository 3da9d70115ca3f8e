//! Request parsing.
//!
//! The parser walks an explicit phase machine over a buffered stream:
//! request line, headers up to the blank line, then exactly
//! `Content-Length` body bytes. Every read is bounded by [`ParseLimits`];
//! the socket read timeout bounds how long any of them may block.

use std::fmt;
use std::io::{self, BufRead, Read};

use thiserror::Error;

use super::form::Form;
use super::response::SESSION_COOKIE;

/// Request method. Only `GET` and `POST` are routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(other) => other,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds applied while reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Longest request or header line, excluding the line terminator.
    pub max_line_bytes: usize,
    /// Most header lines accepted before the blank line.
    pub max_headers: usize,
    /// Largest `Content-Length` accepted.
    pub max_body_bytes: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 8192,
            max_headers: 100,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Why a request could not be read.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The peer closed the connection before sending anything.
    #[error("Connection closed before a request was received")]
    Closed,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body of {declared} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { declared: usize, limit: usize },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// A parsed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request target without any `?query`.
    pub path: String,
    /// Header lines in arrival order, names as sent.
    pub headers: Vec<(String, String)>,
    /// Declared body length; `0` when absent or unparsable.
    pub content_length: usize,
    /// Value of the `sessionID` cookie, or `""`.
    pub session_id: String,
    pub body: Vec<u8>,
}

enum Phase {
    AwaitRequestLine,
    ReadHeaders,
    ReadBody,
    Done,
}

impl Request {
    /// Read one request from `reader`.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Closed`] if the stream ends before a request line.
    /// - [`RequestError::BadRequest`] for a malformed request line, an
    ///   oversized line, too many headers, or a truncated body.
    /// - [`RequestError::BodyTooLarge`] if `Content-Length` exceeds the limit.
    /// - [`RequestError::Io`] for socket errors, including read timeouts.
    pub fn read_from<R: BufRead>(reader: &mut R, limits: &ParseLimits) -> Result<Self, RequestError> {
        let mut request = Request {
            method: Method::Get,
            path: String::new(),
            headers: Vec::new(),
            content_length: 0,
            session_id: String::new(),
            body: Vec::new(),
        };
        let mut phase = Phase::AwaitRequestLine;

        loop {
            phase = match phase {
                Phase::AwaitRequestLine => {
                    let line = read_line(reader, limits.max_line_bytes)?
                        .ok_or(RequestError::Closed)?;
                    request.apply_request_line(&line)?;
                    Phase::ReadHeaders
                }
                Phase::ReadHeaders => {
                    let line = read_line(reader, limits.max_line_bytes)?.ok_or_else(|| {
                        RequestError::BadRequest("connection closed inside headers".to_string())
                    })?;
                    if line.is_empty() {
                        Phase::ReadBody
                    } else if request.headers.len() >= limits.max_headers {
                        return Err(RequestError::BadRequest(format!(
                            "more than {} header lines",
                            limits.max_headers
                        )));
                    } else {
                        request.apply_header(&line);
                        Phase::ReadHeaders
                    }
                }
                Phase::ReadBody => {
                    request.read_body(reader, limits.max_body_bytes)?;
                    Phase::Done
                }
                Phase::Done => return Ok(request),
            };
        }
    }

    /// First header named exactly `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body as a url-encoded form.
    pub fn form(&self) -> Form {
        Form::parse(&self.body)
    }

    fn apply_request_line(&mut self, line: &str) -> Result<(), RequestError> {
        let mut parts = line.split(' ');
        let method = parts.next().filter(|m| !m.is_empty());
        let target = parts.next().filter(|t| !t.is_empty());

        let (Some(method), Some(target)) = (method, target) else {
            return Err(RequestError::BadRequest(format!(
                "malformed request line: {:?}",
                line
            )));
        };

        self.method = Method::parse(method);
        self.path = match target.split_once('?') {
            Some((path, _query)) => path.to_string(),
            None => target.to_string(),
        };
        Ok(())
    }

    fn apply_header(&mut self, line: &str) {
        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        let value = value.trim();

        match name {
            "Content-Length" => {
                self.content_length = value.parse().unwrap_or(0);
            }
            "Cookie" => {
                let prefix = format!("{}=", SESSION_COOKIE);
                if let Some(token) = value
                    .split(';')
                    .find_map(|pair| pair.trim().strip_prefix(prefix.as_str()))
                {
                    self.session_id = token.to_string();
                }
            }
            _ => {}
        }

        self.headers.push((name.to_string(), value.to_string()));
    }

    fn read_body<R: BufRead>(&mut self, reader: &mut R, limit: usize) -> Result<(), RequestError> {
        if self.content_length == 0 {
            return Ok(());
        }
        if self.content_length > limit {
            return Err(RequestError::BodyTooLarge {
                declared: self.content_length,
                limit,
            });
        }

        let mut body = vec![0u8; self.content_length];
        reader.read_exact(&mut body).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => RequestError::BadRequest(format!(
                "body shorter than Content-Length {}",
                self.content_length
            )),
            _ => RequestError::Io { source: e },
        })?;
        self.body = body;
        Ok(())
    }
}

/// Read one line without its terminator. `None` at end of stream.
fn read_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Option<String>, RequestError> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(limit as u64 + 2)
        .read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(None);
    }

    let terminated = buf.ends_with(b"\n");
    if terminated {
        buf.pop();
        if buf.ends_with(b"\r") {
            buf.pop();
        }
    }
    if buf.len() > limit {
        return Err(RequestError::BadRequest(format!(
            "line longer than {} bytes",
            limit
        )));
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(raw: &str) -> Result<Request, RequestError> {
        Request::read_from(&mut Cursor::new(raw.as_bytes()), &ParseLimits::default())
    }

    #[test]
    fn test_parse_post_with_form_body() {
        let request =
            parse("POST /adivina HTTP/1.1\r\nHost: x\r\nContent-Length: 11\r\n\r\nnumero=42\r\n")
                .unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/adivina");
        assert_eq!(request.content_length, 11);
        assert_eq!(request.body, b"numero=42\r\n");
        assert_eq!(request.form().get("numero"), Some("42"));
    }

    #[test]
    fn test_zero_content_length_has_empty_body() {
        let request = parse("POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").unwrap();
        assert!(request.body.is_empty());
        assert!(request.form().is_empty());
    }

    #[test]
    fn test_get_without_body() {
        let request = parse("GET /index HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/index");
        assert_eq!(request.header("Host"), Some("localhost"));
        assert_eq!(request.session_id, "");
    }

    #[test]
    fn test_session_cookie_is_extracted() {
        let request = parse(
            "GET /index HTTP/1.1\r\nCookie: theme=dark; sessionID=abc-123; lang=es\r\n\r\n",
        )
        .unwrap();
        assert_eq!(request.session_id, "abc-123");
    }

    #[test]
    fn test_header_names_are_case_sensitive() {
        let request = parse("POST / HTTP/1.1\r\ncontent-length: 5\r\n\r\nhello").unwrap();

        assert_eq!(request.content_length, 0);
        assert!(request.body.is_empty());
        assert_eq!(request.header("content-length"), Some("5"));
        assert_eq!(request.header("Content-Length"), None);
    }

    #[test]
    fn test_query_is_stripped_from_path() {
        let request = parse("GET /dados?x=1 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path, "/dados");
    }

    #[test]
    fn test_unparsable_content_length_is_zero() {
        let request = parse("POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n").unwrap();
        assert_eq!(request.content_length, 0);
    }

    #[test]
    fn test_bare_lf_line_endings() {
        let request = parse("GET / HTTP/1.1\nHost: x\n\n").unwrap();
        assert_eq!(request.path, "/");
        assert_eq!(request.header("Host"), Some("x"));
    }

    #[test]
    fn test_other_methods_are_preserved() {
        let request = parse("DELETE /index HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::Other("DELETE".to_string()));
        assert_eq!(request.method.to_string(), "DELETE");
    }

    #[test]
    fn test_empty_stream_is_closed() {
        assert!(matches!(parse(""), Err(RequestError::Closed)));
    }

    #[test]
    fn test_malformed_request_line() {
        assert!(matches!(parse("GET\r\n\r\n"), Err(RequestError::BadRequest(_))));
        assert!(matches!(parse("\r\n\r\n"), Err(RequestError::BadRequest(_))));
    }

    #[test]
    fn test_truncated_headers() {
        assert!(matches!(
            parse("GET / HTTP/1.1\r\nHost: x\r\n"),
            Err(RequestError::BadRequest(_))
        ));
    }

    #[test]
    fn test_short_body_is_rejected() {
        let result = parse("POST / HTTP/1.1\r\nContent-Length: 20\r\n\r\nshort");
        assert!(matches!(result, Err(RequestError::BadRequest(_))));
    }

    #[test]
    fn test_body_over_limit() {
        let limits = ParseLimits {
            max_body_bytes: 4,
            ..ParseLimits::default()
        };
        let raw = "POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let result = Request::read_from(&mut Cursor::new(raw.as_bytes()), &limits);

        assert!(matches!(
            result,
            Err(RequestError::BodyTooLarge { declared: 5, limit: 4 })
        ));
    }

    #[test]
    fn test_line_over_limit() {
        let limits = ParseLimits {
            max_line_bytes: 16,
            ..ParseLimits::default()
        };
        let raw = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(64));
        let result = Request::read_from(&mut Cursor::new(raw.as_bytes()), &limits);

        assert!(matches!(result, Err(RequestError::BadRequest(_))));
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let limits = ParseLimits {
            max_line_bytes: 14,
            ..ParseLimits::default()
        };
        // "GET / HTTP/1.1" is exactly 14 bytes.
        let result = Request::read_from(&mut Cursor::new(&b"GET / HTTP/1.1\r\n\r\n"[..]), &limits);
        assert!(result.is_ok());
    }

    #[test]
    fn test_too_many_headers() {
        let limits = ParseLimits {
            max_headers: 2,
            ..ParseLimits::default()
        };
        let raw = "GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n";
        let result = Request::read_from(&mut Cursor::new(raw.as_bytes()), &limits);

        assert!(matches!(result, Err(RequestError::BadRequest(_))));
    }

    #[test]
    fn test_header_without_colon_is_ignored() {
        let request = parse("GET / HTTP/1.1\r\nnonsense\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(request.headers.len(), 1);
    }
}
