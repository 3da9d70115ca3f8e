//! TCP acceptor: one worker thread per connection, one request per
//! connection.

use std::io::{self, BufReader, Read};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use casino_core::http::{ParseLimits, Request, RequestError};
use tracing::{debug, error, info, info_span, warn};

use crate::dispatcher::{dispatch, Reply};
use crate::state::AppState;

/// Per-connection limits.
#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// Longest wait for any single read.
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Time allowed to receive the whole request, however slowly it trickles in.
    pub request_deadline: Duration,
    /// Connections served at once; further connections are closed.
    pub max_connections: usize,
    pub limits: ParseLimits,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            request_deadline: Duration::from_secs(60),
            max_connections: 256,
            limits: ParseLimits::default(),
        }
    }
}

impl ServerOptions {
    /// Reject settings under which no connection could be served.
    pub fn validate(&self) -> io::Result<()> {
        let zero = [
            ("read timeout", self.read_timeout.is_zero()),
            ("write timeout", self.write_timeout.is_zero()),
            ("request deadline", self.request_deadline.is_zero()),
            ("connection limit", self.max_connections == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((name, _)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} must be greater than zero", name),
            )),
            None => Ok(()),
        }
    }
}

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    options: ServerOptions,
    active: Arc<AtomicUsize>,
}

impl Server {
    pub fn bind<A: ToSocketAddrs>(
        addr: A,
        state: Arc<AppState>,
        options: ServerOptions,
    ) -> io::Result<Self> {
        options.validate()?;
        let listener = TcpListener::bind(addr)?;
        Ok(Self {
            listener,
            state,
            options,
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the listener fails.
    pub fn run(self) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "listening");

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            let Some(slot) = Slot::acquire(&self.active, self.options.max_connections) else {
                warn!(
                    peer = %peer_of(&stream),
                    limit = self.options.max_connections,
                    "connection limit reached; closing"
                );
                continue;
            };

            let state = Arc::clone(&self.state);
            let options = self.options;
            let spawned = thread::Builder::new()
                .name("casino-conn".to_string())
                .spawn(move || {
                    let _slot = slot;
                    let peer = peer_of(&stream);
                    let span = info_span!("connection", peer = %peer);
                    let _enter = span.enter();

                    if let Err(err) = handle_connection(stream, &state, &options) {
                        match err.kind() {
                            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
                                debug!(reason = %err, "connection timed out");
                            }
                            _ => debug!(error = %err, "connection closed with error"),
                        }
                    }
                });
            if let Err(err) = spawned {
                error!(error = %err, "failed to spawn connection worker");
            }
        }

        Ok(())
    }
}

/// Read one request, answer it, close.
fn handle_connection(
    mut stream: TcpStream,
    state: &AppState,
    options: &ServerOptions,
) -> io::Result<()> {
    stream.set_write_timeout(Some(options.write_timeout))?;

    let mut reader = BufReader::new(DeadlineReader {
        stream: stream.try_clone()?,
        deadline: Instant::now() + options.request_deadline,
        read_timeout: options.read_timeout,
    });
    let reply = match Request::read_from(&mut reader, &options.limits) {
        Ok(request) => {
            debug!(method = %request.method, path = %request.path, "request");
            dispatch(state, &request)
        }
        Err(RequestError::Closed) => return Ok(()),
        Err(RequestError::Io { source }) => return Err(source),
        Err(err) => {
            warn!(error = %err, "malformed request");
            Reply::bad_request()
        }
    };

    debug!(status = reply.status.code(), "reply");
    reply.write_to(&mut stream)
}

/// Socket reader that refuses to read past a fixed deadline.
///
/// Each read waits at most `read_timeout`, shortened to whatever is left
/// before `deadline`. Once the deadline passes every read fails with
/// `TimedOut`.
struct DeadlineReader {
    stream: TcpStream,
    deadline: Instant,
    read_timeout: Duration,
}

impl Read for DeadlineReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let left = self.deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "request deadline passed",
            ));
        }
        self.stream
            .set_read_timeout(Some(left.min(self.read_timeout)))?;
        self.stream.read(buf)
    }
}

fn peer_of(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

/// One admitted connection; released on drop.
struct Slot {
    active: Arc<AtomicUsize>,
}

impl Slot {
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current < limit).then_some(current + 1)
            })
            .ok()?;
        Some(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
