//! Liveness probing over the configured daemon socket.
//!
//! A probe is one bounded connect attempt. Whatever accepts the connection
//! counts as a serving daemon; the connection is dropped straight away.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use lumen_config::SocketEndpoint;
#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

/// Connect calls reject a zero timeout.
const MIN_PROBE_WINDOW: Duration = Duration::from_millis(1);

/// What a single probe says about the daemon.
#[derive(Debug)]
pub(super) enum Liveness {
    /// Something accepted the connection.
    Serving,
    /// Nothing listens on the endpoint.
    Absent,
    /// The probe could not tell; the daemon may still be running.
    Undecided(io::Error),
}

impl Liveness {
    /// Probes `endpoint`, giving up once `within` has elapsed.
    pub(super) fn probe(endpoint: &SocketEndpoint, within: Duration) -> Self {
        let within = within.max(MIN_PROBE_WINDOW);
        let attempt = match endpoint {
            SocketEndpoint::Tcp { host, port } => connect_tcp(host, *port, within),
            SocketEndpoint::Unix { path } => connect_unix(path, within),
        };
        match attempt {
            Ok(()) => Self::Serving,
            Err(error) if means_absent(error.kind()) => Self::Absent,
            Err(source) => Self::Undecided(io::Error::new(
                source.kind(),
                format!("failed to probe {endpoint}: {source}"),
            )),
        }
    }

    /// Answers in the shape [`super::DaemonHandle::check_live`] returns.
    pub(super) fn into_live(self) -> io::Result<bool> {
        match self {
            Self::Serving => Ok(true),
            Self::Absent => Ok(false),
            Self::Undecided(error) => Err(error),
        }
    }
}

/// Tries every resolved address until one accepts or the window closes.
///
/// Hosts such as `localhost` resolve to both address families and the
/// daemon may only listen on one of them.
fn connect_tcp(host: &str, port: u16, within: Duration) -> io::Result<()> {
    let deadline = Instant::now() + within;
    let mut last_error = None;
    for address in (host, port).to_socket_addrs()? {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            last_error = Some(io::Error::from(io::ErrorKind::TimedOut));
            break;
        }
        match TcpStream::connect_timeout(&address, remaining) {
            Ok(_) => return Ok(()),
            Err(error) => last_error = Some(error),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{host} resolved to no addresses"),
        )
    }))
}

#[cfg(unix)]
fn connect_unix(path: &Utf8Path, within: Duration) -> io::Result<()> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    socket.connect_timeout(&SockAddr::unix(path)?, within)
}

#[cfg(not(unix))]
fn connect_unix(path: &Utf8Path, _within: Duration) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot reach unix socket {path} on this platform"),
    ))
}

/// Connect failures that prove nothing listens on the endpoint.
///
/// A reset is not among them: the peer accepted before dropping us.
fn means_absent(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotFound
            | io::ErrorKind::AddrNotAvailable
    )
}
