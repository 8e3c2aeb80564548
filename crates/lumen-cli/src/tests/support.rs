//! Shared helpers for the CLI runtime tests.

use std::ffi::OsString;
use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::PoisonError;

use anyhow::{Context, Result};
use lumen_config::{Config, SocketEndpoint};

use crate::interrupt::SIGNAL_TEST_LOCK;
use crate::{AppError, ConfigLoader, IoStreams, run_with_loader};

/// Loader that ignores its arguments and returns a fixed configuration.
pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// Loopback listener standing in for a running lumen server.
///
/// The kernel completes the handshake for queued connections, so probes
/// succeed without the listener ever calling `accept`.
pub(super) struct FakeServer {
    _listener: TcpListener,
    endpoint: SocketEndpoint,
}

impl FakeServer {
    pub(super) fn bind() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind fake server")?;
        let port = listener.local_addr().context("local addr")?.port();
        Ok(Self {
            _listener: listener,
            endpoint: SocketEndpoint::tcp("127.0.0.1", port),
        })
    }

    pub(super) fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }
}

/// Returns an endpoint on a port that was free a moment ago.
pub(super) fn closed_endpoint() -> Result<SocketEndpoint> {
    let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind probe port")?;
    let port = listener.local_addr().context("local addr")?.port();
    drop(listener);
    Ok(SocketEndpoint::tcp("127.0.0.1", port))
}

pub(super) fn config_for(endpoint: &SocketEndpoint) -> Config {
    Config {
        daemon_socket: endpoint.clone(),
        ..Config::default()
    }
}

/// Captured result of one CLI invocation.
pub(super) struct CliRun {
    pub(super) exit: ExitCode,
    pub(super) stdout: String,
    pub(super) stderr: String,
}

/// Runs the CLI in-process, kept apart from tests that raise signals.
pub(super) fn run_cli<L: ConfigLoader>(loader: &L, args: &[&str]) -> Result<CliRun> {
    let _signals = SIGNAL_TEST_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr);
        let args = std::iter::once("lumenctl")
            .chain(args.iter().copied())
            .map(OsString::from);
        run_with_loader(args, &mut io, loader)
    };
    Ok(CliRun {
        exit,
        stdout: decode_utf8(stdout, "stdout")?,
        stderr: decode_utf8(stderr, "stderr")?,
    })
}

pub(super) fn decode_utf8(buffer: Vec<u8>, label: &str) -> Result<String> {
    String::from_utf8(buffer).with_context(|| format!("{label} is not valid UTF-8"))
}
