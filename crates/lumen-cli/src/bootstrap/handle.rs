//! Client-side handle on the serving daemon.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::Child;
use std::time::Duration;

use lumen_config::{Config, SocketEndpoint};

use super::socket::Liveness;
use super::spawning::{resolve_daemon_binary, spawn_daemon};
use super::types::LaunchState;

/// Bound for a liveness probe made outside the poll loop.
pub const LIVENESS_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Operations the bootstrapper needs from the daemon.
#[cfg_attr(test, mockall::automock)]
pub trait DaemonHandle {
    /// Probes the daemon, giving up once `within` has elapsed.
    ///
    /// `Ok(false)` means nothing is serving; an error means the probe itself
    /// could not decide.
    fn check_live(&mut self, within: Duration) -> io::Result<bool>;

    /// Starts the daemon in the background.
    fn launch(&mut self) -> io::Result<()>;

    /// Reports what became of the process started by [`DaemonHandle::launch`].
    fn launch_state(&mut self) -> io::Result<LaunchState>;
}

/// Production handle: probes the configured socket and spawns the daemon
/// executable.
#[derive(Debug)]
pub struct SocketDaemon {
    endpoint: SocketEndpoint,
    binary: OsString,
    child: Option<Child>,
    detached: bool,
}

impl SocketDaemon {
    #[must_use]
    pub fn new(endpoint: SocketEndpoint, binary: impl Into<OsString>) -> Self {
        Self {
            endpoint,
            binary: binary.into(),
            child: None,
            detached: false,
        }
    }

    /// Builds a handle from the daemon socket and binary settings.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.daemon_socket().clone(),
            resolve_daemon_binary(config.daemon_binary()),
        )
    }

    #[must_use]
    pub fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    #[must_use]
    pub fn binary(&self) -> &OsStr {
        &self.binary
    }
}

impl DaemonHandle for SocketDaemon {
    fn check_live(&mut self, within: Duration) -> io::Result<bool> {
        Liveness::probe(&self.endpoint, within).into_live()
    }

    fn launch(&mut self) -> io::Result<()> {
        if self.child.is_some() || self.detached {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "the daemon was already launched by this handle",
            ));
        }
        self.child = Some(spawn_daemon(&self.binary, &self.endpoint)?);
        Ok(())
    }

    fn launch_state(&mut self) -> io::Result<LaunchState> {
        if self.detached {
            return Ok(LaunchState::Detached);
        }
        let Some(child) = self.child.as_mut() else {
            return Ok(LaunchState::Running);
        };
        match child.try_wait()? {
            None => Ok(LaunchState::Running),
            Some(status) if status.success() => {
                self.child = None;
                self.detached = true;
                Ok(LaunchState::Detached)
            }
            Some(status) => Ok(LaunchState::Failed {
                exit_code: status.code(),
            }),
        }
    }
}
