//! Daemon process spawning utilities.
//!
//! Resolves the daemon executable and launches `<binary> serve` as a
//! background process that outlives the CLI.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Child, Command, Stdio};

use lumen_config::{DAEMON_NAME, SocketEndpoint};

/// Subcommand that runs the daemon in the foreground.
pub(super) const SERVE_ARGUMENT: &str = "serve";

/// Environment variable the daemon reads its listen address from.
pub(super) const DAEMON_SOCKET_ENV: &str = "LUMEN_DAEMON_SOCKET";

/// Spawns `<binary> serve` detached from the CLI's stdio and terminal.
///
/// The configured endpoint is forwarded through the environment so the
/// daemon listens where the CLI will probe.
pub(super) fn spawn_daemon(binary: &OsStr, endpoint: &SocketEndpoint) -> io::Result<Child> {
    let mut command = Command::new(binary);
    command
        .arg(SERVE_ARGUMENT)
        .env(DAEMON_SOCKET_ENV, endpoint.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut command);
    command.spawn().map_err(|source| {
        io::Error::new(
            source.kind(),
            format!("failed to spawn '{}': {source}", binary.to_string_lossy()),
        )
    })
}

/// Picks the daemon executable.
///
/// Uses the override when provided, then a daemon installed next to the
/// running executable, then falls back to resolving `lumen` on `PATH`.
pub(super) fn resolve_daemon_binary(binary_override: Option<&str>) -> OsString {
    binary_override
        .map(OsString::from)
        .or_else(sibling_daemon_binary)
        .unwrap_or_else(|| OsString::from(DAEMON_NAME))
}

fn sibling_daemon_binary() -> Option<OsString> {
    let current = env::current_exe().ok()?;
    let candidate = current
        .parent()?
        .join(format!("{DAEMON_NAME}{}", env::consts::EXE_SUFFIX));
    candidate.is_file().then(|| candidate.into_os_string())
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // A separate process group keeps terminal signals aimed at the CLI away
    // from the daemon.
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}
