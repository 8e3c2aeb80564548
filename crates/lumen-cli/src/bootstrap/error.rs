//! Error types for daemon connectivity bootstrap.

use std::io;

use lumen_config::DAEMON_NAME;
use thiserror::Error;

/// Reasons a bootstrap call ends without a usable daemon.
///
/// The messages are shown verbatim to the operator, so each variant must
/// read as actionable guidance on its own. [`BootstrapError::NotRunning`] is
/// matched by scripts and must stay stable.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(
        "could not connect to {daemon} server, run '{daemon} serve' to start it",
        daemon = DAEMON_NAME
    )]
    NotRunning,
    #[error("failed to check whether {daemon} server is running: {source}", daemon = DAEMON_NAME)]
    LivenessCheckFailed {
        #[source]
        source: io::Error,
    },
    #[error("failed to launch {daemon} server: {source}", daemon = DAEMON_NAME)]
    LaunchFailed {
        #[source]
        source: io::Error,
    },
    #[error(
        "{daemon} server exited before becoming reachable (status: {exit_code:?})",
        daemon = DAEMON_NAME
    )]
    StartupFailed { exit_code: Option<i32> },
    #[error("{daemon} server failed to start within {timeout_ms} ms", daemon = DAEMON_NAME)]
    PollTimeout { timeout_ms: u64 },
    #[error("interrupted while waiting for {daemon} server", daemon = DAEMON_NAME)]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn not_running_message_names_manual_command() {
        assert_eq!(
            BootstrapError::NotRunning.to_string(),
            "could not connect to lumen server, run 'lumen serve' to start it"
        );
    }

    #[rstest]
    #[case::launch(BootstrapError::LaunchFailed { source: io::Error::from(io::ErrorKind::NotFound) })]
    #[case::startup(BootstrapError::StartupFailed { exit_code: Some(1) })]
    #[case::timeout(BootstrapError::PollTimeout { timeout_ms: 5_000 })]
    #[case::cancelled(BootstrapError::Cancelled)]
    fn failure_messages_differ_from_manual_guidance(#[case] error: BootstrapError) {
        let message = error.to_string();
        assert!(
            !message.contains("serve' to start it"),
            "unexpected manual guidance in {message:?}"
        );
    }
}
