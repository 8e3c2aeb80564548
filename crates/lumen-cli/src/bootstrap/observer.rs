//! Progress reporting hooks for bootstrap calls.

use super::BootstrapOutcome;

pub(super) const BOOTSTRAP_TARGET: &str = "lumen_cli::bootstrap";

/// Observer notified as a bootstrap call advances through its states.
pub trait BootstrapObserver {
    /// Invoked before the daemon is probed for the first time.
    fn checking_liveness(&self);

    /// Invoked immediately before the daemon is launched.
    fn launching(&self);

    /// Invoked before each readiness probe of a launched daemon.
    fn poll_attempt(&self, attempt: u32);

    /// Invoked once with the final outcome.
    fn finished(&self, outcome: &BootstrapOutcome);
}

/// Default observer that records bootstrap progress using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BootstrapObserver for TracingObserver {
    fn checking_liveness(&self) {
        tracing::debug!(
            target: BOOTSTRAP_TARGET,
            event = "checking_liveness",
            "probing daemon"
        );
    }

    fn launching(&self) {
        tracing::info!(
            target: BOOTSTRAP_TARGET,
            event = "launching",
            "daemon not running; launching it"
        );
    }

    fn poll_attempt(&self, attempt: u32) {
        tracing::debug!(
            target: BOOTSTRAP_TARGET,
            event = "poll_attempt",
            attempt,
            "waiting for daemon readiness"
        );
    }

    fn finished(&self, outcome: &BootstrapOutcome) {
        match outcome {
            BootstrapOutcome::Reachable => tracing::debug!(
                target: BOOTSTRAP_TARGET,
                event = "reachable",
                "daemon already running"
            ),
            BootstrapOutcome::Started => tracing::info!(
                target: BOOTSTRAP_TARGET,
                event = "started",
                "daemon started"
            ),
            BootstrapOutcome::Unreachable(error) => tracing::debug!(
                target: BOOTSTRAP_TARGET,
                event = "unreachable",
                error = %error,
                "daemon unreachable"
            ),
        }
    }
}
