//! Outcome and budget types shared by the bootstrap strategies.

use std::time::Duration;

use lumen_config::Config;

use super::BootstrapError;

/// Shortest probe interval accepted from configuration.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of a single bootstrap call.
#[derive(Debug)]
pub enum BootstrapOutcome {
    /// The daemon was already serving.
    Reachable,
    /// The daemon was absent, this process launched it and it is now serving.
    Started,
    /// The daemon cannot be used; the error explains why.
    Unreachable(BootstrapError),
}

/// Timing budget for waiting on an auto-started daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    interval: Duration,
    timeout: Duration,
}

impl PollBudget {
    /// Builds a budget, clamping the interval to a sane minimum.
    #[must_use]
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            timeout,
        }
    }

    /// Reads the budget from `startup_timeout_ms` and `poll_interval_ms`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval(), config.startup_timeout())
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Status of a daemon process launched by the current bootstrap call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    /// Nothing was launched, or the launched process is still running.
    Running,
    /// The launched process exited cleanly, having handed off to a
    /// background instance.
    Detached,
    /// The launched process exited with a failure status.
    Failed { exit_code: Option<i32> },
}
