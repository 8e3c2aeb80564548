//! Shared configuration for the Lumen binaries.
//!
//! `lumenctl` and `lumen-runner` load the same [`Config`] through
//! `ortho_config`, which layers built-in defaults, configuration files
//! (`--config-path` or `LUMEN_CONFIG_PATH`), `LUMEN_*` environment variables
//! and command-line flags, in increasing order of precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod socket;

pub use defaults::{
    DAEMON_NAME, DEFAULT_LOG_FILTER, DEFAULT_POLL_INTERVAL_MS, DEFAULT_STARTUP_TIMEOUT_MS,
    DEFAULT_TCP_PORT, default_log_filter, default_log_filter_string, default_log_format,
    default_poll_interval_ms, default_socket_endpoint, default_startup_timeout_ms,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError};

/// Configuration shared by the CLI and the worker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "LUMEN")]
pub struct Config {
    /// Endpoint the serving daemon listens on.
    #[ortho_config(default = default_socket_endpoint())]
    pub daemon_socket: SocketEndpoint,
    /// Explicit path to the daemon executable used for auto-start.
    pub daemon_binary: Option<String>,
    /// Upper bound on the time spent waiting for an auto-started daemon.
    #[ortho_config(default = default_startup_timeout_ms())]
    pub startup_timeout_ms: u64,
    /// Delay between liveness probes while waiting for the daemon.
    #[ortho_config(default = default_poll_interval_ms())]
    pub poll_interval_ms: u64,
    /// `tracing` filter expression.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log line format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_socket_endpoint(),
            daemon_binary: None,
            startup_timeout_ms: default_startup_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Endpoint the serving daemon listens on.
    #[must_use]
    pub fn daemon_socket(&self) -> &SocketEndpoint {
        &self.daemon_socket
    }

    /// Daemon executable override, when configured.
    #[must_use]
    pub fn daemon_binary(&self) -> Option<&str> {
        self.daemon_binary.as_deref()
    }

    /// Startup budget for auto-started daemons.
    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    /// Interval between readiness probes.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log line format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
