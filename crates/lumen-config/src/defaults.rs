use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Name of the serving daemon, used in user-facing guidance.
pub const DAEMON_NAME: &str = "lumen";

/// Default TCP port the daemon listens on.
pub const DEFAULT_TCP_PORT: u16 = 11434;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default budget for an auto-started daemon to become reachable.
pub const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 5_000;

/// Default delay between readiness probes.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Default log filter expression used by the binaries.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Default logging format for the binaries.
///
/// Both binaries are interactive tools whose stdout carries results, so the
/// stderr log stream defaults to the human-readable form.
pub fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default startup budget in milliseconds.
pub fn default_startup_timeout_ms() -> u64 {
    DEFAULT_STARTUP_TIMEOUT_MS
}

/// Default probe interval in milliseconds.
pub fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Computes the default socket endpoint for the daemon.
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}
