//! Ensures the serving daemon is reachable before a command runs.
//!
//! A bootstrap call probes the configured socket. When nothing is serving,
//! the behaviour depends on the target platform:
//!
//! - macOS and Windows use [`AutoStart`], which launches the daemon in the
//!   background and polls until it answers or the [`PollBudget`] runs out.
//! - Every other target uses [`ManualStart`], which reports
//!   [`BootstrapError::NotRunning`] so the user can start the daemon with
//!   `lumen serve`.
//!
//! Callers pass a [`Cancellation`] token so an interrupt aborts the wait
//! promptly, and a [`BootstrapObserver`] that receives progress events.

mod cancel;
mod error;
mod handle;
mod machine;
mod observer;
mod socket;
mod spawning;
mod strategy;
mod types;

#[cfg(test)]
mod test_support;

pub use cancel::Cancellation;
pub use error::BootstrapError;
pub use handle::{DaemonHandle, LIVENESS_PROBE_TIMEOUT, SocketDaemon};
pub use observer::{BootstrapObserver, TracingObserver};
pub use strategy::{
    AutoStart, Bootstrapper, ManualStart, PlatformBootstrapper, platform_bootstrapper,
};
pub use types::{BootstrapOutcome, LaunchState, PollBudget};

#[cfg(test)]
pub(crate) use handle::MockDaemonHandle;
