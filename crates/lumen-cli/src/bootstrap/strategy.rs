//! Platform bootstrap strategies.
//!
//! Both strategies are compiled everywhere; [`PlatformBootstrapper`] selects
//! the one the current target uses. Auto-start is only offered where the
//! daemon ships as a desktop application the tool knows how to launch.

use lumen_config::Config;

use super::cancel::Cancellation;
use super::error::BootstrapError;
use super::handle::{DaemonHandle, LIVENESS_PROBE_TIMEOUT};
use super::machine::AutoStartMachine;
use super::observer::{BOOTSTRAP_TARGET, BootstrapObserver};
use super::types::{BootstrapOutcome, PollBudget};

/// Decides whether the daemon is usable, remediating where supported.
pub trait Bootstrapper {
    /// Runs one bootstrap call to completion.
    fn bootstrap<H, O>(
        &self,
        handle: &mut H,
        cancel: &Cancellation,
        observer: &O,
    ) -> BootstrapOutcome
    where
        H: DaemonHandle,
        O: BootstrapObserver;
}

/// Strategy for platforms without auto-start support.
///
/// A failed probe is reported straight away with the manual start command;
/// nothing is launched and nothing is retried.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualStart;

impl Bootstrapper for ManualStart {
    fn bootstrap<H, O>(
        &self,
        handle: &mut H,
        cancel: &Cancellation,
        observer: &O,
    ) -> BootstrapOutcome
    where
        H: DaemonHandle,
        O: BootstrapObserver,
    {
        let outcome = if cancel.is_cancelled() {
            BootstrapOutcome::Unreachable(BootstrapError::Cancelled)
        } else {
            observer.checking_liveness();
            match handle.check_live(LIVENESS_PROBE_TIMEOUT) {
                Ok(true) => BootstrapOutcome::Reachable,
                Ok(false) => BootstrapOutcome::Unreachable(BootstrapError::NotRunning),
                Err(error) => {
                    tracing::debug!(
                        target: BOOTSTRAP_TARGET,
                        error = %error,
                        "liveness probe failed"
                    );
                    BootstrapOutcome::Unreachable(BootstrapError::NotRunning)
                }
            }
        };
        observer.finished(&outcome);
        outcome
    }
}

/// Strategy for platforms that can launch the daemon themselves.
#[derive(Debug, Clone, Copy)]
pub struct AutoStart {
    budget: PollBudget,
}

impl AutoStart {
    #[must_use]
    pub fn new(budget: PollBudget) -> Self {
        Self { budget }
    }
}

impl Bootstrapper for AutoStart {
    fn bootstrap<H, O>(
        &self,
        handle: &mut H,
        cancel: &Cancellation,
        observer: &O,
    ) -> BootstrapOutcome
    where
        H: DaemonHandle,
        O: BootstrapObserver,
    {
        let outcome = AutoStartMachine::new(handle, cancel, observer, self.budget).run();
        observer.finished(&outcome);
        outcome
    }
}

/// Bootstrap strategy used by the current target.
#[cfg(any(target_os = "macos", target_os = "windows"))]
pub type PlatformBootstrapper = AutoStart;

/// Bootstrap strategy used by the current target.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub type PlatformBootstrapper = ManualStart;

/// Builds the current target's strategy from configuration.
#[cfg(any(target_os = "macos", target_os = "windows"))]
#[must_use]
pub fn platform_bootstrapper(config: &Config) -> PlatformBootstrapper {
    AutoStart::new(PollBudget::from_config(config))
}

/// Builds the current target's strategy from configuration.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
#[must_use]
pub fn platform_bootstrapper(_config: &Config) -> PlatformBootstrapper {
    ManualStart
}
