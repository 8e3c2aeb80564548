//! State machine driving the auto-start bootstrap flow.
//!
//! `Init → CheckingLiveness → {Reachable | Launching → Polling → {Started | Unreachable}}`
//!
//! Each call to [`AutoStartMachine::step`] performs exactly one transition,
//! so tests can stop the machine in any state and inspect it. No state is
//! revisited except `Polling`, which advances its attempt counter.

use std::time::Instant;

use super::cancel::Cancellation;
use super::error::BootstrapError;
use super::handle::{DaemonHandle, LIVENESS_PROBE_TIMEOUT};
use super::observer::{BOOTSTRAP_TARGET, BootstrapObserver};
use super::types::{BootstrapOutcome, LaunchState, PollBudget};

/// States of a single auto-start bootstrap call.
#[derive(Debug)]
pub(crate) enum BootstrapState {
    Init,
    CheckingLiveness,
    Launching,
    Polling { attempt: u32, deadline: Instant },
    Finished(BootstrapOutcome),
}

impl BootstrapState {
    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

pub(crate) struct AutoStartMachine<'a, H, O> {
    handle: &'a mut H,
    cancel: &'a Cancellation,
    observer: &'a O,
    budget: PollBudget,
    state: BootstrapState,
}

impl<'a, H, O> AutoStartMachine<'a, H, O>
where
    H: DaemonHandle,
    O: BootstrapObserver,
{
    pub(crate) fn new(
        handle: &'a mut H,
        cancel: &'a Cancellation,
        observer: &'a O,
        budget: PollBudget,
    ) -> Self {
        Self {
            handle,
            cancel,
            observer,
            budget,
            state: BootstrapState::Init,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &BootstrapState {
        &self.state
    }

    /// Drives the machine to completion and returns the outcome.
    pub(crate) fn run(mut self) -> BootstrapOutcome {
        loop {
            match std::mem::replace(&mut self.state, BootstrapState::Init) {
                BootstrapState::Finished(outcome) => return outcome,
                state => {
                    self.state = state;
                    self.step();
                }
            }
        }
    }

    /// Performs one transition. Stepping a finished machine is a no-op.
    pub(crate) fn step(&mut self) {
        let state = std::mem::replace(&mut self.state, BootstrapState::Init);
        self.state = match state {
            BootstrapState::Init => self.init(),
            BootstrapState::CheckingLiveness => self.check_liveness(),
            BootstrapState::Launching => self.launch(),
            BootstrapState::Polling { attempt, deadline } => self.poll(attempt, deadline),
            finished @ BootstrapState::Finished(_) => finished,
        };
    }

    fn init(&self) -> BootstrapState {
        if self.cancel.is_cancelled() {
            return unreachable_with(BootstrapError::Cancelled);
        }
        BootstrapState::CheckingLiveness
    }

    fn check_liveness(&mut self) -> BootstrapState {
        self.observer.checking_liveness();
        match self.handle.check_live(LIVENESS_PROBE_TIMEOUT) {
            Ok(true) => BootstrapState::Finished(BootstrapOutcome::Reachable),
            Ok(false) => BootstrapState::Launching,
            Err(source) => unreachable_with(BootstrapError::LivenessCheckFailed { source }),
        }
    }

    fn launch(&mut self) -> BootstrapState {
        if self.cancel.is_cancelled() {
            return unreachable_with(BootstrapError::Cancelled);
        }
        self.observer.launching();
        match self.handle.launch() {
            Ok(()) => BootstrapState::Polling {
                attempt: 0,
                deadline: Instant::now() + self.budget.timeout(),
            },
            Err(source) => unreachable_with(BootstrapError::LaunchFailed { source }),
        }
    }

    fn poll(&mut self, attempt: u32, deadline: Instant) -> BootstrapState {
        let now = Instant::now();
        if now >= deadline {
            return unreachable_with(BootstrapError::PollTimeout {
                timeout_ms: u64::try_from(self.budget.timeout().as_millis()).unwrap_or(u64::MAX),
            });
        }
        let wait = self.budget.interval().min(deadline - now);
        if self.cancel.wait_timeout(wait) {
            return unreachable_with(BootstrapError::Cancelled);
        }

        match self.handle.launch_state() {
            Ok(LaunchState::Failed { exit_code }) => {
                return unreachable_with(BootstrapError::StartupFailed { exit_code });
            }
            Ok(LaunchState::Running | LaunchState::Detached) => {}
            Err(error) => tracing::debug!(
                target: BOOTSTRAP_TARGET,
                error = %error,
                "could not inspect launched daemon process"
            ),
        }

        let attempt = attempt.saturating_add(1);
        self.observer.poll_attempt(attempt);
        // A probe may not outlast the poll interval or the startup deadline.
        let within = self
            .budget
            .interval()
            .min(deadline.saturating_duration_since(Instant::now()));
        match self.handle.check_live(within) {
            Ok(true) => BootstrapState::Finished(BootstrapOutcome::Started),
            Ok(false) => BootstrapState::Polling { attempt, deadline },
            Err(error) => {
                tracing::debug!(
                    target: BOOTSTRAP_TARGET,
                    attempt,
                    error = %error,
                    "readiness probe failed"
                );
                BootstrapState::Polling { attempt, deadline }
            }
        }
    }
}

fn unreachable_with(error: BootstrapError) -> BootstrapState {
    BootstrapState::Finished(BootstrapOutcome::Unreachable(error))
}
