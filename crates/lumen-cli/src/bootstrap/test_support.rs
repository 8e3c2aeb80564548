//! Shared fixtures for bootstrap tests.

use std::sync::Mutex;
use std::time::Duration;

use super::{BootstrapObserver, BootstrapOutcome};

/// Budget short enough to keep timeout tests fast.
pub(super) fn short_budget() -> super::PollBudget {
    super::PollBudget::new(Duration::from_millis(10), Duration::from_millis(100))
}

/// Event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Event {
    CheckingLiveness,
    Launching,
    PollAttempt(u32),
    Finished(&'static str),
}

/// Observer that remembers every event it receives.
#[derive(Debug, Default)]
pub(super) struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub(super) fn events(&self) -> Vec<Event> {
        self.events.lock().expect("observer lock").clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().expect("observer lock").push(event);
    }
}

impl BootstrapObserver for RecordingObserver {
    fn checking_liveness(&self) {
        self.push(Event::CheckingLiveness);
    }

    fn launching(&self) {
        self.push(Event::Launching);
    }

    fn poll_attempt(&self, attempt: u32) {
        self.push(Event::PollAttempt(attempt));
    }

    fn finished(&self, outcome: &BootstrapOutcome) {
        let label = match outcome {
            BootstrapOutcome::Reachable => "reachable",
            BootstrapOutcome::Started => "started",
            BootstrapOutcome::Unreachable(_) => "unreachable",
        };
        self.push(Event::Finished(label));
    }
}
