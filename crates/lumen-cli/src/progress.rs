//! Bootstrap observer that keeps the terminal user informed.

use std::cell::RefCell;
use std::io::Write;

use lumen_config::DAEMON_NAME;

use crate::bootstrap::{BootstrapObserver, BootstrapOutcome, TracingObserver};

/// Prints a waiting notice when the daemon is launched and forwards every
/// event to [`TracingObserver`].
pub(crate) struct ProgressObserver<'a, E: Write> {
    stderr: RefCell<&'a mut E>,
    tracing: TracingObserver,
}

impl<'a, E: Write> ProgressObserver<'a, E> {
    pub(crate) fn new(stderr: &'a mut E) -> Self {
        Self {
            stderr: RefCell::new(stderr),
            tracing: TracingObserver,
        }
    }
}

impl<E: Write> BootstrapObserver for ProgressObserver<'_, E> {
    fn checking_liveness(&self) {
        self.tracing.checking_liveness();
    }

    fn launching(&self) {
        self.tracing.launching();
        let mut stderr = self.stderr.borrow_mut();
        // Progress output is best effort.
        let _ = writeln!(stderr, "Waiting for {DAEMON_NAME} server to start...");
        let _ = stderr.flush();
    }

    fn poll_attempt(&self, attempt: u32) {
        self.tracing.poll_attempt(attempt);
    }

    fn finished(&self, outcome: &BootstrapOutcome) {
        self.tracing.finished(outcome);
    }
}
