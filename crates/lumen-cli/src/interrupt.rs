//! Routes interrupt signals to a bootstrap [`Cancellation`] token.

use std::io;
use std::sync::Arc;

use crate::bootstrap::Cancellation;

#[cfg(unix)]
mod imp {
    use std::io;
    use std::sync::Arc;
    use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::{Handle, Signals};
    use tracing::Dispatch;

    use crate::bootstrap::Cancellation;

    const INTERRUPT_TARGET: &str = "lumen_cli::interrupt";

    /// How long dropping the guard waits for the listener to finish.
    const LISTENER_STOP_GRACE: Duration = Duration::from_millis(200);

    /// Stops the listener thread when dropped.
    #[derive(Debug)]
    pub(crate) struct InterruptGuard {
        handle: Handle,
        listener: Option<JoinHandle<()>>,
        stopped: Receiver<()>,
    }

    pub(super) fn install(cancel: Arc<Cancellation>) -> io::Result<InterruptGuard> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let (running, stopped) = mpsc::channel::<()>();
        let dispatch = tracing::dispatcher::get_default(Dispatch::clone);
        let listener = thread::Builder::new()
            .name(String::from("lumenctl-interrupt"))
            .spawn(move || {
                let _running = running;
                if let Some(signal) = signals.forever().next() {
                    // The log sink may be held by the bootstrapping thread, so
                    // the token is cancelled first.
                    cancel.cancel();
                    tracing::dispatcher::with_default(&dispatch, || {
                        tracing::info!(
                            target: INTERRUPT_TARGET,
                            signal,
                            "interrupt received; bootstrap cancelled"
                        );
                    });
                }
            })?;
        Ok(InterruptGuard {
            handle,
            listener: Some(listener),
            stopped,
        })
    }

    impl Drop for InterruptGuard {
        fn drop(&mut self) {
            self.handle.close();
            let Some(listener) = self.listener.take() else {
                return;
            };
            match self.stopped.recv_timeout(LISTENER_STOP_GRACE) {
                Err(RecvTimeoutError::Timeout) => {
                    // Still blocked on its log line; it exits once that lands.
                    drop(listener);
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    let _ = listener.join();
                }
            }
        }
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io;
    use std::sync::Arc;

    use crate::bootstrap::Cancellation;

    #[derive(Debug)]
    pub(crate) struct InterruptGuard;

    pub(super) fn install(_cancel: Arc<Cancellation>) -> io::Result<InterruptGuard> {
        Ok(InterruptGuard)
    }
}

pub(crate) use imp::InterruptGuard;

/// Serialises tests that raise signals with tests that install listeners.
#[cfg(test)]
pub(crate) static SIGNAL_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Cancels `cancel` when the process receives SIGINT or SIGTERM.
///
/// The listener lives until the returned guard is dropped and logs through
/// the subscriber that was current when it was installed. Targets without
/// Unix signals keep their default console interrupt handling.
pub(crate) fn cancel_on_interrupt(cancel: Arc<Cancellation>) -> io::Result<InterruptGuard> {
    imp::install(cancel)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::{MutexGuard, PoisonError};
    use std::time::{Duration, Instant};

    use lumen_config::Config;
    use lumen_telemetry::TelemetrySettings;
    use signal_hook::consts::signal::{SIGINT, SIGTERM};

    fn serialise_signals() -> MutexGuard<'static, ()> {
        SIGNAL_TEST_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn termination_signal_cancels_token() {
        let _signals = serialise_signals();
        let cancel = Arc::new(Cancellation::new());
        let guard = cancel_on_interrupt(Arc::clone(&cancel)).expect("install listener");

        signal_hook::low_level::raise(SIGTERM).expect("raise SIGTERM");

        assert!(cancel.wait_timeout(Duration::from_secs(5)));
        drop(guard);
    }

    #[test]
    fn interrupt_cancels_while_stderr_is_locked() {
        let _signals = serialise_signals();
        let config = Config {
            log_filter: String::from("info"),
            ..Config::default()
        };
        let subscriber = TelemetrySettings::from_config(&config)
            .with_ansi(false)
            .build(io::stderr)
            .expect("build subscriber");
        let _logging = tracing::subscriber::set_default(subscriber);
        let cancel = Arc::new(Cancellation::new());
        let stderr = io::stderr().lock();
        let guard = cancel_on_interrupt(Arc::clone(&cancel)).expect("install listener");

        signal_hook::low_level::raise(SIGINT).expect("raise SIGINT");

        assert!(
            cancel.wait_timeout(Duration::from_secs(5)),
            "interrupt was not delivered while stderr was locked"
        );
        let dropping = Instant::now();
        drop(guard);
        assert!(
            dropping.elapsed() < Duration::from_secs(2),
            "dropping the guard waited {:?}",
            dropping.elapsed()
        );
        drop(stderr);
    }
}
