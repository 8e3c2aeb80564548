//! BDD step definitions for the bootstrap strategies.
//!
//! Scenarios live in `tests/features/bootstrap.feature` and drive both
//! strategies against a scripted daemon, whatever the host platform.

use std::cell::RefCell;
use std::io;
use std::thread;
use std::time::{Duration, Instant};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::{
    AutoStart, BootstrapOutcome, Bootstrapper, Cancellation, DaemonHandle, LaunchState,
    ManualStart, PollBudget, TracingObserver,
};

const GUIDANCE: &str = "could not connect to lumen server, run 'lumen serve' to start it";

/// Daemon whose answers follow the scenario's script.
#[derive(Debug, Default)]
struct ScriptedDaemon {
    serving: bool,
    answers_on_poll: Option<u32>,
    launches: u32,
    polls: u32,
}

impl DaemonHandle for ScriptedDaemon {
    fn check_live(&mut self, _within: Duration) -> io::Result<bool> {
        if self.launches > 0 {
            self.polls += 1;
            if self.answers_on_poll.is_some_and(|poll| self.polls >= poll) {
                self.serving = true;
            }
        }
        Ok(self.serving)
    }

    fn launch(&mut self) -> io::Result<()> {
        self.launches += 1;
        Ok(())
    }

    fn launch_state(&mut self) -> io::Result<LaunchState> {
        Ok(LaunchState::Running)
    }
}

struct BootstrapWorld {
    daemon: ScriptedDaemon,
    budget: PollBudget,
    interrupt_after: Option<Duration>,
    outcome: Option<BootstrapOutcome>,
    elapsed: Duration,
}

impl Default for BootstrapWorld {
    fn default() -> Self {
        Self {
            daemon: ScriptedDaemon::default(),
            budget: PollBudget::new(Duration::from_millis(10), Duration::from_millis(500)),
            interrupt_after: None,
            outcome: None,
            elapsed: Duration::ZERO,
        }
    }
}

impl BootstrapWorld {
    fn bootstrap<B: Bootstrapper>(&mut self, strategy: &B) {
        let cancel = Cancellation::new();
        let interrupt_after = self.interrupt_after;
        let daemon = &mut self.daemon;
        let started = Instant::now();
        let outcome = thread::scope(|scope| {
            if let Some(delay) = interrupt_after {
                let cancel = &cancel;
                scope.spawn(move || {
                    thread::sleep(delay);
                    cancel.cancel();
                });
            }
            strategy.bootstrap(daemon, &cancel, &TracingObserver)
        });
        self.elapsed = started.elapsed();
        self.outcome = Some(outcome);
    }

    fn outcome(&self) -> &BootstrapOutcome {
        self.outcome.as_ref().expect("bootstrap has run")
    }

    fn failure_message(&self) -> String {
        match self.outcome() {
            BootstrapOutcome::Unreachable(error) => error.to_string(),
            other => panic!("expected an unreachable outcome, got {other:?}"),
        }
    }
}

#[fixture]
fn world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::default())
}

#[given("no lumen server is running")]
fn given_no_server(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().daemon.serving = false;
}

#[given("a lumen server is already running")]
fn given_running_server(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().daemon.serving = true;
}

#[given("a launched server answers on poll {poll}")]
fn given_answers_on_poll(world: &RefCell<BootstrapWorld>, poll: u32) {
    world.borrow_mut().daemon.answers_on_poll = Some(poll);
}

#[given("a startup budget of {timeout} ms polled every {interval} ms")]
fn given_budget(world: &RefCell<BootstrapWorld>, timeout: u64, interval: u64) {
    world.borrow_mut().budget = PollBudget::new(
        Duration::from_millis(interval),
        Duration::from_millis(timeout),
    );
}

#[given("an interrupt arrives after {delay} ms")]
fn given_interrupt(world: &RefCell<BootstrapWorld>, delay: u64) {
    world.borrow_mut().interrupt_after = Some(Duration::from_millis(delay));
}

#[when("the manual strategy bootstraps")]
fn when_manual(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().bootstrap(&ManualStart);
}

#[when("the auto-start strategy bootstraps")]
fn when_auto_start(world: &RefCell<BootstrapWorld>) {
    let budget = world.borrow().budget;
    world.borrow_mut().bootstrap(&AutoStart::new(budget));
}

#[then("the outcome is {label}")]
fn then_outcome(world: &RefCell<BootstrapWorld>, label: String) {
    let world = world.borrow();
    let actual = match world.outcome() {
        BootstrapOutcome::Reachable => "reachable",
        BootstrapOutcome::Started => "started",
        BootstrapOutcome::Unreachable(_) => "unreachable",
    };
    assert_eq!(actual, label.trim_matches('"'), "outcome {:?}", world.outcome());
}

#[then("the failure reads {message}")]
fn then_failure_reads(world: &RefCell<BootstrapWorld>, message: String) {
    assert_eq!(
        world.borrow().failure_message(),
        message.trim_matches('"')
    );
}

#[then("the failure differs from the manual guidance")]
fn then_not_guidance(world: &RefCell<BootstrapWorld>) {
    assert_ne!(world.borrow().failure_message(), GUIDANCE);
}

#[then("the launch count is {count}")]
fn then_launch_count(world: &RefCell<BootstrapWorld>, count: u32) {
    assert_eq!(world.borrow().daemon.launches, count);
}

#[then("the bootstrap ended within {limit} ms")]
fn then_ended_within(world: &RefCell<BootstrapWorld>, limit: u64) {
    let elapsed = world.borrow().elapsed;
    assert!(
        elapsed < Duration::from_millis(limit),
        "bootstrap took {elapsed:?}"
    );
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Manual start reports guidance without launching"
)]
fn manual_start_guidance(world: RefCell<BootstrapWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Manual start accepts a running server"
)]
fn manual_start_running(world: RefCell<BootstrapWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Auto-start leaves a running server alone"
)]
fn auto_start_running(world: RefCell<BootstrapWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Auto-start launches an absent server and waits for it"
)]
fn auto_start_launches(world: RefCell<BootstrapWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "Auto-start gives up when the budget runs out"
)]
fn auto_start_times_out(world: RefCell<BootstrapWorld>) {
    let _ = world;
}

#[scenario(
    path = "tests/features/bootstrap.feature",
    name = "An interrupt while polling cancels the bootstrap"
)]
fn interrupt_cancels_polling(world: RefCell<BootstrapWorld>) {
    let _ = world;
}
