//! Worker process runtime for `lumen-runner`.
//!
//! A worker announces itself by writing one [`CapabilityRecord`] before it
//! reports readiness. Its supervisor reads the record to judge whether the
//! worker's build and host suit the work it intends to place there. With
//! `--requirements` the worker prints the record and exits, which lets a
//! supervisor probe a binary without keeping it running.

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lumen_config::Config;
use ortho_config::OrthoConfig;
use thiserror::Error;

mod capability;
mod host;
mod shutdown;

pub use capability::{CapabilityProviders, CapabilityRecord, CapabilityReporter, ReportError};
pub use host::HostProviders;
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub(crate) const RUNNER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runner");

/// Command-line arguments accepted by the worker.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "lumen-runner", version)]
pub struct RunnerArgs {
    /// Prints the capability record to stdout and exits.
    #[arg(long)]
    pub requirements: bool,
    /// Writes the startup capability record to this file instead of stdout.
    #[arg(long, value_name = "PATH", conflicts_with = "requirements")]
    pub report_file: Option<PathBuf>,
}

/// Errors that stop the worker.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Arguments could not be parsed.
    #[error("{0}")]
    CliUsage(#[source] clap::Error),
    /// Layered configuration could not be loaded.
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(#[source] Arc<ortho_config::OrthoError>),
    /// Logging could not be initialised.
    #[error(transparent)]
    Telemetry(#[from] lumen_telemetry::TelemetryError),
    /// The report file could not be created.
    #[error("failed to create report file {}: {source}", .path.display())]
    ReportFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Waiting for shutdown failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

/// Runs the worker with the process arguments and host providers.
#[must_use]
pub fn run<I>(args: I) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| OsString::from("lumen-runner"));
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let args = match RunnerArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report_failure(&mut stderr, &RunnerError::CliUsage(error)),
    };

    // A worker must be able to describe itself even when its logging
    // settings are broken.
    let result = if args.requirements {
        execute(&args, HostProviders, &SystemShutdownSignal, &mut stdout)
    } else {
        load_config(program)
            .and_then(|config| {
                lumen_telemetry::initialise(&config)?;
                Ok(())
            })
            .and_then(|()| execute(&args, HostProviders, &SystemShutdownSignal, &mut stdout))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report_failure(&mut stderr, &error),
    }
}

/// Loads configuration from files and the environment.
///
/// The worker's own flags are not configuration flags, so only the program
/// name reaches the loader.
fn load_config(program: OsString) -> Result<Config, RunnerError> {
    Config::load_from_iter([program]).map_err(RunnerError::LoadConfiguration)
}

fn report_failure<E: Write>(stderr: &mut E, error: &RunnerError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    ExitCode::FAILURE
}

/// Emits the capability record and, unless only the requirements were
/// requested, idles until `shutdown` fires.
///
/// # Errors
///
/// Returns [`RunnerError::ReportFile`] when the report file cannot be
/// created and [`RunnerError::Shutdown`] when signal handling fails.
pub fn execute<P, S, W>(
    args: &RunnerArgs,
    providers: P,
    shutdown: &S,
    stdout: &mut W,
) -> Result<(), RunnerError>
where
    P: CapabilityProviders,
    S: ShutdownSignal + ?Sized,
    W: Write,
{
    let reporter = CapabilityReporter::new(providers);
    if args.requirements {
        reporter.report(stdout);
        return Ok(());
    }

    match &args.report_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| RunnerError::ReportFile {
                path: path.clone(),
                source,
            })?;
            reporter.report(file);
        }
        None => reporter.report(&mut *stdout),
    }

    tracing::info!(target: RUNNER_TARGET, event = "ready", "runner ready");
    shutdown.wait()?;
    tracing::info!(target: RUNNER_TARGET, event = "stopped", "runner stopped");
    Ok(())
}
