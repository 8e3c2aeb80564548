//! Command-line runtime for `lumenctl`.
//!
//! The runtime splits configuration flags from the subcommand, loads the
//! layered [`Config`], installs telemetry and then makes sure the lumen
//! server is usable before doing anything else. The pieces are injectable so
//! tests can substitute the configuration loader, the output streams and the
//! daemon handle.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use lumen_config::{Config, DAEMON_NAME, SocketEndpoint};

pub mod bootstrap;
mod cli;
mod config;
mod errors;
mod interrupt;
mod progress;

use bootstrap::{
    BootstrapOutcome, Bootstrapper, Cancellation, DaemonHandle, LIVENESS_PROBE_TIMEOUT,
    SocketDaemon, platform_bootstrapper,
};
use cli::{Cli, CliCommand};
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use interrupt::cancel_on_interrupt;
use progress::ProgressObserver;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `lumen_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--daemon-socket",
    "--daemon-binary",
    "--startup-timeout-ms",
    "--poll-interval-ms",
    "--log-filter",
    "--log-format",
];

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let cli = match Cli::try_parse_from(cli_arguments) {
            Ok(cli) => cli,
            Err(error) if !error.use_stderr() => return self.print_informational(&error),
            Err(error) => return self.fail(&AppError::CliUsage(error)),
        };

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| {
                lumen_telemetry::initialise(&config)?;
                Ok(config)
            })
            .and_then(|config| self.dispatch(cli.command, &config));

        result.unwrap_or_else(|error| self.fail(&error))
    }

    fn fail(&mut self, error: &AppError) -> ExitCode {
        let _ = writeln!(self.io.stderr, "{error}");
        ExitCode::FAILURE
    }

    /// Help and version requests arrive as clap errors but belong on stdout
    /// with a zero exit code.
    fn print_informational(&mut self, message: &clap::Error) -> ExitCode {
        let _ = write!(self.io.stdout, "{message}");
        let _ = self.io.stdout.flush();
        ExitCode::SUCCESS
    }

    fn dispatch(&mut self, command: CliCommand, config: &Config) -> Result<ExitCode, AppError> {
        let mut daemon = SocketDaemon::from_config(config);
        match command {
            CliCommand::Start => {
                let cancel = Arc::new(Cancellation::new());
                let _interrupts =
                    cancel_on_interrupt(Arc::clone(&cancel)).map_err(AppError::InstallInterrupt)?;
                let bootstrapper = platform_bootstrapper(config);
                execute_start(
                    &bootstrapper,
                    &mut daemon,
                    config.daemon_socket(),
                    &cancel,
                    self.io,
                )
            }
            CliCommand::Status => execute_status(&mut daemon, config.daemon_socket(), self.io),
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    args.first()
        .into_iter()
        .chain(args.iter().skip(split.command_start))
        .cloned()
        .collect()
}

/// Ensures the daemon is usable, reporting how it became so.
fn execute_start<B, H, W, E>(
    bootstrapper: &B,
    daemon: &mut H,
    endpoint: &SocketEndpoint,
    cancel: &Cancellation,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError>
where
    B: Bootstrapper,
    H: DaemonHandle,
    W: Write,
    E: Write,
{
    let outcome = {
        let observer = ProgressObserver::new(&mut *io.stderr);
        bootstrapper.bootstrap(daemon, cancel, &observer)
    };
    match outcome {
        BootstrapOutcome::Reachable => {
            writeln!(io.stdout, "{DAEMON_NAME} server is running at {endpoint}")
                .map_err(AppError::Output)?;
        }
        BootstrapOutcome::Started => {
            writeln!(io.stdout, "{DAEMON_NAME} server started at {endpoint}")
                .map_err(AppError::Output)?;
        }
        BootstrapOutcome::Unreachable(error) => return Err(AppError::Bootstrap(error)),
    }
    io.stdout.flush().map_err(AppError::Output)?;
    Ok(ExitCode::SUCCESS)
}

/// Probes the daemon without attempting to start it.
fn execute_status<H, W, E>(
    daemon: &mut H,
    endpoint: &SocketEndpoint,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError>
where
    H: DaemonHandle,
    W: Write,
    E: Write,
{
    let live = daemon
        .check_live(LIVENESS_PROBE_TIMEOUT)
        .map_err(|source| AppError::Probe {
            endpoint: endpoint.clone(),
            source,
        })?;
    let written = if live {
        writeln!(io.stdout, "{DAEMON_NAME} server is running at {endpoint}")
    } else {
        writeln!(
            io.stdout,
            "{DAEMON_NAME} server is not running; run '{DAEMON_NAME} serve' to start it"
        )
    };
    written.map_err(AppError::Output)?;
    io.stdout.flush().map_err(AppError::Output)?;
    Ok(ExitCode::SUCCESS)
}
