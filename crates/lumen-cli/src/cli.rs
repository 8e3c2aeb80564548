//! Argument definitions for `lumenctl`.

use clap::{Parser, Subcommand};

/// Front end for the lumen model server.
///
/// Configuration flags such as `--daemon-socket` and `--config-path` must
/// precede the subcommand.
#[derive(Parser, Debug)]
#[command(
    name = "lumenctl",
    version,
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Ensures the lumen server is running, starting it where supported.
    Start,
    /// Reports whether the lumen server is reachable.
    Status,
}
