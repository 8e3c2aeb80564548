//! Entry point for `lumenctl`.
//!
//! Delegates to [`lumen_cli::run`], which loads configuration, makes sure the
//! lumen server is usable and reports the result.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    // Unlocked: log events from other threads share this stream.
    let mut stderr = io::stderr();
    lumen_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
