//! Entry point for the `lumen-runner` worker.

use std::process::ExitCode;

fn main() -> ExitCode {
    lumen_runner::run(std::env::args_os())
}
