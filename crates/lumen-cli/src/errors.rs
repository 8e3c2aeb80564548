//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use lumen_config::SocketEndpoint;
use lumen_telemetry::TelemetryError;
use thiserror::Error;

use crate::bootstrap::BootstrapError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to install interrupt handler: {0}")]
    InstallInterrupt(io::Error),
    /// Bootstrap failures print their own user-facing message.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("failed to probe lumen server at {endpoint}: {source}")]
    Probe {
        endpoint: SocketEndpoint,
        source: io::Error,
    },
    #[error("failed to write output: {0}")]
    Output(io::Error),
}
