//! Logging setup shared by `lumenctl` and `lumen-runner`.
//!
//! Both binaries keep stdout for their results: `lumenctl` prints server
//! status there and `lumen-runner` writes its capability record. Every log
//! event therefore goes to stderr, or to whichever writer a caller hands to
//! [`TelemetrySettings::build`].

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::{EnvFilter, ParseError};
use tracing_subscriber::fmt::{self, MakeWriter, time::UtcTime};

use lumen_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// A fully configured subscriber, ready to install.
pub type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid filter directive list.
    #[error("invalid log filter '{expression}': {source}")]
    Filter {
        expression: String,
        #[source]
        source: ParseError,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
}

/// Logging choices taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySettings {
    filter: String,
    format: LogFormat,
    ansi: bool,
}

impl TelemetrySettings {
    /// Reads `log_filter` and `log_format`; colour follows whether stderr is
    /// a terminal.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            filter: config.log_filter().to_owned(),
            format: config.log_format(),
            ansi: io::stderr().is_terminal(),
        }
    }

    /// Overrides terminal colour detection. JSON output never carries colour.
    #[must_use]
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    #[must_use]
    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Builds a subscriber writing through `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Filter`] when the filter does not parse.
    pub fn build<W>(&self, writer: W) -> Result<BoxedSubscriber, TelemetryError>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = EnvFilter::try_new(&self.filter).map_err(|source| TelemetryError::Filter {
            expression: self.filter.clone(),
            source,
        })?;
        let builder = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_target(true)
            .with_timer(UtcTime::rfc_3339());

        Ok(match self.format {
            LogFormat::Json => Box::new(builder.with_ansi(false).json().flatten_event(true).finish()),
            LogFormat::Compact => Box::new(builder.with_ansi(self.ansi).compact().finish()),
        })
    }
}

/// Installs the process-wide stderr subscriber on first use.
///
/// Later calls succeed without touching the installed subscriber, so the
/// settings of the first call win.
///
/// # Errors
///
/// Fails when the filter does not parse or another subscriber was already
/// installed by someone else.
///
/// # Examples
///
/// ```rust
/// use lumen_config::Config;
///
/// # fn main() -> Result<(), lumen_telemetry::TelemetryError> {
/// lumen_telemetry::initialise(&Config::default())?;
/// lumen_telemetry::initialise(&Config::default())?;
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED.get_or_try_init(|| {
        let subscriber = TelemetrySettings::from_config(config).build(io::stderr)?;
        tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
    })?;
    Ok(())
}
