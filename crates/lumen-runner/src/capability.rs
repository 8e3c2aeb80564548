//! Capability record emitted by a worker at startup.
//!
//! The supervisor reads one JSON object per worker and uses it to decide
//! whether the worker's build and host fit the work it is about to place.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const CAPABILITY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::capability");

/// Runtime capabilities of one worker process.
///
/// Serialises to exactly `system_info`, `version` and `cpu_features`, in
/// that order. Missing data is an empty string, never an absent key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRecord {
    /// Free-form description of the host CPU and platform.
    pub system_info: String,
    /// Build version of the running binary.
    pub version: String,
    /// Instruction-set extensions the binary was built for.
    pub cpu_features: String,
}

impl CapabilityRecord {
    /// Queries each provider once.
    #[must_use]
    pub fn collect<P>(providers: &P) -> Self
    where
        P: CapabilityProviders + ?Sized,
    {
        Self {
            system_info: providers.system_info(),
            version: providers.build_version(),
            cpu_features: providers.cpu_features(),
        }
    }

    /// Parses a record line written by [`CapabilityReporter::report`].
    ///
    /// Unknown keys are ignored so newer workers can add fields; every
    /// required key must be present.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the line is not a complete record.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }
}

/// Sources for the three record fields.
#[cfg_attr(test, mockall::automock)]
pub trait CapabilityProviders {
    /// Human-readable description of the host.
    fn system_info(&self) -> String;

    /// Version string of the running build.
    fn build_version(&self) -> String;

    /// Encoded instruction-set extensions.
    fn cpu_features(&self) -> String;
}

/// Errors raised while emitting a record.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The record could not be encoded.
    #[error("failed to serialise capability record: {0}")]
    Serialise(#[source] serde_json::Error),
    /// The sink rejected the record.
    #[error("failed to write capability record: {0}")]
    Write(#[source] io::Error),
}

/// Emits the capability record for the current process.
///
/// [`CapabilityReporter::report`] consumes the reporter, so a worker holding
/// one reporter writes its record at most once.
#[derive(Debug)]
pub struct CapabilityReporter<P> {
    providers: P,
}

impl<P> CapabilityReporter<P>
where
    P: CapabilityProviders,
{
    #[must_use]
    pub fn new(providers: P) -> Self {
        Self { providers }
    }

    /// Writes the record as one newline-terminated JSON object.
    ///
    /// Failures are logged and swallowed: a worker that cannot describe
    /// itself still serves.
    pub fn report<W: Write>(self, sink: W) {
        let record = CapabilityRecord::collect(&self.providers);
        if let Err(error) = write_record(&record, sink) {
            tracing::warn!(
                target: CAPABILITY_TARGET,
                error = %error,
                "capability record was not emitted"
            );
        }
    }
}

fn write_record<W: Write>(record: &CapabilityRecord, mut sink: W) -> Result<(), ReportError> {
    let mut line = serde_json::to_vec(record).map_err(ReportError::Serialise)?;
    line.push(b'\n');
    sink.write_all(&line).map_err(ReportError::Write)?;
    sink.flush().map_err(ReportError::Write)
}
