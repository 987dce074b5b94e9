//! Reading sources.
//!
//! Readings reach a session from one of two places: the simulated generator
//! or an uploaded CSV table. [`ReadingSource`] tags which one is active so the
//! history buffer and classifier never need to know where a reading came from.

mod file;
mod simulated;

pub use file::CsvSource;
pub use simulated::{LinkSimulator, SimulatedSource};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::data::{ImportReport, ParameterTable, Reading};

/// Errors raised while building a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A simulation profile could not be turned into a distribution.
    #[error("invalid simulation profile for {parameter}: {message}")]
    Distribution { parameter: String, message: String },
}

/// Where a batch of readings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Provenance {
    Simulated,
    Uploaded,
}

impl Provenance {
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Simulated => "simulated",
            Provenance::Uploaded => "uploaded",
        }
    }
}

/// Readings produced by one poll of a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    /// Fresh readings to add to the history.
    Simulated(Vec<Reading>),
    /// A complete ingest of the upload; its readings replace the history.
    Uploaded(ImportReport),
}

impl Batch {
    pub fn provenance(&self) -> Provenance {
        match self {
            Batch::Simulated(_) => Provenance::Simulated,
            Batch::Uploaded(_) => Provenance::Uploaded,
        }
    }
}

/// The active source for a session.
#[derive(Debug)]
pub enum ReadingSource {
    Simulated(SimulatedSource),
    Uploaded(CsvSource),
}

impl ReadingSource {
    /// Poll for new readings.
    ///
    /// Returns `None` when nothing new is available. Never blocks.
    pub fn poll(&mut self, now: NaiveDateTime, table: &ParameterTable) -> Option<Batch> {
        match self {
            ReadingSource::Simulated(sim) => sim.poll(now).map(Batch::Simulated),
            ReadingSource::Uploaded(csv) => csv.poll(table).map(Batch::Uploaded),
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            ReadingSource::Simulated(_) => Provenance::Simulated,
            ReadingSource::Uploaded(_) => Provenance::Uploaded,
        }
    }

    /// Human-readable description for the status bar.
    pub fn description(&self) -> &str {
        match self {
            ReadingSource::Simulated(sim) => sim.description(),
            ReadingSource::Uploaded(csv) => csv.description(),
        }
    }

    /// The error from the last poll, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            ReadingSource::Simulated(_) => None,
            ReadingSource::Uploaded(csv) => csv.error(),
        }
    }
}
