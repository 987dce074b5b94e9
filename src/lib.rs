//! # benchwatch
//!
//! A terminal dashboard for bench hardware telemetry.
//!
//! Readings for a fixed set of parameters (temperature, voltage, humidity,
//! resistance by default) arrive from a simulated generator or an uploaded
//! CSV file. Each reading is classified into a Normal / Warning / Critical
//! band, kept in a rolling 30-minute history and charted live. A simulated
//! RS422 link monitor, an LED panel and three control switches complete the
//! bench.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│ session  │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (input) │    │ (state)  │    │(render) │    │         │ │
//! │  └─────────┘    └────┬─────┘    └─────────┘    └─────────┘ │
//! │                      │                                      │
//! │                      ▼                                      │
//! │  ┌─────────┐    ┌──────────┐                                │
//! │  │ source  │───▶│   data   │◀── Simulated | Uploaded (CSV)  │
//! │  └─────────┘    └──────────┘                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Parameter table, status classifier, history buffer, CSV
//!   ingestion, link monitor and control panel models
//! - **[`source`]**: The [`ReadingSource`] tagged union over simulated and
//!   uploaded readings
//! - **[`session`]**: Per-viewer [`Session`] state tying the pieces together
//! - **[`config`]**: [`Settings`] loaded from file and environment
//! - **[`app`]**, **[`events`]**, **[`ui`]**: The terminal front end
//!
//! ## Usage
//!
//! ```bash
//! # Simulated readings
//! benchwatch
//!
//! # Start from a CSV file (re-read when it changes)
//! benchwatch --upload data/sample_parameters.csv
//!
//! # Write a JSON report and exit
//! benchwatch --upload data/sample_parameters.csv --export report.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use benchwatch::{Session, Settings, StatusLevel};
//!
//! let mut session = Session::new(&Settings::default()).unwrap();
//! let summary = session
//!     .upload_text("Timestamp,Parameter,Value\n2024-01-01T00:00:00,Temperature,25\n")
//!     .unwrap();
//! assert_eq!(summary.accepted, 1);
//!
//! let points = session.series("Temperature");
//! assert_eq!(points[0].status, StatusLevel::Normal);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod session;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    classify, ClassifiedPoint, HistoryBuffer, ImportReport, IngestError, ParameterSpec,
    ParameterTable, Reading, StatusLevel, TimeWindow,
};
pub use session::{Session, SessionReport, UploadSummary};
pub use source::{Batch, CsvSource, Provenance, ReadingSource, SimulatedSource};
