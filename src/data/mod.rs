//! Data models and processing for bench telemetry.
//!
//! This module turns raw readings into classified, windowed series suitable
//! for display.
//!
//! ## Submodules
//!
//! - [`parameter`]: The parameter definition table ([`ParameterSpec`], [`ParameterTable`])
//! - [`status`]: Status bands ([`StatusLevel`]) and the classifier
//! - [`series`]: [`Reading`], classified points and series statistics
//! - [`history`]: The rolling [`HistoryBuffer`] with windowed queries
//! - [`ingest`]: CSV upload parsing into readings
//! - [`link`]: RS422 link quality and message validation tracking
//! - [`panel`]: Control switches and LED indicators
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "30m", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! Simulated generator / CSV upload
//!        │
//!        ▼
//!   Vec<Reading>
//!        │
//!        ▼
//! HistoryBuffer::append()  (ordered, de-duplicated, pruned to window)
//!        │
//!        ▼
//! HistoryBuffer::query() ──▶ classify_series() ──▶ ClassifiedPoint / SeriesStats
//! ```

pub mod duration;
pub mod history;
pub mod ingest;
pub mod link;
pub mod panel;
pub mod parameter;
pub mod series;
pub mod status;

pub use history::{HistoryBuffer, HistorySeries, Query, TimeWindow, DEFAULT_WINDOW_MINUTES};
pub use ingest::{ingest_csv, ImportReport, IngestError, RejectKind, Rejection};
pub use link::{LinkMonitor, LinkQuality, LinkSample, LinkThresholds};
pub use panel::{CommState, ControlSwitches, Led, Switch};
pub use parameter::{ParameterError, ParameterSpec, ParameterTable, SimulationProfile};
pub use series::{classify_series, ClassifiedPoint, Reading, SeriesStats};
pub use status::{classify, StatusLevel};
