//! CSV ingestion for uploaded parameter data.
//!
//! Uploads are `Timestamp,Parameter,Value` tables. Ingestion is best-effort:
//! rows that fail to parse are skipped and counted, never raised. Only an
//! upload that yields nothing at all is reported as an error, and even that
//! is a warning for the user rather than a failure of the session.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::parameter::ParameterTable;
use super::series::Reading;

/// Required header columns, matched case-insensitively.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const PARAMETER_COLUMN: &str = "Parameter";
pub const VALUE_COLUMN: &str = "Value";

/// Upper bound on per-row rejection details kept in a report.
const MAX_REJECTION_DETAILS: usize = 200;

/// Naive date-time layouts accepted in the Timestamp column, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Errors surfaced at the ingestion boundary.
#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    /// No row in the upload could be used.
    #[error("upload contained no valid rows ({rejected} rejected)")]
    EmptyUpload { rejected: usize },

    /// The upload file could not be read.
    #[error("could not read upload: {0}")]
    Read(String),
}

/// Why a row was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectKind {
    /// Timestamp or value failed to parse, or the row was structurally broken.
    MalformedRow,
    /// The row names a parameter that is not in the table.
    UnknownParameter,
}

/// A skipped row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// 1-based line number in the uploaded text.
    pub line: u64,
    pub kind: RejectKind,
    pub detail: String,
}

/// Outcome of ingesting one upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Readings in file order, with canonical parameter names.
    pub accepted: Vec<Reading>,
    /// Total number of skipped rows.
    pub rejected: usize,
    /// Skipped rows that failed to parse.
    pub malformed: usize,
    /// Skipped rows naming a parameter outside the table.
    pub unknown_parameter: usize,
    /// Details for the first skipped rows.
    pub rejections: Vec<Rejection>,
}

impl ImportReport {
    fn reject(&mut self, line: u64, kind: RejectKind, detail: String) {
        debug!(line, ?kind, %detail, "Skipping CSV row");
        self.rejected += 1;
        match kind {
            RejectKind::MalformedRow => self.malformed += 1,
            RejectKind::UnknownParameter => self.unknown_parameter += 1,
        }
        if self.rejections.len() < MAX_REJECTION_DETAILS {
            self.rejections.push(Rejection { line, kind, detail });
        }
    }

    /// Number of skipped rows of one kind.
    pub fn count(&self, kind: RejectKind) -> usize {
        match kind {
            RejectKind::MalformedRow => self.malformed,
            RejectKind::UnknownParameter => self.unknown_parameter,
        }
    }

    /// Turn an upload that produced nothing into [`IngestError::EmptyUpload`].
    pub fn into_result(self) -> Result<Self, IngestError> {
        if self.accepted.is_empty() {
            Err(IngestError::EmptyUpload {
                rejected: self.rejected,
            })
        } else {
            Ok(self)
        }
    }
}

/// Column positions resolved from the header row.
struct Columns {
    timestamp: usize,
    parameter: usize,
    value: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        Some(Self {
            timestamp: find(TIMESTAMP_COLUMN)?,
            parameter: find(PARAMETER_COLUMN)?,
            value: find(VALUE_COLUMN)?,
        })
    }
}

/// Parse uploaded CSV text against the parameter table.
///
/// Never fails: a missing header column makes every data row malformed, and
/// unreadable records are counted like any other bad row.
pub fn ingest_csv(text: &str, table: &ParameterTable) -> ImportReport {
    let mut report = ImportReport::default();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns = match reader.headers() {
        Ok(headers) => Columns::locate(headers),
        Err(e) => {
            debug!(error = %e, "Unreadable CSV header");
            None
        }
    };

    for (index, record) in reader.records().enumerate() {
        // Header is line 1; fall back to counting when the reader has no position
        let fallback_line = index as u64 + 2;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line());
                report.reject(line, RejectKind::MalformedRow, e.to_string());
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line());

        let Some(columns) = columns.as_ref() else {
            report.reject(
                line,
                RejectKind::MalformedRow,
                format!(
                    "header must contain {}, {}, {}",
                    TIMESTAMP_COLUMN, PARAMETER_COLUMN, VALUE_COLUMN
                ),
            );
            continue;
        };

        match parse_row(&record, columns, table) {
            Ok(reading) => report.accepted.push(reading),
            Err((kind, detail)) => report.reject(line, kind, detail),
        }
    }

    info!(
        accepted = report.accepted.len(),
        rejected = report.rejected,
        "Ingested CSV upload"
    );
    report
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    table: &ParameterTable,
) -> Result<Reading, (RejectKind, String)> {
    let field = |i: usize| record.get(i).unwrap_or("");

    let raw_ts = field(columns.timestamp);
    let timestamp = parse_timestamp(raw_ts)
        .ok_or_else(|| (RejectKind::MalformedRow, format!("invalid timestamp '{}'", raw_ts)))?;

    let raw_param = field(columns.parameter);
    let spec = table.get(raw_param).ok_or_else(|| {
        (
            RejectKind::UnknownParameter,
            format!("unknown parameter '{}'", raw_param),
        )
    })?;

    let raw_value = field(columns.value);
    let value = raw_value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| (RejectKind::MalformedRow, format!("invalid value '{}'", raw_value)))?;

    Ok(Reading::new(timestamp, &spec.name, value))
}

/// Parse a Timestamp cell.
///
/// Accepts RFC 3339 / ISO-8601 with an offset (converted to UTC), the naive
/// layouts in [`DATETIME_FORMATS`], and a bare `YYYY-MM-DD` meaning midnight.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
