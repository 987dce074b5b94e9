//! Uploaded CSV source.
//!
//! Either a block of CSV text handed over in one piece, or a file on disk
//! that is re-read whenever its modification time advances.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use crate::data::{ingest_csv, ImportReport, ParameterTable};

#[derive(Debug)]
enum Origin {
    /// Text that has not been ingested yet; taken on the first poll.
    Inline(Option<String>),
    File {
        path: PathBuf,
        last_modified: Option<SystemTime>,
    },
}

/// A source that ingests uploaded CSV readings.
#[derive(Debug)]
pub struct CsvSource {
    origin: Origin,
    description: String,
    last_error: Option<String>,
}

impl CsvSource {
    /// A one-shot upload of CSV text.
    pub fn inline(text: impl Into<String>, name: &str) -> Self {
        Self {
            origin: Origin::Inline(Some(text.into())),
            description: format!("upload: {}", name),
            last_error: None,
        }
    }

    /// A CSV file that is re-ingested when it changes.
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            origin: Origin::File {
                path,
                last_modified: None,
            },
            description,
            last_error: None,
        }
    }

    /// The watched path, for file uploads.
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            Origin::Inline(_) => None,
            Origin::File { path, .. } => Some(path),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Ingest new content, if any.
    ///
    /// Inline text is returned once. A file is read on the first poll and
    /// again each time its modification time moves forward; a file that
    /// disappears after a successful read keeps the last data.
    pub fn poll(&mut self, table: &ParameterTable) -> Option<ImportReport> {
        match &mut self.origin {
            Origin::Inline(text) => text.take().map(|text| ingest_csv(&text, table)),
            Origin::File {
                path,
                last_modified,
            } => {
                let current = fs::metadata(&*path).ok().and_then(|m| m.modified().ok());
                let changed = match (&*last_modified, &current) {
                    (None, _) => true,
                    (Some(_), None) => false,
                    (Some(last), Some(current)) => current > last,
                };
                if !changed {
                    return None;
                }

                match fs::read_to_string(&*path) {
                    Ok(content) => {
                        *last_modified = current;
                        self.last_error = None;
                        Some(ingest_csv(&content, table))
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to read CSV upload");
                        self.last_error = Some(format!("Read error: {}", e));
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "timestamp,parameter,value\n\
                          2024-01-01 12:00:00,Temperature,25.0\n\
                          2024-01-01 12:00:00,Voltage,5.01\n";

    #[test]
    fn test_inline_source_yields_once() {
        let table = ParameterTable::default();
        let mut source = CsvSource::inline(SAMPLE, "bench.csv");
        assert_eq!(source.description(), "upload: bench.csv");
        assert!(source.path().is_none());

        let report = source.poll(&table).unwrap();
        assert_eq!(report.accepted.len(), 2);
        assert!(source.poll(&table).is_none());
    }

    #[test]
    fn test_file_source_new() {
        let source = CsvSource::file("/tmp/bench.csv");
        assert_eq!(source.path(), Some(Path::new("/tmp/bench.csv")));
        assert_eq!(source.description(), "file: /tmp/bench.csv");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let table = ParameterTable::default();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let mut source = CsvSource::file(file.path());

        let report = source.poll(&table).unwrap();
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected, 0);

        // Unchanged file yields nothing
        assert!(source.poll(&table).is_none());
    }

    #[test]
    fn test_file_source_detects_changes() {
        let table = ParameterTable::default();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();

        let mut source = CsvSource::file(file.path());
        let _ = source.poll(&table);

        std::thread::sleep(std::time::Duration::from_millis(10));
        file.rewind().unwrap();
        write!(
            file,
            "timestamp,parameter,value\n2024-01-01 12:01:00,Humidity,44.0\n"
        )
        .unwrap();
        file.flush().unwrap();

        // May not fire on filesystems with coarse mtime resolution
        if let Some(report) = source.poll(&table) {
            assert!(report.accepted.iter().any(|r| r.parameter == "Humidity"));
        }
    }

    #[test]
    fn test_file_source_missing_file() {
        let table = ParameterTable::default();
        let mut source = CsvSource::file("/nonexistent/path/bench.csv");

        assert!(source.poll(&table).is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_reports_rejections() {
        let table = ParameterTable::default();
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "timestamp,parameter,value\nnot-a-date,Temperature,1\n2024-01-01 12:00:00,Flux,3\n"
        )
        .unwrap();

        let mut source = CsvSource::file(file.path());
        let report = source.poll(&table).unwrap();
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected, 2);
        assert!(source.error().is_none());
    }
}
