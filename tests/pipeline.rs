//! End-to-end checks of the reading pipeline: upload, history, classification.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use benchwatch::data::{ingest_csv, RejectKind};
use benchwatch::{
    HistoryBuffer, IngestError, ParameterSpec, ParameterTable, Provenance, Reading, Session,
    Settings, StatusLevel, TimeWindow,
};

const SAMPLE: &str = include_str!("../data/sample_parameters.csv");

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn seeded_session() -> Session {
    let settings = Settings {
        seed: Some(2024),
        ..Settings::default()
    };
    Session::new(&settings).unwrap()
}

#[test]
fn single_row_upload_is_normal() {
    let table = ParameterTable::new(vec![ParameterSpec::new(
        "Temperature",
        "°C",
        18.0,
        35.0,
        2.0,
        5.0,
    )])
    .unwrap();

    let report = ingest_csv("Timestamp,Parameter,Value\n2024-01-01T00:00:00,Temperature,25\n", &table);
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.rejected, 0);
    assert_eq!(
        table.get("Temperature").unwrap().classify(report.accepted[0].value),
        StatusLevel::Normal
    );
}

#[test]
fn bad_value_is_counted_not_accepted() {
    let table = ParameterTable::default();
    let report = ingest_csv(
        "Timestamp,Parameter,Value\n\
         2024-01-01T00:00:00,Temperature,25\n\
         2024-01-01T00:00:00,Temperature,abc\n",
        &table,
    );
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(report.count(RejectKind::MalformedRow), 1);
}

#[test]
fn empty_upload_keeps_history() {
    let mut session = seeded_session();
    session
        .upload_text("Timestamp,Parameter,Value\n2024-01-01 00:00:00,Humidity,45\n")
        .unwrap();
    let before = session.history().len();

    let err = session
        .upload_text("Timestamp,Parameter,Value\n2024-01-01 00:01:00,Flux,1\n")
        .unwrap_err();
    assert_eq!(err, IngestError::EmptyUpload { rejected: 1 });
    assert_eq!(session.history().len(), before);

    let err = session.upload_text("").unwrap_err();
    assert_eq!(err, IngestError::EmptyUpload { rejected: 0 });
    assert_eq!(session.history().len(), before);
}

#[test]
fn sample_file_classifies_every_band() {
    let mut session = seeded_session();
    let summary = session.upload_text(SAMPLE).unwrap();
    assert_eq!(summary.accepted, 82);
    assert_eq!(summary.rejected, 0);
    assert_eq!(session.source().provenance(), Provenance::Uploaded);

    let temperature = session.stats("Temperature").unwrap();
    assert_eq!(temperature.latest.status, StatusLevel::Critical);
    assert_eq!(temperature.worst, StatusLevel::Critical);

    let voltage = session.stats("Voltage").unwrap();
    assert_eq!(voltage.latest.status, StatusLevel::Warning);

    assert_eq!(session.overall_status(), Some(StatusLevel::Critical));
}

#[test]
fn history_has_no_duplicate_timestamps() {
    let mut buffer = HistoryBuffer::default();
    for value in [1.0, 2.0, 3.0] {
        buffer.append(Reading::new(at(12, 0), "Voltage", value));
    }
    buffer.append(Reading::new(at(12, 1), "Voltage", 4.0));

    let readings: Vec<Reading> = buffer.query("Voltage", TimeWindow::all()).collect();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].value, 3.0);
}

#[test]
fn pruning_follows_latest_append() {
    let mut buffer = HistoryBuffer::default();
    buffer.append(Reading::new(at(10, 0), "Humidity", 40.0));
    buffer.append(Reading::new(at(10, 10), "Temperature", 22.0));
    buffer.append(Reading::new(at(10, 45), "Humidity", 41.0));

    // 10:00 and 10:10 are more than 30 minutes before 10:45
    assert_eq!(buffer.len(), 1);
    assert!(buffer.latest("Temperature").is_none());

    let cutoff = at(10, 45) - buffer.window();
    assert!(buffer
        .parameters()
        .flat_map(|p| buffer.query(p, TimeWindow::all()))
        .all(|r| r.timestamp >= cutoff));
}

#[test]
fn upload_older_than_simulation_keeps_one_window() {
    let mut session = seeded_session();
    session.tick(at(12, 0));
    session
        .upload_text("Timestamp,Parameter,Value\n2024-01-01T00:00:00,Temperature,25\n")
        .unwrap();
    session.tick(at(12, 0) + TimeDelta::seconds(5));

    for spec in session.table().iter() {
        let points = session.series(&spec.name);
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            assert!(last.timestamp - first.timestamp <= session.history().window());
        }
    }
    assert_eq!(session.history().len(), 1);
}

#[test]
fn query_is_restartable() {
    let mut buffer = HistoryBuffer::new(TimeDelta::minutes(30));
    for minute in 0..10 {
        buffer.append(Reading::new(at(9, minute), "Resistance", 100.0 + minute as f64));
    }

    let query = buffer.query("Resistance", TimeWindow::between(at(9, 2), at(9, 5)));
    let first: Vec<f64> = query.clone().map(|r| r.value).collect();
    let second: Vec<f64> = query.map(|r| r.value).collect();
    assert_eq!(first, vec![102.0, 103.0, 104.0, 105.0]);
    assert_eq!(first, second);
}

#[test]
fn simulation_resumes_after_upload() {
    let mut session = seeded_session();
    session.upload_text(SAMPLE).unwrap();
    session.use_simulation().unwrap();

    // The uploaded readings are dropped and the simulator backfills
    let now = at(12, 0);
    let backfill = Settings::default().backfill_points as usize;
    assert_eq!(session.tick(now), (backfill + 1) * session.table().len());
    assert_eq!(session.source().provenance(), Provenance::Simulated);
    assert!(session
        .series("Temperature")
        .iter()
        .all(|p| p.timestamp <= now && p.timestamp >= now - session.history().window()));

    let report = session.report(now);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["provenance"], "Simulated");
    assert_eq!(json["last_upload"]["accepted"], 82);
}
