//! Per-session dashboard state.
//!
//! A [`Session`] owns everything one viewer sees: the parameter table, the
//! rolling history, the link monitor, the switch positions and the active
//! reading source. Nothing here is global, so two sessions never share data.

use std::path::Path;

use anyhow::Result;
use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::data::series::sparkline_levels;
use crate::data::{
    classify_series, ClassifiedPoint, CommState, ControlSwitches, HistoryBuffer, ImportReport,
    IngestError, Led, LinkMonitor, LinkQuality, ParameterSpec, ParameterTable, Reading,
    RejectKind, SeriesStats, StatusLevel, Switch, TimeWindow,
};
use crate::source::{
    Batch, CsvSource, LinkSimulator, Provenance, ReadingSource, SimulatedSource,
};

/// Spacing of the points generated when simulation starts.
const BACKFILL_SPACING_MINUTES: i64 = 1;

/// What an accepted upload contributed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub source: String,
    pub accepted: usize,
    pub rejected: usize,
    pub malformed: usize,
    pub unknown_parameter: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

impl UploadSummary {
    fn from_report(source: &str, report: &ImportReport) -> Self {
        Self {
            source: source.to_string(),
            accepted: report.accepted.len(),
            rejected: report.rejected,
            malformed: report.count(RejectKind::MalformedRow),
            unknown_parameter: report.count(RejectKind::UnknownParameter),
            first: report.accepted.iter().map(|r| r.timestamp).min(),
            last: report.accepted.iter().map(|r| r.timestamp).max(),
        }
    }

    /// One-line message for the status bar.
    pub fn message(&self) -> String {
        if self.rejected == 0 {
            format!("Imported {} readings from {}", self.accepted, self.source)
        } else {
            format!(
                "Imported {} readings from {} ({} rows skipped: {} malformed, {} unknown parameter)",
                self.accepted, self.source, self.rejected, self.malformed, self.unknown_parameter
            )
        }
    }
}

/// Per-parameter entry of a [`SessionReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ParameterReport {
    pub name: String,
    pub unit: String,
    pub normal_range: String,
    pub status: Option<StatusLevel>,
    pub stats: Option<SeriesStats>,
}

/// Link entry of a [`SessionReport`].
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub comm_state: CommState,
    pub comm_status: StatusLevel,
    pub quality: Option<LinkQuality>,
    pub rate_mbps: Option<f64>,
    pub utilization: Option<f64>,
    pub success_rate: Option<f64>,
    pub success_status: Option<StatusLevel>,
    pub valid_messages: u64,
    pub total_messages: u64,
}

/// Serializable snapshot of a session, used for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub generated_at: NaiveDateTime,
    pub provenance: Provenance,
    pub source: String,
    pub window_minutes: i64,
    pub readings: usize,
    pub parameters: Vec<ParameterReport>,
    pub link: LinkReport,
    pub controls: ControlSwitches,
    pub leds: Vec<Led>,
    pub last_upload: Option<UploadSummary>,
}

/// State for one dashboard viewer.
#[derive(Debug)]
pub struct Session {
    table: ParameterTable,
    history: HistoryBuffer,
    link: LinkMonitor,
    controls: ControlSwitches,
    source: ReadingSource,
    link_sim: LinkSimulator,
    tick_interval: TimeDelta,
    seed: Option<u64>,
    backfill_points: u32,
    pending_backfill: bool,
    last_upload: Option<UploadSummary>,
    last_tick: Option<NaiveDateTime>,
}

impl Session {
    /// Build a session that starts on simulated data.
    pub fn new(settings: &Settings) -> Result<Self> {
        let table = settings.table()?;
        let window = settings.window_delta()?;
        let tick_interval = TimeDelta::from_std(settings.refresh_interval()?)?;
        let simulated = SimulatedSource::new(&table, tick_interval, settings.seed)?;
        let link_sim = LinkSimulator::new(&settings.link, settings.seed)?;
        // Older backfill points would be pruned on arrival
        let window_points = u32::try_from(window.num_minutes() / BACKFILL_SPACING_MINUTES)
            .unwrap_or(u32::MAX);
        let backfill_points = settings.backfill_points.min(window_points);

        info!(
            parameters = table.len(),
            window_minutes = window.num_minutes(),
            "Session started"
        );

        Ok(Self {
            table,
            history: HistoryBuffer::new(window),
            link: LinkMonitor::new(settings.link, window),
            controls: ControlSwitches::default(),
            source: ReadingSource::Simulated(simulated),
            link_sim,
            tick_interval,
            seed: settings.seed,
            backfill_points,
            pending_backfill: backfill_points > 0,
            last_upload: None,
            last_tick: None,
        })
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn link(&self) -> &LinkMonitor {
        &self.link
    }

    pub fn controls(&self) -> &ControlSwitches {
        &self.controls
    }

    pub fn source(&self) -> &ReadingSource {
        &self.source
    }

    pub fn last_upload(&self) -> Option<&UploadSummary> {
        self.last_upload.as_ref()
    }

    pub fn last_tick(&self) -> Option<NaiveDateTime> {
        self.last_tick
    }

    /// Advance the session to `now`.
    ///
    /// Polls the active source, appends whatever it produced and records a
    /// link sample. With main power off the simulators are paused; an
    /// uploaded file is still re-read when it changes. Returns the number of
    /// readings appended.
    pub fn tick(&mut self, now: NaiveDateTime) -> usize {
        self.last_tick = Some(now);
        let powered = self.controls.power;
        let mut appended = 0;

        if powered && self.pending_backfill {
            if let ReadingSource::Simulated(sim) = &mut self.source {
                let spacing = TimeDelta::minutes(BACKFILL_SPACING_MINUTES);
                let readings = sim.backfill(now, self.backfill_points, spacing);
                appended += self.append_all(readings);
            }
            self.pending_backfill = false;
        }

        let paused = !powered && self.source.provenance() == Provenance::Simulated;
        if !paused {
            if let Some(batch) = self.source.poll(now, &self.table) {
                appended += self.apply_batch(batch);
            }
        }

        if self.controls.comm_state() == CommState::Active {
            self.link.record(self.link_sim.sample(now));
        }

        if appended > 0 {
            debug!(appended, total = self.history.len(), "Tick");
        }
        appended
    }

    fn apply_batch(&mut self, batch: Batch) -> usize {
        match batch {
            Batch::Simulated(readings) => self.append_all(readings),
            // A re-read file replaces everything the previous read added
            Batch::Uploaded(report) => match report.into_result() {
                Ok(report) => {
                    let summary = UploadSummary::from_report(self.source.description(), &report);
                    info!(accepted = summary.accepted, rejected = summary.rejected, "Re-ingested upload");
                    self.last_upload = Some(summary);
                    self.replace_history(report.accepted)
                }
                Err(e) => {
                    warn!(error = %e, "Changed upload has no usable rows");
                    0
                }
            },
        }
    }

    fn replace_history(&mut self, readings: Vec<Reading>) -> usize {
        self.history.clear();
        self.append_all(readings)
    }

    fn append_all(&mut self, mut readings: Vec<Reading>) -> usize {
        // Stable sort keeps file order among equal timestamps, so the last
        // duplicate row wins.
        readings.sort_by_key(|r| r.timestamp);
        let count = readings.len();
        for reading in readings {
            self.history.append(reading);
        }
        count
    }

    /// Ingest CSV text and make it the active source.
    ///
    /// An accepted upload replaces the history; a refused one leaves the
    /// session untouched.
    pub fn upload_text(&mut self, text: &str) -> Result<UploadSummary, IngestError> {
        self.install_upload(CsvSource::inline(text, "upload"))
    }

    /// Ingest a CSV file and make it the active source.
    ///
    /// Later changes to the file are picked up by [`Session::tick`].
    pub fn upload_file(&mut self, path: &Path) -> Result<UploadSummary, IngestError> {
        self.install_upload(CsvSource::file(path))
    }

    fn install_upload(&mut self, mut source: CsvSource) -> Result<UploadSummary, IngestError> {
        let Some(report) = source.poll(&self.table) else {
            let message = source.error().unwrap_or("nothing to read").to_string();
            warn!(source = source.description(), %message, "Upload failed");
            return Err(IngestError::Read(message));
        };

        let report = match report.into_result() {
            Ok(report) => report,
            Err(e) => {
                warn!(source = source.description(), error = %e, "Upload rejected");
                return Err(e);
            }
        };

        let summary = UploadSummary::from_report(source.description(), &report);
        self.replace_history(report.accepted);
        info!(
            source = source.description(),
            accepted = summary.accepted,
            rejected = summary.rejected,
            "Upload accepted"
        );

        self.source = ReadingSource::Uploaded(source);
        self.last_upload = Some(summary.clone());
        Ok(summary)
    }

    /// Switch back to simulated readings, starting a fresh history.
    pub fn use_simulation(&mut self) -> Result<()> {
        if self.source.provenance() == Provenance::Simulated {
            return Ok(());
        }
        let simulated = SimulatedSource::new(&self.table, self.tick_interval, self.seed)?;
        self.source = ReadingSource::Simulated(simulated);
        self.history.clear();
        self.pending_backfill = self.backfill_points > 0;
        info!("Switched to simulated readings");
        Ok(())
    }

    /// Classified readings for one parameter across the whole window.
    pub fn series(&self, parameter: &str) -> Vec<ClassifiedPoint> {
        let Some(spec) = self.table.get(parameter) else {
            return Vec::new();
        };
        classify_series(self.history.query(&spec.name, TimeWindow::all()), spec)
    }

    pub fn stats(&self, parameter: &str) -> Option<SeriesStats> {
        SeriesStats::from_points(&self.series(parameter))
    }

    /// Status of the newest reading for a parameter.
    pub fn latest_status(&self, spec: &ParameterSpec) -> Option<StatusLevel> {
        self.history
            .latest(&spec.name)
            .map(|r| spec.classify(r.value))
    }

    /// Sparkline levels (0..=7) for a parameter's values.
    pub fn sparkline(&self, parameter: &str) -> Vec<u8> {
        let values: Vec<f64> = self.series(parameter).iter().map(|p| p.value).collect();
        sparkline_levels(&values)
    }

    /// Worst status across every parameter's latest reading.
    pub fn overall_status(&self) -> Option<StatusLevel> {
        self.table.iter().filter_map(|s| self.latest_status(s)).max()
    }

    /// Flip a control switch and return its new position.
    pub fn toggle(&mut self, switch: Switch) -> bool {
        let on = self.controls.toggle(switch);
        info!(switch = switch.label(), on, comm = self.controls.comm_state().label(), "Switch toggled");
        on
    }

    /// The LED panel: power, one per parameter, link quality, message validation.
    pub fn leds(&self) -> Vec<Led> {
        let mut leds = Vec::with_capacity(self.table.len() + 3);

        leds.push(Led::new(
            "PWR",
            self.controls.power.then_some(StatusLevel::Normal),
            "Main power".to_string(),
        ));

        for spec in self.table.iter() {
            leds.push(Led::new(
                &spec.label,
                self.latest_status(spec),
                format!("{} ({})", spec.name, spec.normal_range_label()),
            ));
        }

        let link_active = self.controls.comm_state() == CommState::Active;
        leds.push(Led::new(
            "RS422",
            self.link
                .quality()
                .filter(|_| link_active)
                .map(|q| q.status()),
            "Serial link quality".to_string(),
        ));
        leds.push(Led::new(
            "MSG",
            self.link.success_status().filter(|_| link_active),
            "Message validation".to_string(),
        ));

        leds
    }

    /// Drop all readings and link samples. The active source is kept.
    pub fn clear(&mut self) {
        self.history.clear();
        self.link.clear();
        info!("Session history cleared");
    }

    /// Snapshot the session for export.
    pub fn report(&self, now: NaiveDateTime) -> SessionReport {
        let parameters = self
            .table
            .iter()
            .map(|spec| ParameterReport {
                name: spec.name.clone(),
                unit: spec.unit.clone(),
                normal_range: spec.normal_range_label(),
                status: self.latest_status(spec),
                stats: self.stats(&spec.name),
            })
            .collect();

        let (valid_messages, total_messages) = self.link.message_totals();
        let link = LinkReport {
            comm_state: self.controls.comm_state(),
            comm_status: self.controls.comm_status(),
            quality: self.link.quality(),
            rate_mbps: self.link.latest().map(|s| s.rate_mbps),
            utilization: self.link.utilization(),
            success_rate: self.link.success_rate(),
            success_status: self.link.success_status(),
            valid_messages,
            total_messages,
        };

        SessionReport {
            generated_at: now,
            provenance: self.source.provenance(),
            source: self.source.description().to_string(),
            window_minutes: self.history.window().num_minutes(),
            readings: self.history.len(),
            parameters,
            link,
            controls: self.controls,
            leds: self.leds(),
            last_upload: self.last_upload.clone(),
        }
    }
}
