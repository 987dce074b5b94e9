//! Rolling per-parameter history for live charts.
//!
//! Every parameter owns a time-ordered series keyed by timestamp, so a second
//! reading at the same instant replaces the first. Appends prune all series to
//! the trailing window measured from the newest reading held, so the buffer
//! never spans more than one window.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;

use chrono::{NaiveDateTime, TimeDelta};

use super::series::Reading;

/// Default length of the rolling window.
pub const DEFAULT_WINDOW_MINUTES: i64 = 30;

/// Time range for [`HistoryBuffer::query`]. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeWindow {
    /// Everything currently held.
    pub fn all() -> Self {
        Self::default()
    }

    /// `span` of history ending at `end`.
    pub fn trailing(end: NaiveDateTime, span: TimeDelta) -> Self {
        Self {
            start: end.checked_sub_signed(span),
            end: Some(end),
        }
    }

    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    fn bounds(&self) -> (Bound<NaiveDateTime>, Bound<NaiveDateTime>) {
        (
            self.start.map_or(Bound::Unbounded, Bound::Included),
            self.end.map_or(Bound::Unbounded, Bound::Included),
        )
    }
}

/// Time-ordered values for a single parameter.
#[derive(Debug, Clone, Default)]
pub struct HistorySeries {
    points: BTreeMap<NaiveDateTime, f64>,
}

impl HistorySeries {
    /// Insert a value, returning the one it replaced at the same timestamp.
    pub fn insert(&mut self, timestamp: NaiveDateTime, value: f64) -> Option<f64> {
        self.points.insert(timestamp, value)
    }

    /// Drop every point strictly older than `cutoff`. Returns how many went.
    pub fn prune_before(&mut self, cutoff: NaiveDateTime) -> usize {
        let before = self.points.len();
        self.points = self.points.split_off(&cutoff);
        before - self.points.len()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<(NaiveDateTime, f64)> {
        self.points.first_key_value().map(|(t, v)| (*t, *v))
    }

    pub fn last(&self) -> Option<(NaiveDateTime, f64)> {
        self.points.last_key_value().map(|(t, v)| (*t, *v))
    }
}

/// Lazy iterator over the readings of one parameter inside a window.
///
/// Cloning the iterator restarts it from the clone point without touching
/// the buffer.
#[derive(Debug, Clone)]
pub struct Query<'a> {
    parameter: &'a str,
    inner: Option<btree_map::Range<'a, NaiveDateTime, f64>>,
}

impl Iterator for Query<'_> {
    type Item = Reading;

    fn next(&mut self) -> Option<Reading> {
        let (timestamp, value) = self.inner.as_mut()?.next()?;
        Some(Reading::new(*timestamp, self.parameter, *value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.as_ref().map_or((0, Some(0)), |r| r.size_hint())
    }
}

impl DoubleEndedIterator for Query<'_> {
    fn next_back(&mut self) -> Option<Reading> {
        let (timestamp, value) = self.inner.as_mut()?.next_back()?;
        Some(Reading::new(*timestamp, self.parameter, *value))
    }
}

/// Per-session rolling history across all parameters.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    window: TimeDelta,
    series: BTreeMap<String, HistorySeries>,
    newest: Option<NaiveDateTime>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(TimeDelta::minutes(DEFAULT_WINDOW_MINUTES))
    }
}

impl HistoryBuffer {
    /// Create an empty buffer retaining `window` of history.
    pub fn new(window: TimeDelta) -> Self {
        Self {
            window,
            series: BTreeMap::new(),
            newest: None,
        }
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Insert a reading in timestamp order, then prune relative to the
    /// newest timestamp held.
    ///
    /// A reading for a (parameter, timestamp) pair already present replaces
    /// the earlier value, which is returned. A reading older than the window
    /// is dropped straight away.
    pub fn append(&mut self, reading: Reading) -> Option<f64> {
        let timestamp = reading.timestamp;
        let replaced = self
            .series
            .entry(reading.parameter)
            .or_default()
            .insert(timestamp, reading.value);
        let newest = self.newest.map_or(timestamp, |n| n.max(timestamp));
        self.newest = Some(newest);
        self.prune(newest);
        replaced
    }

    /// Newest timestamp appended since the buffer was created or cleared.
    pub fn newest(&self) -> Option<NaiveDateTime> {
        self.newest
    }

    /// Remove entries older than `now - window` from every series.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, now: NaiveDateTime) -> usize {
        let Some(cutoff) = now.checked_sub_signed(self.window) else {
            return 0;
        };

        let removed = self.series.values_mut().map(|s| s.prune_before(cutoff)).sum();
        self.series.retain(|_, s| !s.is_empty());
        removed
    }

    /// Readings for `parameter` inside `window`, oldest first.
    pub fn query<'a>(&'a self, parameter: &str, window: TimeWindow) -> Query<'a> {
        match self.series.get_key_value(parameter) {
            Some((name, series)) if !window.is_empty() => Query {
                parameter: name,
                inner: Some(series.points.range(window.bounds())),
            },
            _ => Query {
                parameter: "",
                inner: None,
            },
        }
    }

    /// Most recent reading for `parameter`.
    pub fn latest(&self, parameter: &str) -> Option<Reading> {
        let (name, series) = self.series.get_key_value(parameter)?;
        series.last().map(|(t, v)| Reading::new(t, name, v))
    }

    pub fn series(&self, parameter: &str) -> Option<&HistorySeries> {
        self.series.get(parameter)
    }

    /// Parameters with at least one reading, in name order.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Total number of readings held.
    pub fn len(&self) -> usize {
        self.series.values().map(HistorySeries::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn clear(&mut self) {
        self.series.clear();
        self.newest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn reading(hour: u32, minute: u32, value: f64) -> Reading {
        Reading::new(at(hour, minute), "Temperature", value)
    }

    #[test]
    fn new_buffer_is_empty() {
        let h = HistoryBuffer::default();
        assert!(h.is_empty());
        assert_eq!(h.len(), 0);
        assert_eq!(h.window(), TimeDelta::minutes(30));
    }

    #[test]
    fn out_of_order_appends_are_stored_in_time_order() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 10, 3.0));
        h.append(reading(12, 0, 1.0));
        h.append(reading(12, 5, 2.0));

        let values: Vec<f64> = h.query("Temperature", TimeWindow::all()).map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_timestamp_replaces_previous_value() {
        let mut h = HistoryBuffer::default();
        assert_eq!(h.append(reading(12, 0, 20.0)), None);
        assert_eq!(h.append(reading(12, 0, 22.0)), Some(20.0));

        let readings: Vec<Reading> = h.query("Temperature", TimeWindow::all()).collect();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value, 22.0);
    }

    #[test]
    fn same_timestamp_different_parameters_coexist() {
        let mut h = HistoryBuffer::default();
        h.append(Reading::new(at(12, 0), "Temperature", 20.0));
        h.append(Reading::new(at(12, 0), "Voltage", 5.0));
        assert_eq!(h.len(), 2);
        assert_eq!(h.parameters().collect::<Vec<_>>(), vec!["Temperature", "Voltage"]);
    }

    #[test]
    fn append_prunes_entries_older_than_window() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 0, 1.0));
        h.append(reading(12, 20, 2.0));
        h.append(Reading::new(at(12, 5), "Voltage", 5.0));

        // 12:40 - 30m = 12:10, so 12:00 and the 12:05 voltage reading go
        h.append(reading(12, 40, 3.0));

        let values: Vec<f64> = h.query("Temperature", TimeWindow::all()).map(|r| r.value).collect();
        assert_eq!(values, vec![2.0, 3.0]);
        assert!(h.series("Voltage").is_none());
    }

    #[test]
    fn entry_exactly_at_cutoff_is_kept() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 0, 1.0));
        h.append(reading(12, 30, 2.0));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn older_append_is_pruned_against_newest_entry() {
        let mut h = HistoryBuffer::default();
        h.append(reading(13, 0, 2.0));
        h.append(reading(12, 45, 1.5));
        h.append(reading(12, 0, 1.0));
        h.append(Reading::new(at(0, 0), "Voltage", 5.0));

        let values: Vec<f64> = h.query("Temperature", TimeWindow::all()).map(|r| r.value).collect();
        assert_eq!(values, vec![1.5, 2.0]);
        assert!(h.series("Voltage").is_none());
        assert_eq!(h.newest(), Some(at(13, 0)));
    }

    #[test]
    fn buffer_never_spans_more_than_the_window() {
        let mut h = HistoryBuffer::default();
        for (hour, minute) in [(12, 0), (9, 0), (12, 40), (11, 0), (12, 20), (12, 10)] {
            h.append(reading(hour, minute, 0.0));
        }

        let series = h.series("Temperature").unwrap();
        let (first, _) = series.first().unwrap();
        let (last, _) = series.last().unwrap();
        assert!(last - first <= h.window());
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn explicit_prune_uses_given_time() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 0, 1.0));
        h.append(reading(12, 10, 2.0));
        assert_eq!(h.prune(at(12, 35)), 1);
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn query_respects_window_bounds() {
        let mut h = HistoryBuffer::default();
        for m in 0..10 {
            h.append(reading(12, m, m as f64));
        }

        let values: Vec<f64> = h
            .query("Temperature", TimeWindow::between(at(12, 3), at(12, 5)))
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);

        let trailing: Vec<f64> = h
            .query("Temperature", TimeWindow::trailing(at(12, 9), TimeDelta::minutes(2)))
            .map(|r| r.value)
            .collect();
        assert_eq!(trailing, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn inverted_window_is_empty() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 0, 1.0));
        assert_eq!(
            h.query("Temperature", TimeWindow::between(at(12, 5), at(12, 1))).count(),
            0
        );
    }

    #[test]
    fn query_unknown_parameter_is_empty() {
        let h = HistoryBuffer::default();
        assert_eq!(h.query("Pressure", TimeWindow::all()).count(), 0);
    }

    #[test]
    fn query_is_restartable() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 0, 1.0));
        h.append(reading(12, 1, 2.0));

        let query = h.query("Temperature", TimeWindow::all());
        let first: Vec<Reading> = query.clone().collect();
        let second: Vec<Reading> = query.collect();
        assert_eq!(first, second);
        assert_eq!(first[0].parameter, "Temperature");
    }

    #[test]
    fn latest_returns_newest_reading() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 5, 2.0));
        h.append(reading(12, 1, 1.0));
        assert_eq!(h.latest("Temperature").unwrap().value, 2.0);
        assert!(h.latest("Voltage").is_none());
    }

    #[test]
    fn clear_empties_every_series() {
        let mut h = HistoryBuffer::default();
        h.append(reading(12, 0, 1.0));
        h.clear();
        assert!(h.is_empty());
        assert!(h.newest().is_none());

        // An older reading is welcome again once the buffer is empty
        h.append(reading(9, 0, 2.0));
        assert_eq!(h.len(), 1);
    }
}
