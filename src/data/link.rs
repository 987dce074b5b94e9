//! RS422 link throughput and message-validation tracking.

use std::collections::VecDeque;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::status::StatusLevel;

/// Rate and success-rate bands for the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkThresholds {
    /// Minimum rate for Excellent, in Mbit/s.
    pub excellent_mbps: f64,
    /// Minimum rate for Good, in Mbit/s.
    pub good_mbps: f64,
    /// Minimum rate for Fair, in Mbit/s.
    pub fair_mbps: f64,
    /// Maximum theoretical rate, in Mbit/s.
    pub max_rate_mbps: f64,
    /// Success percentage at or above which validation is Normal.
    pub success_normal_pct: f64,
    /// Success percentage at or above which validation is Warning.
    pub success_warning_pct: f64,
}

impl Default for LinkThresholds {
    fn default() -> Self {
        Self {
            excellent_mbps: 8.0,
            good_mbps: 5.0,
            fair_mbps: 3.0,
            max_rate_mbps: 10.0,
            success_normal_pct: 95.0,
            success_warning_pct: 80.0,
        }
    }
}

/// Link quality category based on data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LinkQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl LinkQuality {
    pub fn from_rate(rate_mbps: f64, thresholds: &LinkThresholds) -> Self {
        if rate_mbps >= thresholds.excellent_mbps {
            LinkQuality::Excellent
        } else if rate_mbps >= thresholds.good_mbps {
            LinkQuality::Good
        } else if rate_mbps >= thresholds.fair_mbps {
            LinkQuality::Fair
        } else {
            LinkQuality::Poor
        }
    }

    /// Status band used for colouring the rate display and the RS422 LED.
    pub fn status(&self) -> StatusLevel {
        match self {
            LinkQuality::Excellent => StatusLevel::Normal,
            LinkQuality::Good => StatusLevel::Warning,
            LinkQuality::Fair | LinkQuality::Poor => StatusLevel::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LinkQuality::Excellent => "EXCELLENT",
            LinkQuality::Good => "GOOD",
            LinkQuality::Fair => "FAIR",
            LinkQuality::Poor => "POOR",
        }
    }
}

/// One simulated link measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkSample {
    pub timestamp: NaiveDateTime,
    pub rate_mbps: f64,
    pub valid_messages: u64,
    pub total_messages: u64,
}

/// Map a success percentage onto a status band.
pub fn success_status(success_pct: f64, thresholds: &LinkThresholds) -> StatusLevel {
    if success_pct >= thresholds.success_normal_pct {
        StatusLevel::Normal
    } else if success_pct >= thresholds.success_warning_pct {
        StatusLevel::Warning
    } else {
        StatusLevel::Critical
    }
}

/// Rolling link history, bounded by the same window as parameter history.
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    thresholds: LinkThresholds,
    window: TimeDelta,
    samples: VecDeque<LinkSample>,
}

impl LinkMonitor {
    pub fn new(thresholds: LinkThresholds, window: TimeDelta) -> Self {
        Self {
            thresholds,
            window,
            samples: VecDeque::new(),
        }
    }

    pub fn thresholds(&self) -> &LinkThresholds {
        &self.thresholds
    }

    /// Record a sample and drop samples that fell out of the window.
    ///
    /// Samples are expected in time order; a sample older than the newest one
    /// is still kept but ordering is restored by insertion position.
    pub fn record(&mut self, sample: LinkSample) {
        let pos = self
            .samples
            .iter()
            .rposition(|s| s.timestamp <= sample.timestamp)
            .map_or(0, |i| i + 1);
        self.samples.insert(pos, sample);

        if let Some(newest) = self.samples.back().map(|s| s.timestamp) {
            if let Some(cutoff) = newest.checked_sub_signed(self.window) {
                while self.samples.front().is_some_and(|s| s.timestamp < cutoff) {
                    self.samples.pop_front();
                }
            }
        }
    }

    pub fn latest(&self) -> Option<&LinkSample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &LinkSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Quality of the most recent sample.
    pub fn quality(&self) -> Option<LinkQuality> {
        self.latest()
            .map(|s| LinkQuality::from_rate(s.rate_mbps, &self.thresholds))
    }

    /// Latest rate as a fraction of the maximum rate, clamped to 0..=1.
    pub fn utilization(&self) -> Option<f64> {
        let sample = self.latest()?;
        if self.thresholds.max_rate_mbps <= 0.0 {
            return None;
        }
        Some((sample.rate_mbps / self.thresholds.max_rate_mbps).clamp(0.0, 1.0))
    }

    /// Valid and total message counts summed over the window.
    pub fn message_totals(&self) -> (u64, u64) {
        self.samples.iter().fold((0, 0), |(valid, total), s| {
            (valid + s.valid_messages, total + s.total_messages)
        })
    }

    /// Percentage of valid messages over the window.
    pub fn success_rate(&self) -> Option<f64> {
        let (valid, total) = self.message_totals();
        if total == 0 {
            None
        } else {
            Some(valid as f64 * 100.0 / total as f64)
        }
    }

    pub fn success_status(&self) -> Option<StatusLevel> {
        self.success_rate().map(|pct| success_status(pct, &self.thresholds))
    }

    /// Rate history normalized against the maximum rate (0-7).
    pub fn rate_sparkline(&self) -> Vec<u8> {
        let max = self.thresholds.max_rate_mbps.max(f64::EPSILON);
        self.samples
            .iter()
            .map(|s| ((s.rate_mbps / max).clamp(0.0, 1.0) * 7.0).round() as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn sample(minute: u32, rate: f64, valid: u64) -> LinkSample {
        LinkSample {
            timestamp: at(minute),
            rate_mbps: rate,
            valid_messages: valid,
            total_messages: 1000,
        }
    }

    fn monitor() -> LinkMonitor {
        LinkMonitor::new(LinkThresholds::default(), TimeDelta::minutes(30))
    }

    #[test]
    fn quality_bands() {
        let t = LinkThresholds::default();
        assert_eq!(LinkQuality::from_rate(9.2, &t), LinkQuality::Excellent);
        assert_eq!(LinkQuality::from_rate(8.0, &t), LinkQuality::Excellent);
        assert_eq!(LinkQuality::from_rate(6.0, &t), LinkQuality::Good);
        assert_eq!(LinkQuality::from_rate(3.0, &t), LinkQuality::Fair);
        assert_eq!(LinkQuality::from_rate(0.5, &t), LinkQuality::Poor);
    }

    #[test]
    fn quality_status_mapping() {
        assert_eq!(LinkQuality::Excellent.status(), StatusLevel::Normal);
        assert_eq!(LinkQuality::Good.status(), StatusLevel::Warning);
        assert_eq!(LinkQuality::Fair.status(), StatusLevel::Critical);
        assert_eq!(LinkQuality::Poor.status(), StatusLevel::Critical);
    }

    #[test]
    fn success_bands() {
        let t = LinkThresholds::default();
        assert_eq!(success_status(97.5, &t), StatusLevel::Normal);
        assert_eq!(success_status(95.0, &t), StatusLevel::Normal);
        assert_eq!(success_status(85.0, &t), StatusLevel::Warning);
        assert_eq!(success_status(50.0, &t), StatusLevel::Critical);
    }

    #[test]
    fn empty_monitor_has_no_summary() {
        let m = monitor();
        assert!(m.quality().is_none());
        assert!(m.success_rate().is_none());
        assert!(m.utilization().is_none());
        assert!(m.rate_sparkline().is_empty());
    }

    #[test]
    fn success_rate_accumulates_over_window() {
        let mut m = monitor();
        m.record(sample(0, 8.5, 975));
        m.record(sample(1, 8.5, 925));
        assert_eq!(m.message_totals(), (1900, 2000));
        assert_eq!(m.success_rate(), Some(95.0));
        assert_eq!(m.success_status(), Some(StatusLevel::Normal));
    }

    #[test]
    fn old_samples_leave_the_window() {
        let mut m = monitor();
        m.record(sample(0, 8.5, 1000));
        m.record(sample(10, 8.5, 1000));
        m.record(sample(35, 4.0, 1000));
        assert_eq!(m.len(), 2);
        assert_eq!(m.quality(), Some(LinkQuality::Fair));
    }

    #[test]
    fn late_sample_keeps_time_order() {
        let mut m = monitor();
        m.record(sample(5, 8.0, 1000));
        m.record(sample(1, 6.0, 1000));
        let times: Vec<_> = m.samples().map(|s| s.timestamp).collect();
        assert_eq!(times, vec![at(1), at(5)]);
        assert_eq!(m.latest().unwrap().rate_mbps, 8.0);
    }

    #[test]
    fn utilization_is_clamped() {
        let mut m = monitor();
        m.record(sample(0, 12.0, 1000));
        assert_eq!(m.utilization(), Some(1.0));
        m.record(sample(1, 8.5, 1000));
        assert!((m.utilization().unwrap() - 0.85).abs() < 1e-9);
    }

    #[test]
    fn sparkline_uses_max_rate_scale() {
        let mut m = monitor();
        m.record(sample(0, 0.0, 1000));
        m.record(sample(1, 10.0, 1000));
        assert_eq!(m.rate_sparkline(), vec![0, 7]);
    }
}
