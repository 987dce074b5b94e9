//! Readings and their classified, display-ready form.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::parameter::ParameterSpec;
use super::status::StatusLevel;

/// A single measurement of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    /// Canonical parameter name from the parameter table.
    pub parameter: String,
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, parameter: &str, value: f64) -> Self {
        Self {
            timestamp,
            parameter: parameter.to_string(),
            value,
        }
    }
}

/// A reading annotated with its status band, ready for charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifiedPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub status: StatusLevel,
    pub near_limit: bool,
}

impl ClassifiedPoint {
    pub fn from_reading(reading: &Reading, spec: &ParameterSpec) -> Self {
        Self {
            timestamp: reading.timestamp,
            value: reading.value,
            status: spec.classify(reading.value),
            near_limit: spec.near_limit(reading.value),
        }
    }
}

/// Summary statistics over a classified series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub count: usize,
    pub latest: ClassifiedPoint,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Worst status seen anywhere in the series.
    pub worst: StatusLevel,
}

impl SeriesStats {
    /// Compute statistics; `None` for an empty series.
    pub fn from_points(points: &[ClassifiedPoint]) -> Option<Self> {
        let latest = *points.last()?;

        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut worst = StatusLevel::Normal;
        for p in points {
            sum += p.value;
            min = min.min(p.value);
            max = max.max(p.value);
            worst = worst.max(p.status);
        }

        Some(Self {
            count: points.len(),
            latest,
            average: sum / points.len() as f64,
            min,
            max,
            worst,
        })
    }
}

/// Classify every reading in order.
pub fn classify_series<I>(readings: I, spec: &ParameterSpec) -> Vec<ClassifiedPoint>
where
    I: IntoIterator<Item = Reading>,
{
    readings
        .into_iter()
        .map(|r| ClassifiedPoint::from_reading(&r, spec))
        .collect()
}

/// Normalize values to 0-7 for an 8-level sparkline.
///
/// Unlike counter sparklines this works on absolute values, so a flat series
/// renders at the lowest level.
pub fn sparkline_levels(values: &[f64]) -> Vec<u8> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if range <= f64::EPSILON {
                0
            } else {
                (((v - min) / range) * 7.0).round().clamp(0.0, 7.0) as u8
            }
        })
        .collect()
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

    fn temperature() -> ParameterSpec {
        ParameterSpec::new("Temperature", "°C", 15.0, 35.0, 2.0, 5.0)
    }

    #[test]
    fn classify_series_preserves_order_and_status() {
        let readings = vec![
            Reading::new(at(0), "Temperature", 25.0),
            Reading::new(at(1), "Temperature", 38.0),
            Reading::new(at(2), "Temperature", 45.0),
        ];
        let points = classify_series(readings, &temperature());
        let statuses: Vec<_> = points.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![StatusLevel::Normal, StatusLevel::Warning, StatusLevel::Critical]
        );
        assert_eq!(points[2].timestamp, at(2));
    }

    #[test]
    fn stats_cover_the_whole_series() {
        let points = classify_series(
            vec![
                Reading::new(at(0), "Temperature", 20.0),
                Reading::new(at(1), "Temperature", 38.0),
                Reading::new(at(2), "Temperature", 30.0),
            ],
            &temperature(),
        );
        let stats = SeriesStats::from_points(&points).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 38.0);
        assert!((stats.average - 29.333).abs() < 0.01);
        assert_eq!(stats.latest.value, 30.0);
        assert_eq!(stats.latest.status, StatusLevel::Normal);
        assert_eq!(stats.worst, StatusLevel::Warning);
    }

    #[test]
    fn stats_empty_series() {
        assert!(SeriesStats::from_points(&[]).is_none());
    }

    #[test]
    fn sparkline_spans_full_range() {
        let levels = sparkline_levels(&[1.0, 2.0, 3.0]);
        assert_eq!(levels.first(), Some(&0));
        assert_eq!(levels.last(), Some(&7));
    }

    #[test]
    fn sparkline_flat_series() {
        assert_eq!(sparkline_levels(&[5.0, 5.0]), vec![0, 0]);
        assert!(sparkline_levels(&[]).is_empty());
    }
}
