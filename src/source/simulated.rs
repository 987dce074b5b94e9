//! Simulated telemetry and link generators.

use chrono::{NaiveDateTime, TimeDelta};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use super::SourceError;
use crate::data::{LinkSample, LinkThresholds, ParameterTable, Reading};

/// Mean simulated link rate, in Mbit/s.
const LINK_RATE_MEAN: f64 = 8.5;
const LINK_RATE_STD_DEV: f64 = 0.6;
/// Messages exchanged per simulated link tick.
const MESSAGES_PER_TICK: u64 = 1000;
const LINK_ERRORS_MEAN: f64 = 25.0;
const LINK_ERRORS_STD_DEV: f64 = 8.0;

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn normal(parameter: &str, mean: f64, std_dev: f64) -> Result<Normal<f64>, SourceError> {
    Normal::new(mean, std_dev).map_err(|e| SourceError::Distribution {
        parameter: parameter.to_string(),
        message: e.to_string(),
    })
}

/// Generates one normally distributed reading per parameter each tick.
///
/// Parameters without a simulation profile are never generated.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: StdRng,
    generators: Vec<(String, Normal<f64>)>,
    interval: TimeDelta,
    last_emitted: Option<NaiveDateTime>,
    description: String,
}

impl SimulatedSource {
    /// Build generators for every profiled parameter in `table`.
    ///
    /// A fixed `seed` makes the sequence of readings reproducible.
    pub fn new(
        table: &ParameterTable,
        interval: TimeDelta,
        seed: Option<u64>,
    ) -> Result<Self, SourceError> {
        let generators = table
            .iter()
            .filter_map(|spec| spec.simulation.map(|p| (spec.name.as_str(), p)))
            .map(|(name, p)| Ok((name.to_string(), normal(name, p.mean, p.std_dev)?)))
            .collect::<Result<Vec<_>, SourceError>>()?;

        let description = match seed {
            Some(seed) => format!("simulated: {} parameters (seed {})", generators.len(), seed),
            None => format!("simulated: {} parameters", generators.len()),
        };

        Ok(Self {
            rng: rng_from(seed),
            generators,
            interval,
            last_emitted: None,
            description,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Draw one reading per parameter at `timestamp`.
    pub fn sample(&mut self, timestamp: NaiveDateTime) -> Vec<Reading> {
        self.generators
            .iter()
            .map(|(name, dist)| Reading::new(timestamp, name, dist.sample(&mut self.rng)))
            .collect()
    }

    /// Produce `points` samples spaced `spacing` apart, ending one spacing
    /// before `now`.
    ///
    /// Used to fill the chart when a session starts.
    pub fn backfill(
        &mut self,
        now: NaiveDateTime,
        points: u32,
        spacing: TimeDelta,
    ) -> Vec<Reading> {
        let mut readings = Vec::new();
        for step in (1..=points).rev() {
            let Some(timestamp) = i32::try_from(step)
                .ok()
                .and_then(|step| spacing.checked_mul(step))
                .and_then(|offset| now.checked_sub_signed(offset))
            else {
                continue;
            };
            readings.extend(self.sample(timestamp));
            self.last_emitted = Some(timestamp);
        }
        debug!(count = readings.len(), "Backfilled simulated readings");
        readings
    }

    /// Emit a sample if at least one interval has passed since the last one.
    pub fn poll(&mut self, now: NaiveDateTime) -> Option<Vec<Reading>> {
        let due = self
            .last_emitted
            .is_none_or(|last| now.signed_duration_since(last) >= self.interval);
        if !due {
            return None;
        }
        self.last_emitted = Some(now);
        Some(self.sample(now))
    }
}

/// Generates RS422 link samples.
#[derive(Debug)]
pub struct LinkSimulator {
    rng: StdRng,
    rate: Normal<f64>,
    errors: Normal<f64>,
    max_rate_mbps: f64,
}

impl LinkSimulator {
    pub fn new(thresholds: &LinkThresholds, seed: Option<u64>) -> Result<Self, SourceError> {
        Ok(Self {
            // Offset so the link stream differs from the parameter stream
            rng: rng_from(seed.map(|s| s.wrapping_add(1))),
            rate: normal("RS422 rate", LINK_RATE_MEAN, LINK_RATE_STD_DEV)?,
            errors: normal("RS422 errors", LINK_ERRORS_MEAN, LINK_ERRORS_STD_DEV)?,
            max_rate_mbps: thresholds.max_rate_mbps,
        })
    }

    pub fn sample(&mut self, timestamp: NaiveDateTime) -> LinkSample {
        let rate_mbps = self.rate.sample(&mut self.rng).clamp(0.0, self.max_rate_mbps.max(0.0));
        let errors = self
            .errors
            .sample(&mut self.rng)
            .round()
            .clamp(0.0, MESSAGES_PER_TICK as f64) as u64;

        LinkSample {
            timestamp,
            rate_mbps,
            valid_messages: MESSAGES_PER_TICK - errors,
            total_messages: MESSAGES_PER_TICK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ParameterSpec;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn source(seed: u64) -> SimulatedSource {
        SimulatedSource::new(&ParameterTable::default(), TimeDelta::seconds(1), Some(seed)).unwrap()
    }

    #[test]
    fn sample_covers_every_profiled_parameter() {
        let mut sim = source(7);
        let readings = sim.sample(now());
        let names: Vec<_> = readings.iter().map(|r| r.parameter.as_str()).collect();
        assert_eq!(names, vec!["Temperature", "Voltage", "Humidity", "Resistance"]);
        assert!(readings.iter().all(|r| r.timestamp == now() && r.value.is_finite()));
    }

    #[test]
    fn parameters_without_profile_are_skipped() {
        let table = ParameterTable::new(vec![
            ParameterSpec::new("Temperature", "°C", 15.0, 35.0, 2.0, 5.0).with_simulation(25.0, 5.0),
            ParameterSpec::new("Pressure", "kPa", 90.0, 110.0, 0.0, 5.0),
        ])
        .unwrap();
        let mut sim = SimulatedSource::new(&table, TimeDelta::seconds(1), Some(1)).unwrap();
        assert_eq!(sim.sample(now()).len(), 1);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = source(42).sample(now());
        let b = source(42).sample(now());
        assert_eq!(a, b);
    }

    #[test]
    fn zero_spread_yields_the_mean() {
        let table = ParameterTable::new(vec![
            ParameterSpec::new("Voltage", "V", 4.8, 5.2, 0.0, 0.3).with_simulation(5.0, 0.0),
        ])
        .unwrap();
        let mut sim = SimulatedSource::new(&table, TimeDelta::seconds(1), Some(3)).unwrap();
        assert_eq!(sim.sample(now())[0].value, 5.0);
    }

    #[test]
    fn poll_respects_interval() {
        let mut sim = source(1);
        assert!(sim.poll(now()).is_some());
        assert!(sim.poll(now()).is_none());
        assert!(sim.poll(now() + TimeDelta::milliseconds(500)).is_none());
        assert!(sim.poll(now() + TimeDelta::seconds(1)).is_some());
    }

    #[test]
    fn backfill_spaces_points_before_now() {
        let mut sim = source(1);
        let readings = sim.backfill(now(), 30, TimeDelta::minutes(1));
        assert_eq!(readings.len(), 30 * 4);
        assert_eq!(readings.first().unwrap().timestamp, now() - TimeDelta::minutes(30));
        assert_eq!(readings.last().unwrap().timestamp, now() - TimeDelta::minutes(1));

        // The next poll at `now` is due because a full interval has passed
        assert!(sim.poll(now()).is_some());
    }

    #[test]
    fn backfill_skips_offsets_that_overflow() {
        let mut sim = source(1);
        let readings = sim.backfill(now(), 3, TimeDelta::MAX);
        assert!(readings.is_empty());
        assert!(sim.poll(now()).is_some());
    }

    #[test]
    fn link_samples_stay_in_bounds() {
        let thresholds = LinkThresholds::default();
        let mut link = LinkSimulator::new(&thresholds, Some(9)).unwrap();
        for i in 0..200 {
            let s = link.sample(now() + TimeDelta::seconds(i));
            assert!((0.0..=thresholds.max_rate_mbps).contains(&s.rate_mbps));
            assert!(s.valid_messages <= s.total_messages);
            assert_eq!(s.total_messages, MESSAGES_PER_TICK);
        }
    }
}
