//! Runtime settings.
//!
//! Settings come from built-in defaults, an optional configuration file
//! (TOML, YAML or JSON, by extension) and `BENCHWATCH_*` environment
//! variables, in increasing order of precedence. Command-line flags are
//! applied on top by the binary.
//!
//! ```toml
//! window = "30m"
//! refresh = "1s"
//! seed = 7
//!
//! [link]
//! max_rate_mbps = 10.0
//!
//! [[parameters]]
//! name = "Temperature"
//! unit = "°C"
//! normal_low = 15.0
//! normal_high = 35.0
//! warning_margin = 2.0
//! critical_margin = 5.0
//! simulation = { mean = 25.0, std_dev = 5.0 }
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::duration::parse_duration;
use crate::data::{LinkThresholds, ParameterError, ParameterTable, DEFAULT_WINDOW_MINUTES};

const ENV_PREFIX: &str = "BENCHWATCH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// History window, e.g. "30m".
    pub window: String,
    /// Tick and redraw interval, e.g. "1s".
    pub refresh: String,
    /// Seed for the simulators. Unset means a fresh sequence each run.
    pub seed: Option<u64>,
    /// One-minute points generated when a simulated session starts.
    pub backfill_points: u32,
    pub link: LinkThresholds,
    /// Replaces the built-in parameter table when present.
    pub parameters: Option<Vec<crate::data::ParameterSpec>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: format!("{}m", DEFAULT_WINDOW_MINUTES),
            refresh: "1s".to_string(),
            seed: None,
            backfill_points: DEFAULT_WINDOW_MINUTES as u32,
            link: LinkThresholds::default(),
            parameters: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn window_delta(&self) -> Result<TimeDelta> {
        let window = parse_duration(&self.window)
            .with_context(|| format!("Invalid history window: {}", self.window))?;
        Ok(TimeDelta::from_std(window)?)
    }

    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_duration(&self.refresh)
            .with_context(|| format!("Invalid refresh interval: {}", self.refresh))
    }

    /// The configured parameter table, or the built-in one.
    pub fn table(&self) -> Result<ParameterTable, ParameterError> {
        match &self.parameters {
            Some(specs) => ParameterTable::new(specs.clone()),
            None => Ok(ParameterTable::default()),
        }
    }
}
