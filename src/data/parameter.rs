//! Parameter definition table.
//!
//! Each monitored quantity is described once at startup by a [`ParameterSpec`]:
//! its unit, the normal operating band and the margins that bound the warning
//! band. Tables are validated when built, whether they come from the built-in
//! defaults or from a configuration file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::status::{classify, StatusLevel};

/// Errors raised when a parameter table fails validation.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    /// `normal_low` is not strictly below `normal_high`.
    #[error("{name}: normal_low ({low}) must be below normal_high ({high})")]
    InvalidRange { name: String, low: f64, high: f64 },

    /// A margin is negative or not a finite number.
    #[error("{name}: {field} must be a finite value >= 0, got {value}")]
    InvalidMargin {
        name: String,
        field: &'static str,
        value: f64,
    },

    /// The simulation profile has a negative or non-finite spread.
    #[error("{name}: simulation std_dev must be a finite value >= 0, got {value}")]
    InvalidSimulation { name: String, value: f64 },

    /// Two entries share a name (compared case-insensitively).
    #[error("duplicate parameter name: {0}")]
    DuplicateName(String),

    /// The table has no entries.
    #[error("parameter table is empty")]
    Empty,
}

/// Mean and spread used by the simulated generator for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationProfile {
    pub mean: f64,
    pub std_dev: f64,
}

/// Static metadata for one monitored parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Canonical display name, e.g. "Temperature".
    pub name: String,
    /// Unit suffix, e.g. "°C".
    pub unit: String,
    /// Short label for the LED panel. Derived from the name when empty.
    #[serde(default)]
    pub label: String,
    pub normal_low: f64,
    pub normal_high: f64,
    /// Width of the guard band just inside the normal edges.
    #[serde(default)]
    pub warning_margin: f64,
    /// Distance beyond the normal edges at which values become critical.
    pub critical_margin: f64,
    #[serde(default)]
    pub simulation: Option<SimulationProfile>,
}

impl ParameterSpec {
    pub fn new(
        name: &str,
        unit: &str,
        normal_low: f64,
        normal_high: f64,
        warning_margin: f64,
        critical_margin: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            label: default_label(name),
            normal_low,
            normal_high,
            warning_margin,
            critical_margin,
            simulation: None,
        }
    }

    /// Set the LED label.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Attach a simulation profile.
    pub fn with_simulation(mut self, mean: f64, std_dev: f64) -> Self {
        self.simulation = Some(SimulationProfile { mean, std_dev });
        self
    }

    /// Lower edge of the warning band; anything below is critical.
    pub fn critical_low(&self) -> f64 {
        self.normal_low - self.critical_margin
    }

    /// Upper edge of the warning band; anything above is critical.
    pub fn critical_high(&self) -> f64 {
        self.normal_high + self.critical_margin
    }

    /// Classify a value against this parameter.
    pub fn classify(&self, value: f64) -> StatusLevel {
        classify(value, self)
    }

    /// True when a normal value sits within `warning_margin` of a normal edge.
    ///
    /// Out-of-band values are never "near" the limit; they are past it.
    pub fn near_limit(&self, value: f64) -> bool {
        if self.warning_margin <= 0.0 || self.classify(value) != StatusLevel::Normal {
            return false;
        }
        value - self.normal_low < self.warning_margin
            || self.normal_high - value < self.warning_margin
    }

    /// Check the band invariants for this entry.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.normal_low < self.normal_high) {
            return Err(ParameterError::InvalidRange {
                name: self.name.clone(),
                low: self.normal_low,
                high: self.normal_high,
            });
        }
        for (field, value) in [
            ("warning_margin", self.warning_margin),
            ("critical_margin", self.critical_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParameterError::InvalidMargin {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        if let Some(profile) = self.simulation {
            if !profile.std_dev.is_finite() || profile.std_dev < 0.0 || !profile.mean.is_finite()
            {
                return Err(ParameterError::InvalidSimulation {
                    name: self.name.clone(),
                    value: profile.std_dev,
                });
            }
        }
        Ok(())
    }

    /// Format the normal band for display, e.g. "15 - 35 °C".
    pub fn normal_range_label(&self) -> String {
        format!("{} - {} {}", self.normal_low, self.normal_high, self.unit)
    }
}

fn default_label(name: &str) -> String {
    name.chars().take(4).collect::<String>().to_uppercase()
}

/// The validated set of parameters known to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTable {
    specs: Vec<ParameterSpec>,
}

impl Default for ParameterTable {
    /// The four bench parameters with their stock operating ranges.
    fn default() -> Self {
        Self {
            specs: vec![
                ParameterSpec::new("Temperature", "°C", 15.0, 35.0, 2.0, 5.0)
                    .with_label("TEMP")
                    .with_simulation(25.0, 5.0),
                ParameterSpec::new("Voltage", "V", 4.8, 5.2, 0.05, 0.3)
                    .with_label("VOLT")
                    .with_simulation(5.0, 0.3),
                ParameterSpec::new("Humidity", "%", 30.0, 60.0, 3.0, 10.0)
                    .with_label("HUM")
                    .with_simulation(45.0, 10.0),
                ParameterSpec::new("Resistance", "Ω", 95.0, 105.0, 1.0, 5.0)
                    .with_label("RES")
                    .with_simulation(100.0, 5.0),
            ],
        }
    }
}

/// Case-folded form of a parameter name, shared by validation and lookup.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ParameterTable {
    /// Build a table, validating every entry and rejecting duplicate names.
    pub fn new(mut specs: Vec<ParameterSpec>) -> Result<Self, ParameterError> {
        if specs.is_empty() {
            return Err(ParameterError::Empty);
        }

        let mut seen: Vec<String> = Vec::with_capacity(specs.len());
        for spec in &mut specs {
            spec.validate()?;
            let key = name_key(&spec.name);
            if seen.contains(&key) {
                return Err(ParameterError::DuplicateName(spec.name.clone()));
            }
            seen.push(key);
            if spec.label.is_empty() {
                spec.label = default_label(&spec.name);
            }
        }

        Ok(Self { specs })
    }

    /// Look up a parameter by name, ignoring case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        let key = name_key(name);
        self.specs.iter().find(|s| name_key(&s.name) == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Canonical names in table order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }
}
