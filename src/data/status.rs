//! Three-level status bands and the classifier that maps readings onto them.

use serde::Serialize;

use super::parameter::ParameterSpec;

/// Status band for a reading, parameter or indicator.
///
/// Ordered by severity so the worst of several statuses is simply `max()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StatusLevel {
    Normal,
    Warning,
    Critical,
}

impl StatusLevel {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "OK",
            StatusLevel::Warning => "WARN",
            StatusLevel::Critical => "CRIT",
        }
    }

    /// Returns the upper-case label shown next to current values.
    pub fn label(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "NORMAL",
            StatusLevel::Warning => "WARNING",
            StatusLevel::Critical => "CRITICAL",
        }
    }
}

/// Classify a value against its parameter's bands.
///
/// Both band edges are inclusive: a value equal to `normal_high` is Normal and
/// a value equal to `normal_high + critical_margin` is still Warning.
pub fn classify(value: f64, spec: &ParameterSpec) -> StatusLevel {
    if value >= spec.normal_low && value <= spec.normal_high {
        StatusLevel::Normal
    } else if value >= spec.critical_low() && value <= spec.critical_high() {
        StatusLevel::Warning
    } else {
        StatusLevel::Critical
    }
}
