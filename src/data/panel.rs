//! Control switches and the LED indicator panel.

use serde::Serialize;

use super::status::StatusLevel;

/// The three bench control switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Switch {
    /// Main power.
    Power,
    /// End of Message detection.
    Eom,
    /// Start of Message detection.
    Som,
}

impl Switch {
    pub const ALL: [Switch; 3] = [Switch::Power, Switch::Eom, Switch::Som];

    pub fn label(&self) -> &'static str {
        match self {
            Switch::Power => "Main Power",
            Switch::Eom => "EOM",
            Switch::Som => "SOM",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Switch::Power => "System power on/off",
            Switch::Eom => "End of Message detection",
            Switch::Som => "Start of Message detection",
        }
    }
}

/// Communication state derived from the switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommState {
    Active,
    Standby,
    Offline,
}

impl CommState {
    pub fn label(&self) -> &'static str {
        match self {
            CommState::Active => "Active",
            CommState::Standby => "Standby",
            CommState::Offline => "Offline",
        }
    }
}

/// Switch positions for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlSwitches {
    pub power: bool,
    pub eom: bool,
    pub som: bool,
}

impl Default for ControlSwitches {
    fn default() -> Self {
        Self {
            power: true,
            eom: false,
            som: true,
        }
    }
}

impl ControlSwitches {
    pub fn get(&self, switch: Switch) -> bool {
        match switch {
            Switch::Power => self.power,
            Switch::Eom => self.eom,
            Switch::Som => self.som,
        }
    }

    /// Flip a switch and return its new position.
    pub fn toggle(&mut self, switch: Switch) -> bool {
        let slot = match switch {
            Switch::Power => &mut self.power,
            Switch::Eom => &mut self.eom,
            Switch::Som => &mut self.som,
        };
        *slot = !*slot;
        *slot
    }

    pub fn comm_state(&self) -> CommState {
        if !self.power {
            CommState::Offline
        } else if self.som || self.eom {
            CommState::Active
        } else {
            CommState::Standby
        }
    }

    /// Full detection (both SOM and EOM) is Normal; anything short of that
    /// while powered is Warning.
    pub fn comm_status(&self) -> StatusLevel {
        match self.comm_state() {
            CommState::Offline => StatusLevel::Critical,
            CommState::Active if self.som && self.eom => StatusLevel::Normal,
            CommState::Active | CommState::Standby => StatusLevel::Warning,
        }
    }
}

/// One indicator on the LED panel. `state` is `None` when the LED is dark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Led {
    pub label: String,
    pub state: Option<StatusLevel>,
    pub description: String,
}

impl Led {
    pub fn new(label: &str, state: Option<StatusLevel>, description: String) -> Self {
        Self {
            label: label.to_string(),
            state,
            description,
        }
    }
}
