//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::StatusLevel;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for warning-level readings.
    pub warning: Color,
    /// Color for critical-level readings.
    pub critical: Color,
    /// Color for normal readings.
    pub normal: Color,
    /// Color for dark LEDs and switches that are off.
    pub inactive: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            normal: Color::Green,
            inactive: Color::DarkGray,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            normal: Color::Green,
            inactive: Color::Gray,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn status_color(&self, status: StatusLevel) -> Color {
        match status {
            StatusLevel::Normal => self.normal,
            StatusLevel::Warning => self.warning,
            StatusLevel::Critical => self.critical,
        }
    }

    /// Get style for a status level
    pub fn status_style(&self, status: StatusLevel) -> Style {
        match status {
            StatusLevel::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
            other => Style::default().fg(self.status_color(other)),
        }
    }

    /// Style for an optional status; `None` renders as inactive.
    pub fn led_style(&self, state: Option<StatusLevel>) -> Style {
        match state {
            Some(status) => self.status_style(status),
            None => Style::default().fg(self.inactive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.status_color(StatusLevel::Normal), Color::Green);
        assert_eq!(theme.status_style(StatusLevel::Warning).fg, Some(Color::Yellow));
        assert_eq!(theme.led_style(None).fg, Some(theme.inactive));
    }
}
