//! Application state and navigation logic.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDateTime};

use crate::data::{ParameterSpec, Switch};
use crate::session::Session;
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Parameter table with status, statistics and the selected chart.
    Parameters,
    /// RS422 link throughput and message validation.
    Link,
    /// Control switches and the LED panel.
    Controls,
}

impl View {
    pub const ALL: [View; 3] = [View::Parameters, View::Link, View::Controls];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Parameters => View::Link,
            View::Link => View::Controls,
            View::Controls => View::Parameters,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Parameters => View::Controls,
            View::Link => View::Parameters,
            View::Controls => View::Link,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Parameters => "Parameters",
            View::Link => "RS422 Link",
            View::Controls => "Controls",
        }
    }
}

/// Local wall-clock time, as used for simulated readings.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    pub session: Session,
    /// CSV file re-ingested with `u`.
    pub upload_path: Option<PathBuf>,

    // Navigation state
    pub selected_parameter: usize,
    pub selected_switch: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    pub fn new(session: Session, upload_path: Option<PathBuf>) -> Self {
        Self {
            running: true,
            current_view: View::Parameters,
            show_help: false,
            session,
            upload_path,
            selected_parameter: 0,
            selected_switch: 0,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Advance the session to the current time.
    pub fn tick(&mut self) -> usize {
        self.session.tick(now())
    }

    /// Ingest the configured CSV file, or re-ingest it if already loaded.
    pub fn upload(&mut self) {
        let Some(path) = self.upload_path.clone() else {
            self.set_status_message("No CSV file given (start with --upload <file>)".to_string());
            return;
        };
        self.upload_from(&path);
    }

    pub fn upload_from(&mut self, path: &Path) {
        let message = match self.session.upload_file(path) {
            Ok(summary) => summary.message(),
            Err(e) => format!("Upload failed: {}", e),
        };
        self.set_status_message(message);
    }

    pub fn use_simulation(&mut self) {
        let message = match self.session.use_simulation() {
            Ok(()) => "Using simulated readings".to_string(),
            Err(e) => format!("Simulation unavailable: {}", e),
        };
        self.set_status_message(message);
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.set_status_message("History cleared".to_string());
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    fn item_count(&self) -> usize {
        match self.current_view {
            View::Parameters => self.session.table().len(),
            View::Controls => Switch::ALL.len(),
            View::Link => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_view {
            View::Parameters => Some(&mut self.selected_parameter),
            View::Controls => Some(&mut self.selected_switch),
            View::Link => None,
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        let max = self.item_count().saturating_sub(1);
        if let Some(index) = self.selection_mut() {
            *index = (*index + 1).min(max);
        }
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        if let Some(index) = self.selection_mut() {
            *index = index.saturating_sub(1);
        }
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        if let Some(index) = self.selection_mut() {
            *index = 0;
        }
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.item_count().saturating_sub(1);
        if let Some(index) = self.selection_mut() {
            *index = last;
        }
    }

    pub fn selected_parameter(&self) -> Option<&ParameterSpec> {
        self.session.table().iter().nth(self.selected_parameter)
    }

    pub fn selected_switch(&self) -> Switch {
        Switch::ALL[self.selected_switch.min(Switch::ALL.len() - 1)]
    }

    /// Toggle the selected switch (Controls view only).
    pub fn activate(&mut self) {
        if self.current_view != View::Controls {
            return;
        }
        let switch = self.selected_switch();
        let on = self.session.toggle(switch);
        self.set_status_message(format!(
            "{} {}",
            switch.label(),
            if on { "enabled" } else { "disabled" }
        ));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        let report = self.session.report(now());
        let json = serde_json::to_string_pretty(&report)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn app() -> App {
        let settings = Settings {
            seed: Some(5),
            ..Settings::default()
        };
        App::new(Session::new(&settings).unwrap(), None)
    }

    #[test]
    fn test_view_cycle() {
        let mut view = View::Parameters;
        for _ in 0..View::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, View::Parameters);
        assert_eq!(View::Parameters.prev(), View::Controls);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = app();
        app.select_last();
        assert_eq!(app.selected_parameter, 3);
        app.select_next();
        assert_eq!(app.selected_parameter, 3);
        app.select_first();
        app.select_prev();
        assert_eq!(app.selected_parameter, 0);
        assert_eq!(app.selected_parameter().unwrap().name, "Temperature");
    }

    #[test]
    fn test_activate_only_in_controls() {
        let mut app = app();
        app.activate();
        assert!(app.session.controls().power);

        app.set_view(View::Controls);
        app.activate();
        assert!(!app.session.controls().power);
        assert_eq!(app.get_status_message(), Some("Main Power disabled"));

        app.select_next();
        assert_eq!(app.selected_switch(), Switch::Eom);
    }

    #[test]
    fn test_upload_without_path_sets_message() {
        let mut app = app();
        app.upload();
        assert!(app.get_status_message().unwrap().contains("--upload"));
    }

    #[test]
    fn test_export_state() {
        let mut app = app();
        app.tick();
        let file = tempfile::NamedTempFile::new().unwrap();
        app.export_state(file.path()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["parameters"].as_array().unwrap().len(), 4);
        assert_eq!(json["controls"]["power"], true);
    }
}
