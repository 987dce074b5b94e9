//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::StatusLevel;

/// Render the header bar with the bench overview.
///
/// Displays: overall status, parameter counts by status, comm state, source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;

    let mut normal = 0;
    let mut warning = 0;
    let mut critical = 0;
    for spec in session.table().iter() {
        match session.latest_status(spec) {
            Some(StatusLevel::Normal) => normal += 1,
            Some(StatusLevel::Warning) => warning += 1,
            Some(StatusLevel::Critical) => critical += 1,
            None => {}
        }
    }

    let status_style = app.theme.led_style(session.overall_status());
    let comm = session.controls().comm_state();

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("BENCHWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(format!("{}", normal), Style::default().fg(app.theme.normal)),
        Span::raw(" ok "),
        if warning > 0 {
            Span::styled(format!("{}", warning), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" warn "),
        if critical > 0 {
            Span::styled(
                format!("{}", critical),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" crit │ comm "),
        Span::styled(
            comm.label(),
            app.theme.status_style(session.controls().comm_status()),
        ),
        Span::raw(" │ "),
        Span::raw(session.source().description().to_string()),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = View::ALL
        .iter()
        .position(|v| *v == app.current_view)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the last tick time, history size and available controls. Temporary
/// status messages and source errors take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let session = &app.session;
    let status = if let Some(err) = session.source().error() {
        format!(" Error: {} | u:retry g:simulate q:quit", err)
    } else {
        let controls = match app.current_view {
            View::Parameters => "↑↓:select u:upload g:simulate c:clear ?:help q:quit",
            View::Link => "Tab:switch r:refresh ?:help q:quit",
            View::Controls => "↑↓:select Space:toggle ?:help q:quit",
        };
        let updated = session
            .last_tick()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());

        format!(
            " {} | {} readings | Updated {} | {}",
            app.current_view.label(),
            session.history().len(),
            updated,
            controls,
        )
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2/3       Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Data",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  u         Upload / reload CSV"),
        Line::from("  g         Use simulated data"),
        Line::from("  c         Clear history"),
        Line::from("  r         Refresh now"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Space     Toggle switch"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 24u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
