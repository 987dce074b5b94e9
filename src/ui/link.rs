//! RS422 link view rendering.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::CommState;

/// Render the link view: utilization and validation gauges over a summary.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let link = session.link();
    let thresholds = link.thresholds();
    let comm = session.controls().comm_state();

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(4),
    ])
    .split(area);

    let block = |title: String| {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border))
    };

    let active = comm == CommState::Active;
    let quality = link.quality().filter(|_| active);
    let rate = link.latest().map(|s| s.rate_mbps).filter(|_| active);
    let utilization = link.utilization().filter(|_| active).unwrap_or(0.0);
    let rate_gauge = Gauge::default()
        .block(block(" Data Rate ".to_string()))
        .gauge_style(app.theme.led_style(quality.map(|q| q.status())))
        .ratio(utilization)
        .label(match (rate, quality) {
            (Some(rate), Some(q)) => format!(
                "{:.2} / {:.0} Mbit/s ({})",
                rate,
                thresholds.max_rate_mbps,
                q.label()
            ),
            _ => format!("idle ({})", comm.label()),
        });
    frame.render_widget(rate_gauge, chunks[0]);

    let success = link.success_rate();
    let success_gauge = Gauge::default()
        .block(block(" Message Validation ".to_string()))
        .gauge_style(app.theme.led_style(link.success_status()))
        .ratio((success.unwrap_or(0.0) / 100.0).clamp(0.0, 1.0))
        .label(match success {
            Some(pct) => format!("{:.1}% valid", pct),
            None => "no messages".to_string(),
        });
    frame.render_widget(success_gauge, chunks[1]);

    let (valid, total) = link.message_totals();
    let label = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled(" Comm state:  ", label),
            Span::styled(
                comm.label(),
                app.theme.status_style(session.controls().comm_status()),
            ),
        ]),
        Line::from(vec![
            Span::styled(" Messages:    ", label),
            Span::raw(format!("{} valid / {} total ({} errors)", valid, total, total - valid)),
        ]),
        Line::from(vec![
            Span::styled(" Bands:       ", label),
            Span::raw(format!(
                "excellent >= {} good >= {} fair >= {} Mbit/s",
                thresholds.excellent_mbps, thresholds.good_mbps, thresholds.fair_mbps
            )),
        ]),
        Line::from(vec![
            Span::styled(" Rate trend:  ", label),
            Span::styled(
                crate::ui::render_sparkline(&link.rate_sparkline(), 40),
                Style::default().fg(app.theme.highlight),
            ),
        ]),
    ];

    let summary = Paragraph::new(lines).block(block(format!(" RS422 ({} samples) ", link.len())));
    frame.render_widget(summary, chunks[2]);
}
