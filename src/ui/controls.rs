//! Controls view rendering: switches on the left, LED panel on the right.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::Switch;

/// Render the Controls view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    render_switches(frame, app, chunks[0]);
    render_leds(frame, app, chunks[1]);
}

fn render_switches(frame: &mut Frame, app: &App, area: Rect) {
    let controls = app.session.controls();

    let header = Row::new(vec![Cell::from("Switch"), Cell::from("State"), Cell::from("")])
        .height(1)
        .style(app.theme.header);

    let rows: Vec<Row> = Switch::ALL
        .iter()
        .map(|&switch| {
            let on = controls.get(switch);
            let state = if on {
                Cell::from("● ON").style(Style::default().fg(app.theme.normal))
            } else {
                Cell::from("○ OFF").style(Style::default().fg(app.theme.inactive))
            };
            Row::new(vec![
                Cell::from(switch.label()),
                state,
                Cell::from(switch.description()).style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [Constraint::Length(12), Constraint::Length(7), Constraint::Fill(1)];
    let title = format!(
        " Controls: comm {} ",
        controls.comm_state().label()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(app.theme.status_style(controls.comm_status())),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_switch.min(Switch::ALL.len() - 1)));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_leds(frame: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .session
        .leds()
        .into_iter()
        .map(|led| {
            let state = led.state.map(|s| s.label()).unwrap_or("OFF");
            Line::from(vec![
                Span::styled(" ⬤ ", app.theme.led_style(led.state)),
                Span::styled(
                    format!("{:<6}", led.label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("{:<9}", state), app.theme.led_style(led.state)),
                Span::styled(led.description, Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(" LED Panel ")
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(panel, area);
}
