//! Parameters view rendering.
//!
//! A table of every monitored parameter with its latest value, status and
//! window statistics, above a time chart of the selected parameter. Points
//! are colored by status band and the normal limits are drawn as reference
//! lines.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;
use crate::data::{ClassifiedPoint, ParameterSpec, StatusLevel};

/// Width of the sparkline column, in characters.
const SPARKLINE_WIDTH: usize = 12;

/// Render the Parameters view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let table_height = app.session.table().len() as u16 + 3;
    let chunks =
        Layout::vertical([Constraint::Length(table_height), Constraint::Min(6)]).split(area);

    render_table(frame, app, chunks[0]);
    match app.selected_parameter() {
        Some(spec) => render_chart(frame, app, spec, chunks[1]),
        None => frame.render_widget(Paragraph::new(" No parameters configured"), chunks[1]),
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;

    let header = Row::new(vec![
        Cell::from("Parameter"),
        Cell::from("Value"),
        Cell::from("Normal"),
        Cell::from("Avg"),
        Cell::from("Min"),
        Cell::from("Max"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = session
        .table()
        .iter()
        .map(|spec| {
            let stats = session.stats(&spec.name);
            let value = stats
                .map(|s| format!("{:.2} {}", s.latest.value, spec.unit))
                .unwrap_or_else(|| "-".to_string());
            let fmt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string());

            let status_cell = match stats {
                Some(s) => {
                    let mut label = s.latest.status.symbol().to_string();
                    if s.latest.near_limit {
                        label.push('!');
                    }
                    Cell::from(label).style(app.theme.status_style(s.latest.status))
                }
                None => Cell::from("-").style(app.theme.led_style(None)),
            };

            Row::new(vec![
                Cell::from(spec.name.clone()),
                Cell::from(value),
                Cell::from(spec.normal_range_label()),
                Cell::from(fmt(stats.map(|s| s.average))),
                Cell::from(fmt(stats.map(|s| s.min))),
                Cell::from(fmt(stats.map(|s| s.max))),
                Cell::from(crate::ui::render_sparkline(
                    &session.sparkline(&spec.name),
                    SPARKLINE_WIDTH,
                )),
                status_cell,
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Min(SPARKLINE_WIDTH as u16),
        Constraint::Min(6),
    ];

    let count = session.table().len();
    let selected = app.selected_parameter.min(count.saturating_sub(1));
    let title = format!(
        " Parameters [{}/{}] window {} ",
        selected + 1,
        count,
        format_duration(session.history().window().to_std().unwrap_or_default())
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Minutes since the first point, for the chart x-axis.
fn x_of(origin: &ClassifiedPoint, point: &ClassifiedPoint) -> f64 {
    point
        .timestamp
        .signed_duration_since(origin.timestamp)
        .num_milliseconds() as f64
        / 60_000.0
}

fn render_chart(frame: &mut Frame, app: &App, spec: &ParameterSpec, area: Rect) {
    let points = app.session.series(&spec.name);
    let block = Block::default()
        .title(format!(" {} ({}) ", spec.name, spec.unit))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        let empty = Paragraph::new(" No readings in the window")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let line: Vec<(f64, f64)> = points.iter().map(|p| (x_of(first, p), p.value)).collect();
    let by_status = |level: StatusLevel| -> Vec<(f64, f64)> {
        points
            .iter()
            .filter(|p| p.status == level)
            .map(|p| (x_of(first, p), p.value))
            .collect()
    };
    let normal = by_status(StatusLevel::Normal);
    let warning = by_status(StatusLevel::Warning);
    let critical = by_status(StatusLevel::Critical);

    let x_max = x_of(first, last).max(1.0);
    let low_limit = [(0.0, spec.normal_low), (x_max, spec.normal_low)];
    let high_limit = [(0.0, spec.normal_high), (x_max, spec.normal_high)];

    let data_min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let data_max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let y_min = data_min.min(spec.critical_low());
    let y_max = data_max.max(spec.critical_high());

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.inactive))
            .data(&low_limit),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.inactive))
            .data(&high_limit),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(app.theme.highlight))
            .data(&line),
        Dataset::default()
            .name(StatusLevel::Normal.label())
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(app.theme.status_style(StatusLevel::Normal))
            .data(&normal),
        Dataset::default()
            .name(StatusLevel::Warning.label())
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(app.theme.status_style(StatusLevel::Warning))
            .data(&warning),
        Dataset::default()
            .name(StatusLevel::Critical.label())
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(app.theme.status_style(StatusLevel::Critical))
            .data(&critical),
    ];

    let x_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([0.0, x_max])
        .labels(vec![
            Span::raw(first.timestamp.format("%H:%M").to_string()),
            Span::raw(last.timestamp.format("%H:%M").to_string()),
        ]);
    let y_axis = Axis::default()
        .style(Style::default().fg(app.theme.border))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.1}", y_min)),
            Span::raw(format!("{:.1}", spec.normal_low)),
            Span::raw(format!("{:.1}", spec.normal_high)),
            Span::raw(format!("{:.1}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);
    frame.render_widget(chart, area);
}
