pub mod charting;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, Widget,
        Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use tapr::input::InputKind;
use tapr::session::{Session, TimerPhase};
use tapr::stats::{classify, Comparison};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(caption) = self.session.countdown_caption(Instant::now()) {
            render_countdown(caption, area, buf);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(2),  // status
                Constraint::Length(6),  // counters + records
                Constraint::Min(8),     // chart
                Constraint::Length(12), // history
                Constraint::Length(1),  // key help
            ])
            .split(area);

        render_status(self, chunks[0], buf);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        render_counters(&self.session, panels[0], buf);
        render_records(&self.session, panels[1], buf);

        render_chart(&self.session, chunks[2], buf);
        render_history(&self.session, chunks[3], buf);

        let help = Paragraph::new(Span::styled(
            "ctrl-d duration · ctrl-r reset · ctrl-e export · ctrl-s share · ctrl-b bell · ctrl-c quit",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        help.render(chunks[4], buf);
    }
}

fn render_countdown(caption: &str, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(2),
            Constraint::Percentage(45),
        ])
        .split(area);

    let overlay = Paragraph::new(vec![
        Line::from(Span::styled(
            caption,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "get ready",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    overlay.render(chunks[1], buf);
}

fn timer_text(session: &Session) -> String {
    match session.phase {
        TimerPhase::Idle => {
            if session.duration_secs > 0 {
                format!("{}s", session.duration_secs)
            } else {
                "Ready".to_string()
            }
        }
        TimerPhase::CountingDown { .. } => "...".to_string(),
        TimerPhase::Running => {
            if session.duration_secs > 0 {
                format!("{:.2}s", session.remaining_secs)
            } else {
                "Free".to_string()
            }
        }
        TimerPhase::Complete => "Complete!".to_string(),
    }
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;

    let status_style = if session.is_active() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM | Modifier::BOLD)
    };

    let mut spans = vec![
        Span::styled(app.status.clone(), status_style),
        Span::raw("  ·  "),
        Span::styled(timer_text(session), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  ·  "),
        Span::raw(format!("CPS {:.2}", session.current_cps)),
    ];

    if let Some(classification) = classify(session.current_cps) {
        let badge_style = match classification.category {
            Comparison::Above => Style::default().fg(Color::Green),
            Comparison::Below => Style::default().fg(Color::Red),
            Comparison::Average => Style::default().fg(Color::Cyan),
        };
        spans.push(Span::raw("  ·  "));
        spans.push(Span::styled(classification.label, badge_style));
    }

    if session.macro_warning {
        spans.push(Span::raw("  ·  "));
        spans.push(Span::styled(
            "MACRO SUSPECTED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let mut lines = vec![Line::from(spans)];
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }

    Paragraph::new(lines).render(area, buf);
}

fn render_counters(session: &Session, area: Rect, buf: &mut Buffer) {
    let current_label = session.current_label.as_deref().unwrap_or("None");

    let lines = vec![
        Line::from(format!(
            "Total: {}   Current ({}): {}",
            session.total_count, current_label, session.current_count
        )),
        Line::from(format!(
            "Left Clicks:  {:<6} avg {} ms",
            session.left_count,
            session.avg_click_interval_ms(InputKind::LeftClick)
        )),
        Line::from(format!(
            "Right Clicks: {:<6} avg {} ms",
            session.right_count,
            session.avg_click_interval_ms(InputKind::RightClick)
        )),
        Line::from(format!(
            "Key Presses:  {:<6} avg {} ms",
            session.key_count,
            session.avg_key_interval_ms()
        )),
    ];

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Counters"))
        .render(area, buf);
}

fn best_count_caption(count: u64, secs: u64) -> String {
    if count > 0 {
        format!("{} clicks ({:.2} CPS)", count, count as f64 / secs as f64)
    } else {
        "N/A".to_string()
    }
}

fn render_records(session: &Session, area: Rect, buf: &mut Buffer) {
    let records = &session.records;
    let lines = vec![
        Line::from(format!("Best CPS: {:.2}", records.best_cps)),
        Line::from(format!("Best  5s: {}", best_count_caption(records.best_5s, 5))),
        Line::from(format!("Best 10s: {}", best_count_caption(records.best_10s, 10))),
        Line::from(format!("Best 30s: {}", best_count_caption(records.best_30s, 30))),
    ];

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Records"))
        .render(area, buf);
}

fn render_chart(session: &Session, area: Rect, buf: &mut Buffer) {
    let points: Vec<(f64, f64)> = session.chart.iter().map(|p| (*p).into()).collect();

    if points.len() < 2 {
        let placeholder = Paragraph::new(Span::styled(
            "Start testing to see the performance graph",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(Block::default().borders(Borders::ALL).title("Performance"))
        .alignment(Alignment::Center);
        placeholder.render(area, buf);
        return;
    }

    let (x_max, y_max) = charting::compute_chart_params(&points, session.duration_secs);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Yellow))
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title("Performance"))
        .x_axis(
            Axis::default()
                .title("elapsed (s)")
                .style(Style::default().add_modifier(Modifier::DIM))
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(charting::format_label(x_max / 2.0)),
                    Span::raw(charting::format_label(x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("CPS")
                .style(Style::default().add_modifier(Modifier::DIM))
                .bounds([0.0, y_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(charting::format_label(y_max / 2.0)),
                    Span::raw(charting::format_label(y_max)),
                ]),
        );

    chart.render(area, buf);
}

fn kind_style(kind: InputKind) -> Style {
    match kind {
        InputKind::LeftClick => Style::default().fg(Color::Cyan),
        InputKind::RightClick => Style::default().fg(Color::Magenta),
        InputKind::KeyPress => Style::default().fg(Color::Yellow),
    }
}

fn render_history(session: &Session, area: Rect, buf: &mut Buffer) {
    let header = Row::new(vec![
        Cell::from("Number"),
        Cell::from("Type"),
        Cell::from("Value"),
        Cell::from("Time (ms)"),
        Cell::from("Timestamp"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let visible = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = session
        .history
        .iter()
        .take(visible)
        .map(|event| {
            Row::new(vec![
                Cell::from(event.sequence_number.to_string()),
                Cell::from(event.kind.to_string()).style(kind_style(event.kind)),
                Cell::from(event.label.clone()),
                Cell::from(format!("{} ms", event.interval_ms)),
                Cell::from(event.captured_at.format("%H:%M:%S").to_string()),
            ])
        })
        .collect();

    let title = format!(
        "History (showing last {} of {} total inputs)",
        session.history.len(),
        session.total_count
    );

    // Keep the value column wide enough for long key names
    let widths = [
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length("Right Click".width() as u16 + 2),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .render(area, buf);
}
