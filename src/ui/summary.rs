use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use crate::app::App;
use crate::history::{SessionResult, Summary};
use crate::TextSource;

pub fn render_summary<S: TextSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Results table
            Constraint::Length(2), // Instructions
        ])
        .split(area);

    let empty;
    let summary = match app.summary.as_ref() {
        Some(summary) => summary,
        None => {
            empty = app.engine.summary();
            &empty
        }
    };

    Paragraph::new(format!(
        "Progress: {} of {} texts completed",
        summary.completed, summary.total
    ))
    .block(Block::default().borders(Borders::ALL).title("Summary"))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    if summary.results.is_empty() {
        Paragraph::new("No completed bank texts yet. Finish a text to see it here.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    } else {
        render_table(summary, app.summary_scroll, chunks[1], buf);
    }

    Paragraph::new("(b)ack / (p) restart progress / ↑↓ scroll / (esc)ape")
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

fn result_row(result: &SessionResult) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!("#{}", result.index)),
        Cell::from(result.wpm.to_string()),
        Cell::from(format!("{:.0}%", result.accuracy)),
        Cell::from(result.errors.to_string()),
        Cell::from(format!("{:.2}s", result.time)),
        Cell::from(result.completed_at.format("%H:%M:%S").to_string()),
    ])
}

fn render_table(summary: &Summary, scroll: usize, area: Rect, buf: &mut Buffer) {
    // borders, header and the averages footer
    let table_height = area.height.saturating_sub(4) as usize;
    let max_scroll = summary.results.len().saturating_sub(table_height);
    let offset = scroll.min(max_scroll);

    let header = Row::new(vec!["Text", "WPM", "Accuracy", "Errors", "Time", "Completed"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let mut rows: Vec<Row> = summary
        .results
        .iter()
        .skip(offset)
        .take(table_height)
        .map(result_row)
        .collect();

    let avg = &summary.averages;
    rows.push(
        Row::new(vec![
            Cell::from("Average"),
            Cell::from(format!("{:.0}", avg.wpm)),
            Cell::from(format!("{:.0}%", avg.accuracy)),
            Cell::from(format!("{:.1}", avg.errors)),
            Cell::from(format!("{:.2}s", avg.time)),
            Cell::from("-"),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let widths = [
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Results"))
        .render(area, buf);
}
