pub mod summary;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use crate::app::{App, AppState};
use crate::session::BankProgress;
use crate::TextSource;
use unicode_width::UnicodeWidthStr;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl<S: TextSource> Widget for &App<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::Summary => summary::render_summary(self, area, buf),
        }
    }
}

fn progress_label(progress: &BankProgress, is_custom: bool) -> String {
    if is_custom {
        "custom text".to_string()
    } else if progress.total == 0 {
        "no texts".to_string()
    } else {
        format!("text {}/{}", progress.position, progress.total)
    }
}

/// Target text as styled lines. Positions covered by rejected keystrokes are
/// red; the cursor sits right after them.
fn prompt_lines(target: &str, accepted: usize, pending: usize) -> Vec<Line<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = Style::default()
        .patch(dim_bold_style)
        .add_modifier(Modifier::UNDERLINED);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
    let cursor = accepted + pending;

    let mut lines = Vec::new();
    let mut spans = Vec::new();
    for (idx, c) in target.chars().enumerate() {
        let style = if idx < accepted {
            green_bold_style
        } else if idx < cursor {
            red_bold_style
        } else if idx == cursor {
            underlined_dim_bold_style
        } else {
            dim_bold_style
        };
        if c == '\n' {
            if idx >= accepted && idx <= cursor {
                spans.push(Span::styled("↵", style));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
        } else {
            spans.push(Span::styled(c.to_string(), style));
        }
    }
    lines.push(Line::from(spans));
    lines
}

fn render_typing<S: TextSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let metrics = &app.snapshot.metrics;
    let target = app.engine.target_text();
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    if target.is_empty() {
        Paragraph::new(Span::styled(
            "No text loaded - add texts to the bank or pass --prompt",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
        return;
    }

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1) as usize;
    let prompt_occupied_lines: u16 = target
        .split('\n')
        .map(|line| line.width().div_ceil(max_chars_per_line).max(1) as u16)
        .sum();
    let single_line = prompt_occupied_lines == 1 && !target.contains('\n');
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let mut status_spans = vec![Span::styled(
        format!(
            "{} wpm   {:.0}% acc   {:.1}s   ",
            metrics.wpm, metrics.accuracy, metrics.elapsed_seconds
        ),
        dim_style,
    )];
    let error_style = if metrics.errors > 0 {
        Style::default().fg(Color::Red)
    } else {
        dim_style
    };
    status_spans.push(Span::styled(format!("{} errors", metrics.errors), error_style));
    status_spans.push(Span::styled(
        format!(
            "   {}",
            progress_label(&app.snapshot.bank_progress, app.engine.is_custom())
        ),
        dim_style,
    ));
    Paragraph::new(Line::from(status_spans))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(prompt_lines(target, metrics.typed_length, app.pending()))
        .alignment(if single_line {
            // short prompts read better centered
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(←) repeat / (→) next / (ctrl+r) restart / (tab) summary / (esc)ape",
        italic_style,
    ))
    .render(chunks[4], buf);
}

fn render_results<S: TextSource>(app: &App<S>, area: Rect, buf: &mut Buffer) {
    let metrics = &app.snapshot.metrics;
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {:.1}% acc   {} errors   {:.2}s",
            metrics.wpm, metrics.accuracy, metrics.errors, metrics.elapsed_seconds
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let progress = &app.snapshot.bank_progress;
    let mut detail = progress_label(progress, app.engine.is_custom());
    if !app.engine.is_custom() && progress.total > 0 && !progress.has_next {
        detail.push_str(" - last text in the bank");
    }
    Paragraph::new(Span::styled(
        detail,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(n)ext / (r)epeat / (s)ummary / (esc)ape",
        italic_style,
    ))
    .render(chunks[4], buf);
}
