use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};

use super::Ui;
use crate::app::{AppState, Screen};
use crate::runner::{format_clock, SessionRunner};
use crate::skill::Rating;

pub fn render(frame: &mut Frame, app: &AppState, ui: &Ui) {
    match app.screen() {
        Screen::Feedback => render_feedback(frame, app, ui),
        _ => {
            if let Some(runner) = app.runner() {
                render_session(frame, app, runner);
            }
        }
    }
    if ui.show_help {
        render_help(frame, app.screen());
    }
}

fn render_session(frame: &mut Frame, app: &AppState, runner: &SessionRunner) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let current = runner.current();
    let instrument = app.instrument().map(|i| i.name()).unwrap_or("Practice");
    let header = format!(
        " {} - {} ({} of {}) ",
        instrument,
        current.title,
        runner.index() + 1,
        runner.entries().len()
    );
    let status = if runner.is_finished() {
        "Session complete. Press f to rate it."
    } else if runner.is_running() {
        "Running"
    } else {
        "Paused"
    };
    frame.render_widget(
        Paragraph::new(format!(
            "{}  {}",
            format_clock(runner.remaining_secs()),
            status
        ))
        .block(Block::default().borders(Borders::ALL).title(header)),
        chunks[0],
    );

    let total = current.minutes * 60;
    let ratio = if total == 0 {
        1.0
    } else {
        f64::from(total - runner.remaining_secs().min(total)) / f64::from(total)
    };
    let metronome = if runner.metronome_on() { "on" } else { "off" };
    frame.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(
                " Metronome {} bpm ({metronome}) ",
                runner.bpm()
            )))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(ratio.clamp(0.0, 1.0)),
        chunks[1],
    );

    frame.render_widget(
        Paragraph::new(current.description.as_str())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Exercise ")),
        chunks[2],
    );

    let items: Vec<ListItem> = runner
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (mark, style) = if i < runner.index() {
                ("x", Style::default().fg(Color::Green))
            } else if i == runner.index() {
                (">", Style::default().add_modifier(Modifier::BOLD))
            } else {
                (" ", Style::default().fg(Color::Gray))
            };
            ListItem::new(format!("{mark} {:<16} {:>3} min", entry.title, entry.minutes))
                .style(style)
        })
        .collect();
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Plan ")),
        chunks[3],
    );

    frame.render_widget(
        Paragraph::new(format!(
            "space start/pause  n next  m metronome  +/- tempo  f finish  ? help  elapsed {}",
            format_clock(u32::try_from(runner.elapsed_secs()).unwrap_or(u32::MAX))
        ))
        .style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn rating_style(rating: Rating) -> Style {
    match rating {
        Rating::Hard => Style::default().fg(Color::Red),
        Rating::JustRight => Style::default().fg(Color::Green),
        Rating::Easy => Style::default().fg(Color::Yellow),
    }
}

fn render_feedback(frame: &mut Frame, app: &AppState, ui: &Ui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let items: Vec<ListItem> = app
        .ratings()
        .iter()
        .map(|(area, &rating)| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<18}", area.title())),
                Span::styled(rating.label(), rating_style(rating)),
            ]))
        })
        .collect();
    let mut state = ListState::default();
    state.select(Some(ui.cursor));
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" How did it feel? "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, chunks[0], &mut state);

    frame.render_widget(
        Paragraph::new("j/k move  1 hard  2 just right  3 easy  h/l cycle  Enter save  Esc discard")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
}

fn help_line(keys: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(keys, Style::default().fg(Color::Cyan)),
        Span::raw(text),
    ])
}

fn render_help(frame: &mut Frame, screen: Screen) {
    let lines = if screen == Screen::Feedback {
        vec![
            help_line("j/Down   ", "Next area"),
            help_line("k/Up     ", "Previous area"),
            help_line("1/2/3    ", "Too hard / just right / too easy"),
            help_line("h/l      ", "Cycle rating"),
            help_line("Enter    ", "Save feedback"),
            help_line("Esc/q    ", "Discard and quit"),
        ]
    } else {
        vec![
            help_line("Space/p  ", "Start or pause"),
            help_line("n/Right  ", "Next exercise"),
            help_line("m        ", "Toggle metronome"),
            help_line("+/Up     ", "Tempo up"),
            help_line("-/Down   ", "Tempo down"),
            help_line("f/Enter  ", "Finish and rate"),
            help_line("Esc/q    ", "Quit without saving"),
        ]
    };
    let term = frame.area();
    let width = 46.min(term.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
