use crossterm::event::{KeyCode, KeyEvent};

use super::Ui;
use crate::app::{AppState, Screen};
use crate::skill::Rating;

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Leave without applying feedback.
    Quit,
    /// Apply the ratings and leave.
    Submit,
    Continue,
}

/// Handle a key press. Returns an action indicating what the event loop should do.
pub fn handle_key(app: &mut AppState, ui: &mut Ui, key: KeyEvent) -> KeyAction {
    if ui.show_help {
        ui.show_help = false;
        return KeyAction::Continue;
    }
    match app.screen() {
        Screen::Session => handle_session(app, ui, key),
        Screen::Feedback => handle_feedback(app, ui, key),
        Screen::Placement | Screen::Setup => KeyAction::Quit,
    }
}

fn handle_session(app: &mut AppState, ui: &mut Ui, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('?') => ui.show_help = true,
        KeyCode::Char('f') | KeyCode::Enter => {
            app.finish_session();
            ui.cursor = 0;
            return KeyAction::Continue;
        }
        _ => {}
    }
    let Some(runner) = app.runner_mut() else {
        return KeyAction::Continue;
    };
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => runner.play_pause(),
        KeyCode::Char('n') | KeyCode::Right => {
            if !runner.is_finished() {
                runner.next_exercise(false);
            }
        }
        KeyCode::Char('m') => runner.toggle_metronome(),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => runner.bpm_up(),
        KeyCode::Char('-') | KeyCode::Down => runner.bpm_down(),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_feedback(app: &mut AppState, ui: &mut Ui, key: KeyEvent) -> KeyAction {
    let areas: Vec<_> = app.ratings().keys().copied().collect();
    if areas.is_empty() {
        return KeyAction::Quit;
    }
    ui.cursor = ui.cursor.min(areas.len() - 1);
    let area = areas[ui.cursor];
    let current = app.ratings().get(&area).copied().unwrap_or(Rating::JustRight);
    let set = |app: &mut AppState, rating| {
        if let Err(e) = app.rate(area, rating) {
            log::debug!("ignoring rating key: {e:#}");
        }
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Enter => return KeyAction::Submit,
        KeyCode::Char('?') => ui.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => ui.cursor = (ui.cursor + 1).min(areas.len() - 1),
        KeyCode::Char('k') | KeyCode::Up => ui.cursor = ui.cursor.saturating_sub(1),
        KeyCode::Char('1') => set(app, Rating::Hard),
        KeyCode::Char('2') => set(app, Rating::JustRight),
        KeyCode::Char('3') => set(app, Rating::Easy),
        KeyCode::Char('h') | KeyCode::Left => set(app, cycle(current, false)),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char(' ') => set(app, cycle(current, true)),
        _ => {}
    }
    KeyAction::Continue
}

fn cycle(rating: Rating, forward: bool) -> Rating {
    let i = Rating::ALL.iter().position(|&r| r == rating).unwrap_or(1);
    let n = Rating::ALL.len();
    let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
    Rating::ALL[next]
}
