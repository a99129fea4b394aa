mod event;
mod view;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use crate::app::{AppState, Screen};
use crate::audio::AudioPlayer;
use crate::feedback::FeedbackOutcome;
use crate::runner::{SessionRunner, TickEvent, Ticker};
use event::KeyAction;

/// Longest wait for input between redraws.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// View-only state of the terminal runner.
#[derive(Debug, Default)]
pub struct Ui {
    pub cursor: usize,
    pub show_help: bool,
}

/// The countdown and metronome schedules, kept in step with the runner.
///
/// Whatever the runner says is off is stopped here before the next poll, so
/// a paused timer, a skipped exercise or a muted metronome never fires again.
#[derive(Debug)]
pub struct Clocks {
    countdown: Ticker,
    metronome: Ticker,
}

impl Default for Clocks {
    fn default() -> Self {
        Self {
            countdown: Ticker::new(COUNTDOWN_PERIOD),
            metronome: Ticker::new(Duration::from_secs(1)),
        }
    }
}

impl Clocks {
    pub fn sync(&mut self, runner: Option<&SessionRunner>, now: Instant) {
        let Some(runner) = runner else {
            self.stop();
            return;
        };

        match (runner.is_running(), self.countdown.is_running()) {
            (true, false) => {
                log::debug!("countdown started");
                self.countdown.start(now);
            }
            (false, true) => {
                log::debug!("countdown stopped");
                self.countdown.stop();
            }
            _ => {}
        }

        let period = runner.metronome_period();
        if !runner.metronome_on() {
            if self.metronome.is_running() {
                log::debug!("metronome stopped");
                self.metronome.stop();
            }
        } else if !self.metronome.is_running() {
            log::debug!("metronome started at {} bpm", runner.bpm());
            self.metronome.set_period(period, now);
            self.metronome.start(now);
        } else if self.metronome.period() != period {
            log::debug!("metronome retimed to {} bpm", runner.bpm());
            self.metronome.set_period(period, now);
        }
    }

    pub fn stop(&mut self) {
        self.countdown.stop();
        self.metronome.stop();
    }

    pub fn is_idle(&self) -> bool {
        !self.countdown.is_running() && !self.metronome.is_running()
    }

    /// How long the event loop may block before a schedule is due.
    fn timeout(&self, now: Instant) -> Duration {
        [
            self.countdown.time_until_next(now),
            self.metronome.time_until_next(now),
        ]
        .into_iter()
        .flatten()
        .fold(POLL_INTERVAL, Duration::min)
    }

    /// Advance the runner by whatever came due and sound the metronome.
    fn fire(&mut self, runner: &mut SessionRunner, audio: &mut dyn AudioPlayer, now: Instant) {
        for _ in 0..self.countdown.poll(now) {
            match runner.tick() {
                TickEvent::Advanced | TickEvent::Finished => break,
                TickEvent::Counted | TickEvent::Idle => {}
            }
        }
        // Missed beats are dropped rather than played back to back.
        if self.metronome.poll(now) > 0 && runner.metronome_on() {
            audio.play_click();
        }
    }
}

/// Run the session and feedback screens in the terminal.
///
/// Returns the applied feedback, or `None` when the user quit without
/// saving. The caller persists `app.scores` and `app.log` afterwards.
pub fn run(
    app: &mut AppState,
    audio: &mut dyn AudioPlayer,
    today: NaiveDate,
) -> Result<Option<FeedbackOutcome>> {
    terminal::enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut clocks = Clocks::default();

    let result = run_loop(&mut terminal, app, audio, &mut clocks, today);

    clocks.stop();
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    audio: &mut dyn AudioPlayer,
    clocks: &mut Clocks,
    today: NaiveDate,
) -> Result<Option<FeedbackOutcome>> {
    let mut ui = Ui::default();

    loop {
        terminal.draw(|frame| view::render(frame, app, &ui))?;

        let now = Instant::now();
        clocks.sync(active_runner(app), now);
        if ct_event::poll(clocks.timeout(now))? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    match event::handle_key(app, &mut ui, key) {
                        KeyAction::Quit => {
                            app.back_to_setup();
                            return Ok(None);
                        }
                        KeyAction::Submit => return Ok(app.finish_feedback(today)),
                        KeyAction::Continue => {}
                    }
                }
            }
        }

        let now = Instant::now();
        clocks.sync(active_runner(app), now);
        if app.screen() == Screen::Session {
            if let Some(runner) = app.runner_mut() {
                clocks.fire(runner, audio, now);
            }
        }
    }
}

/// The runner only counts while its screen is showing.
fn active_runner(app: &AppState) -> Option<&SessionRunner> {
    if app.screen() == Screen::Session {
        app.runner()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::feedback::PracticeLog;
    use crate::model::Instrument;
    use crate::skill::SkillScores;

    fn session_app() -> AppState {
        let mut app = AppState::new(SkillScores::new(), PracticeLog::new(), true);
        app.select_instrument(Instrument::Snare);
        assert!(app.generate_session());
        app
    }

    #[test]
    fn clocks_follow_runner() {
        let mut app = session_app();
        let mut clocks = Clocks::default();
        let start = Instant::now();
        clocks.sync(app.runner(), start);
        assert!(clocks.is_idle());

        let runner = app.runner_mut().unwrap();
        runner.play_pause();
        runner.toggle_metronome();
        clocks.sync(app.runner(), start);
        assert!(clocks.countdown.is_running());
        assert!(clocks.metronome.is_running());

        let mut audio = RecordingAudio::default();
        let later = start + Duration::from_millis(3100);
        clocks.fire(app.runner_mut().unwrap(), &mut audio, later);
        assert_eq!(app.runner().unwrap().elapsed_secs(), 3);
        assert_eq!(audio.tones.len(), 1);

        app.runner_mut().unwrap().play_pause();
        clocks.sync(app.runner(), later);
        assert!(!clocks.countdown.is_running());
        assert!(clocks.metronome.is_running());
    }

    #[test]
    fn skipping_exercise_silences_metronome() {
        let mut app = session_app();
        let mut clocks = Clocks::default();
        let now = Instant::now();
        app.runner_mut().unwrap().toggle_metronome();
        clocks.sync(app.runner(), now);
        assert!(clocks.metronome.is_running());
        app.runner_mut().unwrap().next_exercise(false);
        clocks.sync(app.runner(), now);
        assert!(clocks.is_idle());
    }

    #[test]
    fn leaving_screen_stops_everything() {
        let mut app = session_app();
        let mut clocks = Clocks::default();
        let now = Instant::now();
        let runner = app.runner_mut().unwrap();
        runner.play_pause();
        runner.toggle_metronome();
        clocks.sync(active_runner(&app), now);
        assert!(!clocks.is_idle());
        app.finish_session();
        clocks.sync(active_runner(&app), now);
        assert!(clocks.is_idle());
    }

    #[test]
    fn tempo_change_retimes_metronome() {
        let mut app = session_app();
        let mut clocks = Clocks::default();
        let now = Instant::now();
        app.runner_mut().unwrap().toggle_metronome();
        clocks.sync(app.runner(), now);
        app.runner_mut().unwrap().bpm_up();
        clocks.sync(app.runner(), now);
        assert_eq!(clocks.metronome.period(), app.runner().unwrap().metronome_period());
    }

    #[test]
    fn timeout_never_exceeds_poll_interval() {
        let clocks = Clocks::default();
        assert_eq!(clocks.timeout(Instant::now()), POLL_INTERVAL);
    }
}
