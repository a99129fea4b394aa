use std::time::{Duration, Instant};

use crate::session::{ExerciseSpec, Session};

pub const DEFAULT_BPM: u32 = 60;
pub const MIN_BPM: u32 = 30;
pub const MAX_BPM: u32 = 200;
pub const BPM_STEP: u32 = 5;

/// A cancelable periodic schedule driven by the caller's clock.
///
/// Nothing fires on its own: the owner calls `poll` from its event loop and
/// acts on the returned count. A stopped ticker always reports zero.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Start (or restart) the schedule; the first period ends at `now + period`.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    /// Change the period. A running ticker restarts from `now`.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period;
        if self.is_running() {
            self.start(now);
        }
    }

    /// Number of whole periods that ended since the last poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(next) = self.next else {
            return 0;
        };
        if now < next || self.period.is_zero() {
            return 0;
        }
        let late = now - next;
        let count = 1 + (late.as_nanos() / self.period.as_nanos()) as u32;
        self.next = Some(next + self.period * count);
        count
    }

    /// Time until the next period ends, for sizing an event-loop poll timeout.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }
}

/// What a one-second tick did to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Not running, nothing changed.
    Idle,
    Counted,
    /// The exercise ran out and the next one is loaded, paused.
    Advanced,
    /// The last exercise ran out.
    Finished,
}

/// Countdown and metronome state for one session.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    entries: Vec<ExerciseSpec>,
    index: usize,
    remaining_secs: u32,
    running: bool,
    elapsed_secs: u64,
    metronome_on: bool,
    bpm: u32,
}

impl SessionRunner {
    /// Positioned at the first exercise, stopped. An empty session cannot run.
    pub fn new(session: &Session) -> Option<Self> {
        let first = session.entries.first()?;
        Some(Self {
            remaining_secs: first.minutes * 60,
            bpm: first.suggested_bpm.unwrap_or(DEFAULT_BPM),
            entries: session.entries.clone(),
            index: 0,
            running: false,
            elapsed_secs: 0,
            metronome_on: false,
        })
    }

    pub fn entries(&self) -> &[ExerciseSpec] {
        &self.entries
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &ExerciseSpec {
        &self.entries[self.index]
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn metronome_on(&self) -> bool {
        self.metronome_on
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    fn is_last(&self) -> bool {
        self.index + 1 >= self.entries.len()
    }

    /// The last exercise has run out.
    pub fn is_finished(&self) -> bool {
        self.remaining_secs == 0 && self.is_last()
    }

    pub fn tick(&mut self) -> TickEvent {
        if !self.running || self.remaining_secs == 0 {
            return TickEvent::Idle;
        }
        self.remaining_secs -= 1;
        self.elapsed_secs += 1;
        if self.remaining_secs > 0 {
            return TickEvent::Counted;
        }
        let last = self.is_last();
        self.next_exercise(false);
        if last {
            TickEvent::Finished
        } else {
            TickEvent::Advanced
        }
    }

    /// Toggle the countdown. Entries are at least a minute long, so only the
    /// last exercise can sit at zero; once it has run out this does nothing.
    pub fn play_pause(&mut self) {
        if self.is_finished() {
            return;
        }
        self.running = !self.running;
    }

    /// Move to the next exercise, or run out the last one.
    pub fn next_exercise(&mut self, auto_start: bool) {
        self.metronome_on = false;
        if self.is_last() {
            self.remaining_secs = 0;
            self.running = false;
            return;
        }
        self.index += 1;
        let entry = &self.entries[self.index];
        self.remaining_secs = entry.minutes * 60;
        self.bpm = entry.suggested_bpm.unwrap_or(DEFAULT_BPM);
        self.running = auto_start;
        log::debug!("exercise {} of {}: {}", self.index + 1, self.entries.len(), entry.area);
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.metronome_on = false;
    }

    pub fn toggle_metronome(&mut self) {
        self.metronome_on = !self.metronome_on;
    }

    pub fn bpm_up(&mut self) {
        self.bpm = (self.bpm + BPM_STEP).min(MAX_BPM);
    }

    pub fn bpm_down(&mut self) {
        self.bpm = self.bpm.saturating_sub(BPM_STEP).max(MIN_BPM);
    }

    pub fn metronome_period(&self) -> Duration {
        Duration::from_millis(60_000 / u64::from(self.bpm.max(1)))
    }
}

/// `m:ss` countdown display.
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SkillArea;

    fn spec(area: SkillArea, minutes: u32, bpm: Option<u32>) -> ExerciseSpec {
        ExerciseSpec {
            area,
            title: area.title().to_string(),
            minutes,
            description: String::new(),
            suggested_bpm: bpm,
        }
    }

    fn session(entries: Vec<ExerciseSpec>) -> Session {
        Session {
            entries,
            ..Session::default()
        }
    }

    fn two_step() -> SessionRunner {
        SessionRunner::new(&session(vec![
            spec(SkillArea::LongTones, 1, Some(60)),
            spec(SkillArea::Range, 2, None),
        ]))
        .unwrap()
    }

    #[test]
    fn empty_session_cannot_run() {
        assert!(SessionRunner::new(&Session::default()).is_none());
    }

    #[test]
    fn starts_stopped_at_first_entry() {
        let runner = two_step();
        assert_eq!(runner.index(), 0);
        assert_eq!(runner.remaining_secs(), 60);
        assert!(!runner.is_running());
        assert!(!runner.metronome_on());
        assert_eq!(runner.bpm(), 60);
    }

    #[test]
    fn ticks_only_while_running() {
        let mut runner = two_step();
        assert_eq!(runner.tick(), TickEvent::Idle);
        runner.play_pause();
        assert_eq!(runner.tick(), TickEvent::Counted);
        assert_eq!(runner.remaining_secs(), 59);
        assert_eq!(runner.elapsed_secs(), 1);
        runner.play_pause();
        assert_eq!(runner.tick(), TickEvent::Idle);
        assert_eq!(runner.elapsed_secs(), 1);
    }

    #[test]
    fn countdown_advances_without_starting() {
        let mut runner = two_step();
        runner.play_pause();
        runner.toggle_metronome();
        for _ in 0..59 {
            runner.tick();
        }
        assert_eq!(runner.tick(), TickEvent::Advanced);
        assert_eq!(runner.index(), 1);
        assert_eq!(runner.remaining_secs(), 120);
        assert!(!runner.is_running());
        assert!(!runner.metronome_on());
        assert_eq!(runner.bpm(), DEFAULT_BPM);
        assert_eq!(runner.elapsed_secs(), 60);
    }

    #[test]
    fn last_exercise_finishes() {
        let mut runner = two_step();
        runner.next_exercise(true);
        for _ in 0..119 {
            runner.tick();
        }
        assert_eq!(runner.tick(), TickEvent::Finished);
        assert!(runner.is_finished());
        assert!(!runner.is_running());
        runner.play_pause();
        assert!(!runner.is_running());
        assert_eq!(runner.elapsed_secs(), 120);
    }

    #[test]
    fn play_after_auto_advance_starts_the_loaded_exercise() {
        let mut runner = SessionRunner::new(&session(vec![
            spec(SkillArea::Scales, 1, Some(80)),
            spec(SkillArea::Range, 1, Some(90)),
        ]))
        .unwrap();
        runner.play_pause();
        for _ in 0..60 {
            runner.tick();
        }
        assert_eq!(runner.index(), 1);
        assert_eq!(runner.remaining_secs(), 60);
        assert!(!runner.is_running());
        runner.play_pause();
        assert!(runner.is_running());
        assert_eq!(runner.index(), 1);
        assert_eq!(runner.bpm(), 90);
        for _ in 0..60 {
            runner.tick();
        }
        assert!(runner.is_finished());
        runner.play_pause();
        assert!(!runner.is_running());
    }

    #[test]
    fn bpm_is_clamped() {
        let mut runner = two_step();
        for _ in 0..50 {
            runner.bpm_up();
        }
        assert_eq!(runner.bpm(), MAX_BPM);
        for _ in 0..50 {
            runner.bpm_down();
        }
        assert_eq!(runner.bpm(), MIN_BPM);
        assert_eq!(runner.metronome_period(), Duration::from_millis(2000));
    }

    #[test]
    fn metronome_period_follows_bpm() {
        let runner = two_step();
        assert_eq!(runner.metronome_period(), Duration::from_millis(1000));
    }

    #[test]
    fn ticker_counts_elapsed_periods() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_secs(1));
        assert_eq!(ticker.poll(start + Duration::from_secs(5)), 0);
        ticker.start(start);
        assert_eq!(ticker.poll(start + Duration::from_millis(999)), 0);
        assert_eq!(ticker.poll(start + Duration::from_millis(1000)), 1);
        assert_eq!(ticker.poll(start + Duration::from_millis(1500)), 0);
        assert_eq!(ticker.poll(start + Duration::from_millis(4200)), 3);
        assert_eq!(
            ticker.time_until_next(start + Duration::from_millis(4200)),
            Some(Duration::from_millis(800))
        );
    }

    #[test]
    fn stopped_ticker_never_fires() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(500));
        ticker.start(start);
        ticker.stop();
        assert!(!ticker.is_running());
        assert_eq!(ticker.poll(start + Duration::from_secs(10)), 0);
        assert_eq!(ticker.time_until_next(start), None);
    }

    #[test]
    fn ticker_period_change_restarts() {
        let start = Instant::now();
        let mut ticker = Ticker::new(Duration::from_millis(1000));
        ticker.start(start);
        ticker.set_period(Duration::from_millis(500), start + Duration::from_millis(900));
        assert_eq!(ticker.poll(start + Duration::from_millis(1000)), 0);
        assert_eq!(ticker.poll(start + Duration::from_millis(1400)), 1);
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(1800), "30:00");
    }
}
