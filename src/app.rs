use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::feedback::{apply_session_feedback, FeedbackOutcome, PracticeLog};
use crate::model::{focus_options, FocusArea, Instrument, SkillArea};
use crate::runner::SessionRunner;
use crate::session::{plan_session, Session};
use crate::skill::{Rating, SkillScores, Tier};

pub const DEFAULT_DURATION: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Placement,
    Setup,
    Session,
    Feedback,
}

/// Starting scores from a placement questionnaire.
///
/// Every area the instrument practices gets the threshold of its chosen
/// tier (tier 1 when not answered); all other areas are zero.
pub fn placement_scores(instrument: Instrument, tiers: &BTreeMap<SkillArea, Tier>) -> SkillScores {
    let mut scores = SkillScores::new();
    for area in instrument.supported_areas() {
        let tier = tiers.get(&area).copied().unwrap_or(Tier::MIN);
        scores.set(area, tier.threshold());
    }
    scores
}

/// The whole interactive state. Transitions are synchronous and do no I/O;
/// callers persist `scores` and `log` after the ones that change them.
#[derive(Debug)]
pub struct AppState {
    pub scores: SkillScores,
    pub log: PracticeLog,
    pub placement_completed: bool,
    screen: Screen,
    instrument: Option<Instrument>,
    duration: u32,
    focus: FocusArea,
    session: Option<Session>,
    runner: Option<SessionRunner>,
    ratings: BTreeMap<SkillArea, Rating>,
}

impl AppState {
    pub fn new(scores: SkillScores, log: PracticeLog, placement_completed: bool) -> Self {
        Self {
            scores,
            log,
            placement_completed,
            screen: if placement_completed {
                Screen::Setup
            } else {
                Screen::Placement
            },
            instrument: None,
            duration: DEFAULT_DURATION,
            focus: FocusArea::Balanced,
            session: None,
            runner: None,
            ratings: BTreeMap::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn instrument(&self) -> Option<Instrument> {
        self.instrument
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn focus(&self) -> FocusArea {
        self.focus
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn runner(&self) -> Option<&SessionRunner> {
        self.runner.as_ref()
    }

    pub fn runner_mut(&mut self) -> Option<&mut SessionRunner> {
        self.runner.as_mut()
    }

    pub fn ratings(&self) -> &BTreeMap<SkillArea, Rating> {
        &self.ratings
    }

    pub fn complete_placement(&mut self, instrument: Instrument, tiers: &BTreeMap<SkillArea, Tier>) {
        self.scores = placement_scores(instrument, tiers);
        self.placement_completed = true;
        self.screen = Screen::Setup;
    }

    pub fn skip_placement(&mut self) {
        self.placement_completed = true;
        self.screen = Screen::Setup;
    }

    /// Picking an instrument resets the focus, since areas differ per
    /// instrument. A session in progress is discarded, stopping its timers.
    pub fn select_instrument(&mut self, instrument: Instrument) {
        if self.session.is_some() {
            log::info!("instrument changed to {instrument}; discarding the current session");
            self.clear_session();
        }
        self.instrument = Some(instrument);
        self.focus = FocusArea::Balanced;
    }

    pub fn select_duration(&mut self, minutes: u32) -> Result<()> {
        if minutes == 0 {
            bail!("session duration must be at least 1 minute");
        }
        self.duration = minutes;
        Ok(())
    }

    pub fn select_focus(&mut self, focus: FocusArea) -> Result<()> {
        let Some(instrument) = self.instrument else {
            bail!("select an instrument before choosing a focus");
        };
        if !focus_options(instrument).contains(&focus) {
            bail!("'{focus}' is not a focus option for {instrument}");
        }
        self.focus = focus;
        Ok(())
    }

    /// Build the session and enter the runner. Returns false, changing
    /// nothing, when there is no instrument or nothing to practice.
    pub fn generate_session(&mut self) -> bool {
        let Some(instrument) = self.instrument else {
            return false;
        };
        let session = plan_session(instrument, self.focus, self.duration, &self.scores);
        let Some(runner) = SessionRunner::new(&session) else {
            log::info!("no exercises for {instrument} ({}); not starting", self.focus);
            return false;
        };
        self.ratings = session
            .areas()
            .into_iter()
            .map(|area| (area, Rating::JustRight))
            .collect();
        self.session = Some(session);
        self.runner = Some(runner);
        self.screen = Screen::Session;
        true
    }

    /// Leave the runner for the rating screen.
    pub fn finish_session(&mut self) {
        if let Some(runner) = self.runner.as_mut() {
            runner.stop();
        }
        if self.session.is_some() {
            self.screen = Screen::Feedback;
        }
    }

    pub fn rate(&mut self, area: SkillArea, rating: Rating) -> Result<()> {
        match self.ratings.get_mut(&area) {
            Some(slot) => {
                *slot = rating;
                Ok(())
            }
            None => bail!("'{area}' is not part of this session"),
        }
    }

    /// Apply the ratings and log today's practice, then return to setup.
    pub fn finish_feedback(&mut self, today: NaiveDate) -> Option<FeedbackOutcome> {
        let instrument = self.session.as_ref()?.instrument?;
        let elapsed = self.runner.as_ref().map(|r| r.elapsed_secs()).unwrap_or(0);
        let outcome = apply_session_feedback(
            &mut self.scores,
            &mut self.log,
            &self.ratings,
            elapsed,
            instrument,
            today,
        );
        self.clear_session();
        Some(outcome)
    }

    /// Drop the session without touching scores or the log.
    pub fn back_to_setup(&mut self) {
        self.clear_session();
    }

    fn clear_session(&mut self) {
        if let Some(runner) = self.runner.as_mut() {
            runner.stop();
        }
        self.session = None;
        self.runner = None;
        self.ratings.clear();
        self.screen = Screen::Setup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn placed() -> AppState {
        AppState::new(SkillScores::new(), PracticeLog::new(), true)
    }

    #[test]
    fn new_user_starts_at_placement() {
        let app = AppState::new(SkillScores::new(), PracticeLog::new(), false);
        assert_eq!(app.screen(), Screen::Placement);
        assert_eq!(placed().screen(), Screen::Setup);
    }

    #[test]
    fn placement_seeds_thresholds() {
        let mut app = AppState::new(SkillScores::new(), PracticeLog::new(), false);
        let mut scores = SkillScores::new();
        scores.set(SkillArea::Flams, 400);
        app.scores = scores;
        let tiers: BTreeMap<SkillArea, Tier> = [
            (SkillArea::Scales, Tier::from_number(3).unwrap()),
            (SkillArea::Range, Tier::MAX),
        ]
        .into_iter()
        .collect();
        app.complete_placement(Instrument::Trumpet, &tiers);
        assert!(app.placement_completed);
        assert_eq!(app.screen(), Screen::Setup);
        assert_eq!(app.scores.get(SkillArea::Scales), 150);
        assert_eq!(app.scores.get(SkillArea::Range), 500);
        assert_eq!(app.scores.get(SkillArea::LongTones), 0);
        assert_eq!(app.scores.get(SkillArea::Flams), 0);
    }

    #[test]
    fn skip_placement_keeps_scores() {
        let mut app = AppState::new(SkillScores::new(), PracticeLog::new(), false);
        app.skip_placement();
        assert!(app.placement_completed);
        assert_eq!(app.scores, SkillScores::new());
    }

    #[test]
    fn instrument_change_resets_focus() {
        let mut app = placed();
        app.select_instrument(Instrument::Trumpet);
        app.select_focus(FocusArea::Area(SkillArea::Improvisation)).unwrap();
        app.select_instrument(Instrument::Tuba);
        assert_eq!(app.focus(), FocusArea::Balanced);
        assert!(app.select_focus(FocusArea::Area(SkillArea::Improvisation)).is_err());
    }

    #[test]
    fn focus_needs_instrument() {
        let mut app = placed();
        assert!(app.select_focus(FocusArea::Repertoire).is_err());
    }

    #[test]
    fn zero_duration_rejected() {
        let mut app = placed();
        assert!(app.select_duration(0).is_err());
        assert_eq!(app.duration(), DEFAULT_DURATION);
        app.select_duration(45).unwrap();
        assert_eq!(app.duration(), 45);
    }

    #[test]
    fn generate_without_instrument_does_nothing() {
        let mut app = placed();
        assert!(!app.generate_session());
        assert_eq!(app.screen(), Screen::Setup);
        assert!(app.session().is_none());
    }

    #[test]
    fn generate_enters_session() {
        let mut app = placed();
        app.select_instrument(Instrument::Snare);
        assert!(app.generate_session());
        assert_eq!(app.screen(), Screen::Session);
        let session = app.session().unwrap();
        assert_eq!(session.total_minutes(), DEFAULT_DURATION);
        let runner = app.runner().unwrap();
        assert_eq!(runner.index(), 0);
        assert!(!runner.is_running());
        assert_eq!(app.ratings().len(), session.len());
        assert!(app.ratings().values().all(|&r| r == Rating::JustRight));
    }

    #[test]
    fn rate_only_session_areas() {
        let mut app = placed();
        app.select_instrument(Instrument::Mallets);
        assert!(app.generate_session());
        app.rate(SkillArea::Reading, Rating::Easy).unwrap();
        assert!(app.rate(SkillArea::Flams, Rating::Easy).is_err());
    }

    #[test]
    fn finish_applies_feedback_once() {
        let mut app = placed();
        app.select_instrument(Instrument::Mallets);
        assert!(app.generate_session());
        app.runner_mut().unwrap().play_pause();
        for _ in 0..90 {
            app.runner_mut().unwrap().tick();
        }
        app.rate(SkillArea::Reading, Rating::Easy).unwrap();
        app.finish_session();
        assert_eq!(app.screen(), Screen::Feedback);
        let outcome = app.finish_feedback(day()).unwrap();
        assert_eq!(outcome.entry.duration_minutes, 2);
        assert_eq!(app.scores.get(SkillArea::Reading), 5);
        assert_eq!(app.scores.get(SkillArea::MalletControl), 2);
        assert_eq!(app.log.len(), 1);
        assert_eq!(app.screen(), Screen::Setup);
        assert!(app.finish_feedback(day()).is_none());
        assert_eq!(app.log.len(), 1);
    }

    #[test]
    fn instrument_change_mid_session_discards_it() {
        let mut app = placed();
        app.select_instrument(Instrument::Snare);
        assert!(app.generate_session());
        let runner = app.runner_mut().unwrap();
        runner.play_pause();
        runner.toggle_metronome();
        runner.tick();

        app.select_instrument(Instrument::Tuba);
        assert_eq!(app.screen(), Screen::Setup);
        assert!(app.session().is_none());
        assert!(app.runner().is_none());
        assert!(app.ratings().is_empty());
        assert!(app.finish_feedback(day()).is_none());
        assert!(app.log.is_empty());
        assert!(!app.scores.has_progress());
    }

    #[test]
    fn feedback_logs_the_practiced_instrument() {
        let mut app = placed();
        app.select_instrument(Instrument::Snare);
        assert!(app.generate_session());
        app.finish_session();
        app.select_instrument(Instrument::Tuba);
        assert!(app.finish_feedback(day()).is_none());

        app.select_instrument(Instrument::Snare);
        assert!(app.generate_session());
        app.finish_session();
        let outcome = app.finish_feedback(day()).unwrap();
        assert_eq!(outcome.entry.instrument, Instrument::Snare);
        assert_eq!(app.log.get(day()).unwrap().instrument, Instrument::Snare);
    }

    #[test]
    fn back_to_setup_discards() {
        let mut app = placed();
        app.select_instrument(Instrument::Flute);
        assert!(app.generate_session());
        app.back_to_setup();
        assert_eq!(app.screen(), Screen::Setup);
        assert!(app.session().is_none());
        assert!(app.log.is_empty());
        assert!(!app.scores.has_progress());
    }
}
