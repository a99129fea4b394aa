use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Instrument, SkillArea};
use crate::skill::{Rating, SkillScores};

/// One calendar day's practice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    pub instrument: Instrument,
    #[serde(rename = "skills")]
    pub skill_scores: SkillScores,
}

/// Practice history with at most one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PracticeLog(Vec<LogEntry>);

impl PracticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, keeping the last entry seen for a date.
    pub fn from_entries(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.upsert(entry);
        }
        log
    }

    /// Replace the entry for `entry.date`, or append a new one.
    pub fn upsert(&mut self, entry: LogEntry) {
        self.0.retain(|e| e.date != entry.date);
        self.0.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    pub fn get(&self, date: NaiveDate) -> Option<&LogEntry> {
        self.0.iter().find(|e| e.date == date)
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.0.last()
    }

    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.0.iter().map(|e| e.date).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreChange {
    pub area: SkillArea,
    pub rating: Rating,
    pub before: u32,
    pub after: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackOutcome {
    pub entry: LogEntry,
    pub changes: Vec<ScoreChange>,
}

/// Whole minutes credited for `elapsed_secs` of practice.
pub fn practiced_minutes(elapsed_secs: u64) -> u32 {
    (elapsed_secs as f64 / 60.0).round() as u32
}

/// Apply one session's ratings and record today's log entry.
///
/// Only rated areas change. The new scores and the upserted log are
/// computed first and then stored together, so callers never observe one
/// without the other.
pub fn apply_session_feedback(
    scores: &mut SkillScores,
    log: &mut PracticeLog,
    ratings: &BTreeMap<SkillArea, Rating>,
    elapsed_secs: u64,
    instrument: Instrument,
    today: NaiveDate,
) -> FeedbackOutcome {
    let mut updated = scores.clone();
    let mut changes = Vec::with_capacity(ratings.len());
    for (&area, &rating) in ratings {
        let before = updated.get(area);
        let after = updated.apply(area, rating);
        changes.push(ScoreChange {
            area,
            rating,
            before,
            after,
        });
    }

    let entry = LogEntry {
        date: today,
        duration_minutes: practiced_minutes(elapsed_secs),
        instrument,
        skill_scores: updated.clone(),
    };
    let mut new_log = log.clone();
    new_log.upsert(entry.clone());

    log::info!(
        "feedback for {today}: {} min on {instrument}, {} areas rated",
        entry.duration_minutes,
        changes.len()
    );

    *scores = updated;
    *log = new_log;
    FeedbackOutcome { entry, changes }
}
