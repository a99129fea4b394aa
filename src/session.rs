use serde::Serialize;

use crate::allocation::{allocate, AllocationMap, FOCUS_SHARE};
use crate::catalog;
use crate::model::{FocusArea, Instrument, SkillArea};
use crate::skill::SkillScores;

/// One timed exercise in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseSpec {
    pub area: SkillArea,
    pub title: String,
    pub minutes: u32,
    pub description: String,
    pub suggested_bpm: Option<u32>,
}

/// Ordered exercises whose minutes add up to the requested duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub instrument: Option<Instrument>,
    pub focus: FocusArea,
    pub entries: Vec<ExerciseSpec>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn total_minutes(&self) -> u32 {
        self.entries.iter().map(|e| e.minutes).sum()
    }

    pub fn areas(&self) -> Vec<SkillArea> {
        self.entries.iter().map(|e| e.area).collect()
    }
}

fn round_minutes(x: f64) -> u32 {
    x.round().max(0.0) as u32
}

/// Allocate and build in one step.
pub fn plan_session(
    instrument: Instrument,
    focus: FocusArea,
    total_minutes: u32,
    scores: &SkillScores,
) -> Session {
    let allocation = allocate(instrument, focus);
    let session = build_session(&allocation, focus, total_minutes, scores, instrument);
    log::info!(
        "built {} min session for {instrument} ({focus}): {} exercises",
        session.total_minutes(),
        session.len()
    );
    session
}

/// Resolve an allocation into exercises summing to exactly `total_minutes`.
///
/// Returns an empty session when nothing can be scheduled: zero duration,
/// a degenerate allocation, or every area rounding to zero minutes.
///
/// A focused area that survives rounding is pinned to
/// `round(total_minutes * FOCUS_SHARE)` and only the other entries are
/// corrected toward the exact total. Correcting over every entry would hand
/// the rounding residual to the focused one whenever it is the largest, so
/// flute scales at 45 minutes would get 19 instead of 18 and trumpet
/// improvisation at 60 would get 23 instead of 24.
pub fn build_session(
    allocation: &AllocationMap,
    focus: FocusArea,
    total_minutes: u32,
    scores: &SkillScores,
    instrument: Instrument,
) -> Session {
    let mut session = Session {
        instrument: Some(instrument),
        focus,
        entries: Vec::new(),
    };
    if total_minutes == 0 || allocation.is_degenerate() {
        return session;
    }

    if focus == FocusArea::Repertoire {
        let exercise = catalog::repertoire_exercise();
        session.entries.push(ExerciseSpec {
            area: SkillArea::Repertoire,
            title: "Repertoire Practice".to_string(),
            minutes: total_minutes,
            description: exercise.description,
            suggested_bpm: exercise.bpm,
        });
        return session;
    }

    let mut entries = Vec::new();
    for (area, share) in allocation.iter() {
        if area == SkillArea::Repertoire || share <= 0.0 {
            continue;
        }
        let minutes = round_minutes(f64::from(total_minutes) * share);
        if minutes == 0 {
            log::debug!("dropping {area}: {share:.4} of {total_minutes} min rounds to zero");
            continue;
        }
        let exercise = catalog::exercise_for(area, scores.tier(area), instrument);
        entries.push(ExerciseSpec {
            area,
            title: area.title().to_string(),
            minutes,
            description: exercise.description,
            suggested_bpm: exercise.bpm,
        });
    }
    if entries.is_empty() {
        return session;
    }

    let focused = focus
        .area()
        .and_then(|area| entries.iter().position(|e| e.area == area));
    match focused {
        Some(index) => {
            let pinned = round_minutes(f64::from(total_minutes) * FOCUS_SHARE).min(total_minutes);
            let focus_entry = entries.remove(index);
            fit_to_total(&mut entries, total_minutes - pinned);
            let mut focus_entry = focus_entry;
            focus_entry.minutes = if entries.is_empty() { total_minutes } else { pinned };
            // Re-insert at its canonical position among the survivors.
            let order = |area: SkillArea| allocation.iter().position(|(a, _)| a == area);
            let at = entries
                .iter()
                .position(|e| order(e.area) > order(focus_entry.area))
                .unwrap_or(entries.len());
            entries.insert(at, focus_entry);
        }
        None => fit_to_total(&mut entries, total_minutes),
    }

    session.entries = entries;
    session
}

/// Rescale entry minutes so they sum to exactly `target`.
///
/// Each entry is rescaled and re-rounded (minimum 1), then the residual goes
/// to the largest entry (first one on ties). Whatever the 1-minute floor
/// keeps that entry from absorbing is taken from the next-largest entries,
/// and if every entry is already at 1 minute, trailing entries are dropped.
pub fn fit_to_total(entries: &mut Vec<ExerciseSpec>, target: u32) {
    if target == 0 {
        entries.clear();
        return;
    }
    let raw_sum: u32 = entries.iter().map(|e| e.minutes).sum();
    if raw_sum == 0 {
        entries.clear();
        return;
    }

    let factor = f64::from(target) / f64::from(raw_sum);
    for entry in entries.iter_mut() {
        entry.minutes = round_minutes(f64::from(entry.minutes) * factor).max(1);
    }

    let sum: u32 = entries.iter().map(|e| e.minutes).sum();
    let residual = i64::from(target) - i64::from(sum);
    if residual != 0 {
        if let Some(index) = largest(entries, 0) {
            let adjusted = (i64::from(entries[index].minutes) + residual).max(1);
            log::debug!(
                "correcting {} by {residual} min ({} -> {adjusted})",
                entries[index].area,
                entries[index].minutes
            );
            entries[index].minutes = adjusted as u32;
        }
    }

    let mut excess = entries
        .iter()
        .map(|e| e.minutes)
        .sum::<u32>()
        .saturating_sub(target);
    while excess > 0 {
        match largest(entries, 1) {
            Some(index) => {
                let take = excess.min(entries[index].minutes - 1);
                entries[index].minutes -= take;
                excess -= take;
            }
            None => {
                if let Some(dropped) = entries.pop() {
                    log::debug!("dropping {} to fit {target} min", dropped.area);
                }
                excess -= 1;
            }
        }
    }
}

/// Index of the first entry with the most minutes, among entries above `floor`.
fn largest(entries: &[ExerciseSpec], floor: u32) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, entry) in entries.iter().enumerate() {
        if entry.minutes <= floor {
            continue;
        }
        match best {
            Some(b) if entries[b].minutes >= entry.minutes => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::focus_options;

    fn spec(area: SkillArea, minutes: u32) -> ExerciseSpec {
        ExerciseSpec {
            area,
            title: area.title().to_string(),
            minutes,
            description: String::new(),
            suggested_bpm: None,
        }
    }

    fn minutes(session: &Session, area: SkillArea) -> Option<u32> {
        session
            .entries
            .iter()
            .find(|e| e.area == area)
            .map(|e| e.minutes)
    }

    #[test]
    fn fit_corrects_overshoot_on_largest() {
        let mut entries = vec![
            spec(SkillArea::LongTones, 6),
            spec(SkillArea::Scales, 8),
            spec(SkillArea::Range, 8),
        ];
        fit_to_total(&mut entries, 21);
        let total: u32 = entries.iter().map(|e| e.minutes).sum();
        assert_eq!(total, 21);
    }

    #[test]
    fn fit_ties_go_to_first() {
        let mut entries = vec![
            spec(SkillArea::Scales, 4),
            spec(SkillArea::Range, 4),
            spec(SkillArea::Articulation, 4),
        ];
        fit_to_total(&mut entries, 13);
        assert_eq!(entries[0].minutes, 5);
        assert_eq!(entries[1].minutes, 4);
        assert_eq!(entries[2].minutes, 4);
    }

    #[test]
    fn fit_drops_trailing_when_floor_binds() {
        let mut entries = vec![
            spec(SkillArea::SingleStrokes, 1),
            spec(SkillArea::DoubleStrokes, 1),
            spec(SkillArea::Paradiddles, 1),
            spec(SkillArea::Flams, 1),
        ];
        fit_to_total(&mut entries, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].area, SkillArea::SingleStrokes);
        assert!(entries.iter().all(|e| e.minutes == 1));
    }

    #[test]
    fn fit_spreads_deficit_past_largest() {
        let mut entries = vec![
            spec(SkillArea::StickControl, 2),
            spec(SkillArea::Reading, 2),
            spec(SkillArea::Flams, 2),
        ];
        fit_to_total(&mut entries, 3);
        assert_eq!(entries.iter().map(|e| e.minutes).sum::<u32>(), 3);
        assert!(entries.iter().all(|e| e.minutes >= 1));
    }

    #[test]
    fn fit_to_zero_clears() {
        let mut entries = vec![spec(SkillArea::Scales, 5)];
        fit_to_total(&mut entries, 0);
        assert!(entries.is_empty());
    }

    #[test]
    fn balanced_trumpet_half_hour() {
        let session = plan_session(
            Instrument::Trumpet,
            FocusArea::Balanced,
            30,
            &SkillScores::new(),
        );
        assert_eq!(session.total_minutes(), 30);
        assert_eq!(
            session.areas(),
            vec![
                SkillArea::LongTones,
                SkillArea::Flexibility,
                SkillArea::Scales,
                SkillArea::Articulation,
                SkillArea::Range,
                SkillArea::Improvisation,
            ]
        );
    }

    #[test]
    fn focused_improvisation_is_pinned() {
        let session = plan_session(
            Instrument::Trumpet,
            FocusArea::Area(SkillArea::Improvisation),
            60,
            &SkillScores::new(),
        );
        assert_eq!(minutes(&session, SkillArea::Improvisation), Some(24));
        assert_eq!(session.total_minutes(), 60);
        assert_eq!(session.len(), 6);
        assert_eq!(session.entries.last().unwrap().area, SkillArea::Improvisation);
    }

    #[test]
    fn residual_goes_to_the_unfocused_entries() {
        let session = plan_session(
            Instrument::Flute,
            FocusArea::Area(SkillArea::Scales),
            45,
            &SkillScores::new(),
        );
        assert_eq!(minutes(&session, SkillArea::Scales), Some(18));
        assert_eq!(session.total_minutes(), 45);
    }

    #[test]
    fn focused_area_keeps_canonical_position() {
        let session = plan_session(
            Instrument::Flute,
            FocusArea::Area(SkillArea::Scales),
            45,
            &SkillScores::new(),
        );
        assert_eq!(session.entries[2].area, SkillArea::Scales);
        assert_eq!(session.entries[2].minutes, 18);
        assert_eq!(session.total_minutes(), 45);
    }

    #[test]
    fn repertoire_is_a_single_entry() {
        let session = plan_session(
            Instrument::Snare,
            FocusArea::Repertoire,
            45,
            &SkillScores::new(),
        );
        assert_eq!(session.len(), 1);
        assert_eq!(session.entries[0].area, SkillArea::Repertoire);
        assert_eq!(session.entries[0].minutes, 45);
    }

    #[test]
    fn tier_selects_exercise_text() {
        let mut scores = SkillScores::new();
        scores.set(SkillArea::Paradiddles, 500);
        let session = plan_session(Instrument::Snare, FocusArea::Balanced, 60, &scores);
        let entry = session
            .entries
            .iter()
            .find(|e| e.area == SkillArea::Paradiddles)
            .unwrap();
        assert!(entry.description.contains("Tier 4+"));
    }

    #[test]
    fn zero_duration_is_empty() {
        let session = plan_session(Instrument::Tuba, FocusArea::Balanced, 0, &SkillScores::new());
        assert!(session.is_empty());
    }

    #[test]
    fn foreign_focus_is_empty() {
        let session = plan_session(
            Instrument::Mallets,
            FocusArea::Area(SkillArea::Flams),
            30,
            &SkillScores::new(),
        );
        assert!(session.is_empty());
    }

    #[test]
    fn every_duration_sums_exactly() {
        let scores = SkillScores::new();
        for instrument in Instrument::ALL {
            for focus in focus_options(instrument) {
                for total in 1..=120 {
                    let session = plan_session(instrument, focus, total, &scores);
                    if session.is_empty() {
                        continue;
                    }
                    assert_eq!(
                        session.total_minutes(),
                        total,
                        "{instrument} {focus} {total}"
                    );
                    assert!(session.entries.iter().all(|e| e.minutes >= 1));
                }
            }
        }
    }

    #[test]
    fn typical_durations_are_never_empty() {
        let scores = SkillScores::new();
        for instrument in Instrument::ALL {
            for focus in focus_options(instrument) {
                for total in [15, 30, 45, 60] {
                    assert!(!plan_session(instrument, focus, total, &scores).is_empty());
                }
            }
        }
    }
}
