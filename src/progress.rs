//! Read-only views over the score vector and the practice log.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::feedback::PracticeLog;
use crate::model::{Family, Instrument, SkillArea};
use crate::skill::{tier_of, SkillScores, Tier, MAX_MASTERY_SCORE};

/// Days shown in the practice calendar.
pub const CALENDAR_DAYS: u64 = 35;

fn one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn instrument_minutes(log: &PracticeLog, instrument: Instrument) -> u32 {
    log.entries()
        .iter()
        .filter(|e| e.instrument == instrument)
        .map(|e| e.duration_minutes)
        .sum()
}

/// Logged hours for one instrument, to one decimal place.
pub fn instrument_hours(log: &PracticeLog, instrument: Instrument) -> f64 {
    one_decimal(f64::from(instrument_minutes(log, instrument)) / 60.0)
}

/// Sum of the family's per-instrument hours.
pub fn family_hours(log: &PracticeLog, family: Family) -> f64 {
    one_decimal(
        family
            .instruments()
            .iter()
            .map(|&i| instrument_hours(log, i))
            .sum(),
    )
}

pub fn total_hours(log: &PracticeLog) -> f64 {
    one_decimal(Instrument::ALL.iter().map(|&i| instrument_hours(log, i)).sum())
}

/// Consecutive practiced days ending today, or ending yesterday when today
/// has no entry yet.
pub fn streak(log: &PracticeLog, today: NaiveDate) -> u32 {
    let dates = log.dates();
    let mut day = if dates.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };
    let mut count = 0;
    while dates.contains(&day) {
        count += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierProgress {
    pub area: SkillArea,
    pub title: &'static str,
    pub score: u32,
    pub tier: Tier,
    pub tier_name: &'static str,
    pub tier_description: &'static str,
    pub percent: f64,
    pub points_to_next: Option<u32>,
    pub next_tier: Option<Tier>,
    pub next_tier_name: Option<&'static str>,
}

/// Progress through the current tier; the top tier runs up to the maximum score.
pub fn tier_progress(area: SkillArea, score: u32) -> TierProgress {
    let tier = tier_of(score);
    let lower = tier.threshold();
    let next = tier.next();
    let upper = next.map(Tier::threshold).unwrap_or(MAX_MASTERY_SCORE);
    let percent = if upper > lower {
        (f64::from(score.saturating_sub(lower)) / f64::from(upper - lower) * 100.0).min(100.0)
    } else {
        100.0
    };
    TierProgress {
        area,
        title: area.title(),
        score,
        tier,
        tier_name: tier.name(),
        tier_description: tier.description(),
        percent,
        points_to_next: next.map(|t| t.threshold() - score),
        next_tier: next,
        next_tier_name: next.map(Tier::name),
    }
}

/// Skill areas shown on the dashboard: the vocabulary of the family last
/// practiced, wind when nothing has been logged.
pub fn skills_to_show(log: &PracticeLog) -> &'static [SkillArea] {
    log.last()
        .map(|e| e.instrument.family())
        .unwrap_or(Family::Brass)
        .areas()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_today: bool,
    pub practiced: bool,
}

/// The last `days` days ending today, oldest first.
pub fn calendar(log: &PracticeLog, today: NaiveDate, days: u64) -> Vec<CalendarDay> {
    let dates = log.dates();
    (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| CalendarDay {
            date,
            is_today: date == today,
            practiced: dates.contains(&date),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentHours {
    pub instrument: Instrument,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyHours {
    pub family: Family,
    pub hours: f64,
    pub instruments: Vec<InstrumentHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub streak: u32,
    pub total_hours: f64,
    pub families: Vec<FamilyHours>,
    pub skills: Vec<TierProgress>,
    pub calendar: Vec<CalendarDay>,
}

pub fn dashboard(scores: &SkillScores, log: &PracticeLog, today: NaiveDate) -> Dashboard {
    let families = Family::ALL
        .iter()
        .map(|&family| FamilyHours {
            family,
            hours: family_hours(log, family),
            instruments: family
                .instruments()
                .iter()
                .map(|&instrument| InstrumentHours {
                    instrument,
                    hours: instrument_hours(log, instrument),
                })
                .collect(),
        })
        .collect();
    Dashboard {
        streak: streak(log, today),
        total_hours: total_hours(log),
        families,
        skills: skills_to_show(log)
            .iter()
            .map(|&area| tier_progress(area, scores.get(area)))
            .collect(),
        calendar: calendar(log, today, CALENDAR_DAYS),
    }
}
