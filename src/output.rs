use serde::Serialize;

use crate::feedback::FeedbackOutcome;
use crate::model::{focus_options, Family, SkillArea};
use crate::progress::Dashboard;
use crate::session::Session;
use crate::skill::{SkillScores, Tier};

const BAR_WIDTH: usize = 20;

#[derive(Serialize)]
pub struct ScoreRow {
    pub area: SkillArea,
    pub title: &'static str,
    pub score: u32,
    pub tier: Tier,
    pub tier_name: &'static str,
}

pub fn score_rows(scores: &SkillScores) -> Vec<ScoreRow> {
    scores
        .iter()
        .map(|(area, score)| {
            let tier = crate::skill::tier_of(score);
            ScoreRow {
                area,
                title: area.title(),
                score,
                tier,
                tier_name: tier.name(),
            }
        })
        .collect()
}

fn bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn format_session(session: &Session) -> String {
    let mut out = String::new();
    let instrument = session.instrument.map(|i| i.name()).unwrap_or("Practice");
    out.push_str(&format!(
        "{} session: {} min, focus {}\n",
        instrument,
        session.total_minutes(),
        session.focus.name()
    ));
    for (i, entry) in session.entries.iter().enumerate() {
        let bpm = entry
            .suggested_bpm
            .map(|b| format!(" @ {b} bpm"))
            .unwrap_or_default();
        out.push_str(&format!(
            "\n{}. {} ({} min{})\n",
            i + 1,
            entry.title,
            entry.minutes,
            bpm
        ));
        for line in entry.description.lines() {
            out.push_str(&format!("   {line}\n"));
        }
    }
    out
}

pub fn format_feedback(outcome: &FeedbackOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Logged {} min on {} for {}\n",
        outcome.entry.duration_minutes,
        outcome.entry.instrument.name(),
        outcome.entry.date
    ));
    for change in &outcome.changes {
        out.push_str(&format!(
            "  {:<16} {:<10} {} -> {}\n",
            change.area.title(),
            change.rating.as_str(),
            change.before,
            change.after
        ));
    }
    out
}

pub fn format_progress(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let days = if dashboard.streak == 1 { "day" } else { "days" };
    out.push_str(&format!("Streak:      {} {}\n", dashboard.streak, days));
    out.push_str(&format!("Total hours: {:.1}\n", dashboard.total_hours));
    for family in &dashboard.families {
        out.push_str(&format!("  {:<12} {:.1}\n", family.family.as_str(), family.hours));
        for ih in family.instruments.iter().filter(|ih| ih.hours > 0.0) {
            out.push_str(&format!("    {:<22} {:.1}\n", ih.instrument.name(), ih.hours));
        }
    }

    out.push_str("\nLast 35 days:\n  ");
    for (i, day) in dashboard.calendar.iter().enumerate() {
        let mark = match (day.practiced, day.is_today) {
            (true, _) => 'X',
            (false, true) => 'o',
            (false, false) => '.',
        };
        out.push(mark);
        if (i + 1) % 7 == 0 && i + 1 < dashboard.calendar.len() {
            out.push_str("\n  ");
        }
    }
    out.push('\n');

    out.push_str("\nSkills:\n");
    for skill in &dashboard.skills {
        let next = match (skill.points_to_next, skill.next_tier_name) {
            (Some(points), Some(name)) => format!("{points} to {name}"),
            _ => "max tier".to_string(),
        };
        out.push_str(&format!(
            "  {:<16} {} {:>3.0}%  {} {} ({})\n",
            skill.title,
            bar(skill.percent),
            skill.percent,
            skill.tier,
            skill.tier_name,
            next
        ));
    }
    out
}

pub fn format_scores(scores: &SkillScores) -> String {
    let mut out = String::new();
    for row in score_rows(scores) {
        out.push_str(&format!(
            "{:<16} {:>4}  {} {}\n",
            row.title, row.score, row.tier, row.tier_name
        ));
    }
    out
}

pub fn format_instruments() -> String {
    let mut out = String::new();
    for family in Family::ALL {
        out.push_str(&format!("{}:\n", family.as_str()));
        for &instrument in family.instruments() {
            let focus: Vec<&str> = focus_options(instrument).iter().map(|f| f.id()).collect();
            out.push_str(&format!(
                "  {:<12} {:<22} focus: {}\n",
                instrument.id(),
                instrument.name(),
                focus.join(", ")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::PracticeLog;
    use crate::model::{FocusArea, Instrument};
    use crate::progress::dashboard;
    use crate::session::plan_session;
    use chrono::NaiveDate;

    #[test]
    fn session_lists_every_entry() {
        let session = plan_session(
            Instrument::Trumpet,
            FocusArea::Balanced,
            30,
            &SkillScores::new(),
        );
        let text = format_session(&session);
        assert!(text.starts_with("Trumpet session: 30 min, focus Balanced\n"));
        assert!(text.contains("1. Long Tones"));
        assert!(text.contains("Improvisation"));
        let numbered = text
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .count();
        assert_eq!(numbered, session.len());
    }

    #[test]
    fn empty_session_has_only_header() {
        let text = format_session(&Session::default());
        assert_eq!(text, "Practice session: 0 min, focus Balanced\n");
    }

    #[test]
    fn scores_show_tiers() {
        let mut scores = SkillScores::new();
        scores.set(SkillArea::Flams, 320);
        let text = format_scores(&scores);
        let flams = text.lines().find(|l| l.starts_with("Flams")).unwrap();
        assert!(flams.ends_with("320  Tier 4 Advanced"));
        assert_eq!(text.lines().count(), SkillArea::ALL.len());
    }

    #[test]
    fn instruments_grouped_by_family() {
        let text = format_instruments();
        assert!(text.starts_with("brass:\n  trumpet"));
        assert!(text.contains("percussion:\n"));
        assert!(text.contains("balanced, repertoire, longTones"));
    }

    #[test]
    fn progress_empty_log() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let text = format_progress(&dashboard(&SkillScores::new(), &PracticeLog::new(), today));
        assert!(text.starts_with("Streak:      0 days\nTotal hours: 0.0\n"));
        assert!(text.contains("Long Tones"));
        assert!(text.contains("50 to Fundamental"));
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(bar(50.0), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(bar(100.0), format!("[{}]", "#".repeat(20)));
    }
}
