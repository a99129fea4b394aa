use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::SkillArea;

pub const MAX_MASTERY_SCORE: u32 = 1000;

/// Minimum score of tiers 1 through 5.
pub const TIER_THRESHOLDS: [u32; 5] = [0, 50, 150, 300, 500];

/// Ordinal skill band 1..=5, always derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Tier(u8);

impl Tier {
    pub const MIN: Tier = Tier(1);
    pub const MAX: Tier = Tier(5);

    pub fn from_number(n: u8) -> anyhow::Result<Self> {
        if !(1..=5).contains(&n) {
            anyhow::bail!("invalid tier {n}: must be between 1 and 5");
        }
        Ok(Tier(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Lowest score that belongs to this tier.
    pub fn threshold(self) -> u32 {
        TIER_THRESHOLDS[usize::from(self.0 - 1)]
    }

    pub fn next(self) -> Option<Tier> {
        (self < Self::MAX).then(|| Tier(self.0 + 1))
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            1 => "Beginner",
            2 => "Fundamental",
            3 => "Intermediate",
            4 => "Advanced",
            _ => "Expert",
        }
    }

    pub fn description(self) -> &'static str {
        match self.0 {
            1 => "Laying the foundation",
            2 => "Building good habits",
            3 => "Developing consistency & control",
            4 => "Expanding technique & expression",
            _ => "Refining and mastering the craft",
        }
    }

    pub fn all() -> impl Iterator<Item = Tier> {
        (1..=5).map(Tier)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {}", self.0)
    }
}

pub fn tier_of(score: u32) -> Tier {
    let index = TIER_THRESHOLDS
        .iter()
        .rposition(|&threshold| score >= threshold)
        .unwrap_or(0);
    Tier(index as u8 + 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rating {
    Hard,
    JustRight,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 3] = [Rating::Hard, Rating::JustRight, Rating::Easy];

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hard" => Ok(Self::Hard),
            "justright" | "just-right" | "right" => Ok(Self::JustRight),
            "easy" => Ok(Self::Easy),
            _ => anyhow::bail!("invalid rating '{s}': must be hard, justRight, or easy"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::JustRight => "justRight",
            Self::Easy => "easy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hard => "Too Hard (-3)",
            Self::JustRight => "Just Right (+2)",
            Self::Easy => "Too Easy (+5)",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score after one difficulty rating. Both bounds are absorbing.
pub fn apply_feedback(score: u32, rating: Rating) -> u32 {
    match rating {
        Rating::Hard => score.saturating_sub(3),
        Rating::JustRight => (score + 2).min(MAX_MASTERY_SCORE),
        Rating::Easy => (score + 5).min(MAX_MASTERY_SCORE),
    }
}

/// One score per skill area; every area is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillScores(BTreeMap<SkillArea, u32>);

impl Default for SkillScores {
    fn default() -> Self {
        Self(SkillArea::ALL.iter().map(|&a| (a, 0)).collect())
    }
}

impl SkillScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, area: SkillArea) -> u32 {
        self.0.get(&area).copied().unwrap_or(0)
    }

    pub fn set(&mut self, area: SkillArea, score: u32) {
        self.0.insert(area, score.min(MAX_MASTERY_SCORE));
    }

    pub fn tier(&self, area: SkillArea) -> Tier {
        tier_of(self.get(area))
    }

    pub fn apply(&mut self, area: SkillArea, rating: Rating) -> u32 {
        let updated = apply_feedback(self.get(area), rating);
        self.set(area, updated);
        updated
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillArea, u32)> + '_ {
        self.0.iter().map(|(&a, &s)| (a, s))
    }

    /// True once any area has moved off zero.
    pub fn has_progress(&self) -> bool {
        self.0.values().any(|&s| s > 0)
    }

    /// Lenient construction from stored JSON: unknown keys are ignored,
    /// non-numeric values count as zero, numbers are clamped into range.
    pub fn from_json_map(raw: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut scores = Self::new();
        for (key, value) in raw {
            let Ok(area) = SkillArea::parse(key) else {
                continue;
            };
            let score = value
                .as_f64()
                .map(|n| n.clamp(0.0, f64::from(MAX_MASTERY_SCORE)).round() as u32)
                .unwrap_or(0);
            scores.set(area, score);
        }
        scores
    }
}

impl<'de> Deserialize<'de> for SkillScores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_json_map(&raw))
    }
}
