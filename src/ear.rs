//! Interval, pitch and rhythm drills.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::audio::AudioPlayer;

pub const BASE_NOTE: &str = "C4";
pub const INTERVAL_OPTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub name: &'static str,
    pub semitones: u8,
    /// Upper note when played from C4.
    pub note: &'static str,
}

pub const INTERVALS: [Interval; 6] = [
    Interval { name: "Major 2nd", semitones: 2, note: "D4" },
    Interval { name: "Major 3rd", semitones: 4, note: "E4" },
    Interval { name: "Perfect 4th", semitones: 5, note: "F4" },
    Interval { name: "Perfect 5th", semitones: 7, note: "G4" },
    Interval { name: "Major 6th", semitones: 9, note: "A4" },
    Interval { name: "Octave", semitones: 12, note: "C5" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Note {
    pub name: &'static str,
    pub note: &'static str,
}

pub const NOTES: [Note; 12] = [
    Note { name: "C", note: "C4" },
    Note { name: "C#", note: "C#4" },
    Note { name: "D", note: "D4" },
    Note { name: "D#", note: "D#4" },
    Note { name: "E", note: "E4" },
    Note { name: "F", note: "F4" },
    Note { name: "F#", note: "F#4" },
    Note { name: "G", note: "G4" },
    Note { name: "G#", note: "G#4" },
    Note { name: "A", note: "A4" },
    Note { name: "A#", note: "A#4" },
    Note { name: "B", note: "B4" },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { answer: &'static str },
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }

    pub fn message(&self) -> String {
        match self {
            Self::Correct => "Correct!".to_string(),
            Self::Incorrect { answer } => format!("Incorrect. That was a {answer}."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalQuestion {
    pub answer: Interval,
    pub base_note: &'static str,
    pub options: Vec<Interval>,
}

impl IntervalQuestion {
    /// Play the question: the base note followed by the answer's upper note.
    pub fn play(&self, audio: &mut dyn AudioPlayer) {
        audio.play_interval(self.base_note, self.answer.note, false);
    }

    /// Judge a guess and play it back so the user hears what they chose.
    pub fn guess(&self, guess: &Interval, audio: &mut dyn AudioPlayer) -> Verdict {
        audio.play_interval(self.base_note, guess.note, false);
        if guess.name == self.answer.name {
            Verdict::Correct
        } else {
            Verdict::Incorrect {
                answer: self.answer.name,
            }
        }
    }
}

/// Pick an interval and `INTERVAL_OPTIONS` distinct choices, shuffled.
pub fn interval_question<R: Rng + ?Sized>(rng: &mut R) -> IntervalQuestion {
    let index = rng.random_range(0..INTERVALS.len());
    let answer = INTERVALS[index];
    let others: Vec<Interval> = INTERVALS
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .map(|(_, &interval)| interval)
        .collect();
    let mut options = vec![answer];
    options.extend(others.choose_multiple(rng, INTERVAL_OPTIONS - 1).copied());
    options.shuffle(rng);
    IntervalQuestion {
        answer,
        base_note: BASE_NOTE,
        options,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchQuestion {
    pub answer: Note,
}

impl PitchQuestion {
    pub fn play(&self, audio: &mut dyn AudioPlayer) {
        audio.play_note(self.answer.note);
    }

    pub fn guess(&self, guess: &Note, audio: &mut dyn AudioPlayer) -> Verdict {
        audio.play_note(guess.note);
        if guess.note == self.answer.note {
            Verdict::Correct
        } else {
            Verdict::Incorrect {
                answer: self.answer.name,
            }
        }
    }
}

pub fn pitch_question<R: Rng + ?Sized>(rng: &mut R) -> PitchQuestion {
    let answer = NOTES[rng.random_range(0..NOTES.len())];
    PitchQuestion { answer }
}

/// Look up a note by name (`F#`) or by pitch (`F#4`), ignoring case.
pub fn find_note(s: &str) -> Option<Note> {
    let s = s.trim();
    NOTES
        .iter()
        .find(|n| n.name.eq_ignore_ascii_case(s) || n.note.eq_ignore_ascii_case(s))
        .copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RhythmCard {
    pub id: &'static str,
    /// Counting syllables; `( )` marks a rest.
    pub notation: &'static str,
}

pub const RHYTHM_TIERS: u8 = 3;

const TIER_1: [RhythmCard; 6] = [
    RhythmCard { id: "t1_1", notation: "1 2 3 4" },
    RhythmCard { id: "t1_2", notation: "1 2 3 + 4" },
    RhythmCard { id: "t1_3", notation: "1 + 2 + 3 4" },
    RhythmCard { id: "t1_4", notation: "1 + 2 + 3 + 4 +" },
    RhythmCard { id: "t1_5", notation: "1 2 + 3 4 +" },
    RhythmCard { id: "t1_6", notation: "1 + 2 3 + 4" },
];

const TIER_2: [RhythmCard; 6] = [
    RhythmCard { id: "t2_1", notation: "1e+a 2 3 4" },
    RhythmCard { id: "t2_2", notation: "1 + 2e+a 3 4" },
    RhythmCard { id: "t2_3", notation: "1 + 2 + 3e+a 4 +" },
    RhythmCard { id: "t2_4", notation: "1e+a 2e+a 3 4" },
    RhythmCard { id: "t2_5", notation: "1e+a 2 + 3e+a 4" },
    RhythmCard { id: "t2_6", notation: "1 +a 2 +a 3 4" },
];

const TIER_3: [RhythmCard; 6] = [
    RhythmCard { id: "t3_1", notation: "(e)+a 2 + 3 4" },
    RhythmCard { id: "t3_2", notation: "1e a 2e a 3 4" },
    RhythmCard { id: "t3_3", notation: "1e+ (a) 2 +a 3 4" },
    RhythmCard { id: "t3_4", notation: "1 + 2 + 3 +a 4e+" },
    RhythmCard { id: "t3_5", notation: "1 ( ) 2 + 3 ( ) 4 +" },
    RhythmCard { id: "t3_6", notation: "1e( )a 2 + (e)+a 4" },
];

pub fn rhythm_tier_name(tier: u8) -> &'static str {
    match tier {
        1 => "Quarters & Eighths",
        2 => "Sixteenths",
        _ => "Syncopation & Rests",
    }
}

/// Flashcards for a rhythm tier (1..=3).
pub fn rhythm_cards(tier: u8) -> anyhow::Result<&'static [RhythmCard]> {
    match tier {
        1 => Ok(&TIER_1),
        2 => Ok(&TIER_2),
        3 => Ok(&TIER_3),
        _ => anyhow::bail!("invalid rhythm tier {tier}: must be between 1 and {RHYTHM_TIERS}"),
    }
}

/// Draws cards from one tier without showing the same card twice in a row.
#[derive(Debug, Clone)]
pub struct RhythmDeck {
    tier: u8,
    cards: &'static [RhythmCard],
    current: Option<usize>,
}

impl RhythmDeck {
    pub fn new(tier: u8) -> anyhow::Result<Self> {
        Ok(Self {
            tier,
            cards: rhythm_cards(tier)?,
            current: None,
        })
    }

    pub fn tier(&self) -> u8 {
        self.tier
    }

    pub fn current(&self) -> Option<&RhythmCard> {
        self.current.map(|i| &self.cards[i])
    }

    /// Switch tiers; the current card is dropped since it belongs to the old tier.
    pub fn set_tier(&mut self, tier: u8) -> anyhow::Result<()> {
        if tier != self.tier {
            self.cards = rhythm_cards(tier)?;
            self.tier = tier;
            self.current = None;
        }
        Ok(())
    }

    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RhythmCard {
        let mut index = rng.random_range(0..self.cards.len());
        if self.current == Some(index) && self.cards.len() > 1 {
            index = (index + 1) % self.cards.len();
        }
        self.current = Some(index);
        self.cards[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn interval_options_are_distinct_and_contain_answer() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let q = interval_question(&mut rng);
            assert_eq!(q.options.len(), INTERVAL_OPTIONS);
            assert!(q.options.contains(&q.answer));
            for (i, a) in q.options.iter().enumerate() {
                for b in &q.options[i + 1..] {
                    assert_ne!(a.name, b.name);
                }
            }
            assert_eq!(q.base_note, "C4");
        }
    }

    #[test]
    fn every_interval_is_eventually_asked() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(interval_question(&mut rng).answer.name);
        }
        assert_eq!(seen.len(), INTERVALS.len());
    }

    #[test]
    fn interval_guess_plays_guessed_note() {
        let q = IntervalQuestion {
            answer: INTERVALS[3],
            base_note: BASE_NOTE,
            options: vec![INTERVALS[3], INTERVALS[0], INTERVALS[5]],
        };
        let mut audio = RecordingAudio::default();
        let verdict = q.guess(&INTERVALS[5], &mut audio);
        assert_eq!(verdict, Verdict::Incorrect { answer: "Perfect 5th" });
        assert_eq!(verdict.message(), "Incorrect. That was a Perfect 5th.");
        assert_eq!(audio.tones, vec![(261.63, 0.5), (523.25, 0.5)]);
        assert!(q.guess(&INTERVALS[3], &mut audio).is_correct());
    }

    #[test]
    fn pitch_guess_by_identity() {
        let q = PitchQuestion { answer: NOTES[6] };
        let mut audio = RecordingAudio::default();
        assert_eq!(
            q.guess(&NOTES[7], &mut audio),
            Verdict::Incorrect { answer: "F#" }
        );
        assert!(q.guess(&find_note("f#4").unwrap(), &mut audio).is_correct());
        assert_eq!(audio.tones.len(), 2);
        assert_eq!(audio.tones[0].0, 392.0);
    }

    #[test]
    fn find_note_by_name_or_pitch() {
        assert_eq!(find_note("a#").unwrap().note, "A#4");
        assert_eq!(find_note(" C4 ").unwrap().name, "C");
        assert!(find_note("H").is_none());
    }

    #[test]
    fn pitch_questions_stay_in_octave() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let q = pitch_question(&mut rng);
            assert!(NOTES.contains(&q.answer));
        }
    }

    #[test]
    fn rhythm_deck_never_repeats_back_to_back() {
        let mut rng = StdRng::seed_from_u64(42);
        for tier in 1..=RHYTHM_TIERS {
            let mut deck = RhythmDeck::new(tier).unwrap();
            let mut previous = deck.draw(&mut rng);
            for _ in 0..300 {
                let card = deck.draw(&mut rng);
                assert_ne!(card.id, previous.id);
                assert_eq!(deck.current(), Some(&card));
                previous = card;
            }
        }
    }

    #[test]
    fn rhythm_tier_change_resets_card() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut deck = RhythmDeck::new(1).unwrap();
        deck.draw(&mut rng);
        deck.set_tier(3).unwrap();
        assert_eq!(deck.tier(), 3);
        assert!(deck.current().is_none());
        assert!(deck.draw(&mut rng).id.starts_with("t3_"));
        assert!(deck.set_tier(4).is_err());
        assert!(RhythmDeck::new(0).is_err());
    }

    #[test]
    fn every_tier_has_six_cards() {
        for tier in 1..=RHYTHM_TIERS {
            assert_eq!(rhythm_cards(tier).unwrap().len(), 6);
        }
    }
}
