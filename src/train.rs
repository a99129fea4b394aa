use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use rand::Rng;

use bandpractice::audio::AudioPlayer;
use bandpractice::ear::{
    find_note, interval_question, pitch_question, rhythm_tier_name, RhythmDeck, NOTES,
};

/// Correct answers out of questions answered.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: u32,
    pub answered: u32,
}

impl Tally {
    fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Prompt and read one trimmed line; `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;
    let mut line = String::new();
    let n = input.read_line(&mut line).context("failed to read stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_quit(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit")
}

pub fn intervals<R: BufRead, W: Write, G: Rng>(
    mut input: R,
    out: &mut W,
    audio: &mut dyn AudioPlayer,
    rng: &mut G,
) -> Result<Tally> {
    let mut tally = Tally::default();
    writeln!(out, "Name the interval above C4. r replays, q quits.")?;
    loop {
        let question = interval_question(rng);
        question.play(audio);
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, option.name)?;
        }
        loop {
            let Some(answer) = prompt(&mut input, out, "> ")? else {
                return Ok(tally);
            };
            if is_quit(&answer) {
                return Ok(tally);
            }
            if answer.eq_ignore_ascii_case("r") {
                question.play(audio);
                continue;
            }
            let choice = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| question.options.get(i));
            let Some(guess) = choice else {
                writeln!(out, "Pick 1-{}.", question.options.len())?;
                continue;
            };
            let verdict = question.guess(guess, audio);
            tally.record(verdict.is_correct());
            writeln!(out, "{}", verdict.message())?;
            break;
        }
    }
}

pub fn pitch<R: BufRead, W: Write, G: Rng>(
    mut input: R,
    out: &mut W,
    audio: &mut dyn AudioPlayer,
    rng: &mut G,
) -> Result<Tally> {
    let mut tally = Tally::default();
    let names: Vec<&str> = NOTES.iter().map(|n| n.name).collect();
    writeln!(out, "Name the note ({}). r replays, q quits.", names.join(" "))?;
    loop {
        let question = pitch_question(rng);
        question.play(audio);
        loop {
            let Some(answer) = prompt(&mut input, out, "> ")? else {
                return Ok(tally);
            };
            if is_quit(&answer) {
                return Ok(tally);
            }
            if answer.eq_ignore_ascii_case("r") {
                question.play(audio);
                continue;
            }
            let Some(guess) = find_note(&answer) else {
                writeln!(out, "Unknown note '{answer}'.")?;
                continue;
            };
            let verdict = question.guess(&guess, audio);
            tally.record(verdict.is_correct());
            writeln!(out, "{}", verdict.message())?;
            break;
        }
    }
}

/// Flip through rhythm cards. Enter draws the next card, `t N` switches tier.
pub fn rhythm<R: BufRead, W: Write, G: Rng>(
    mut input: R,
    out: &mut W,
    tier: u8,
    rng: &mut G,
) -> Result<u32> {
    let mut deck = RhythmDeck::new(tier)?;
    let mut shown = 0;
    writeln!(out, "Clap or count each rhythm. Enter for the next card, t N changes tier, q quits.")?;
    loop {
        let card = deck.draw(rng);
        shown += 1;
        writeln!(
            out,
            "[Tier {}: {}]  {}",
            deck.tier(),
            rhythm_tier_name(deck.tier()),
            card.notation
        )?;
        loop {
            let Some(answer) = prompt(&mut input, out, "> ")? else {
                return Ok(shown);
            };
            if is_quit(&answer) {
                return Ok(shown);
            }
            if let Some(rest) = answer.strip_prefix('t') {
                match rest.trim().parse::<u8>().map_err(anyhow::Error::from).and_then(|t| deck.set_tier(t)) {
                    Ok(()) => break,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                }
            }
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandpractice::audio::RecordingAudio;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    #[test]
    fn intervals_counts_answers() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut audio = RecordingAudio::default();
        let mut out = Vec::new();
        let tally = intervals(Cursor::new("1\nr\n2\nx\n3\nq\n"), &mut out, &mut audio, &mut rng).unwrap();
        assert_eq!(tally.answered, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Pick 1-3."));
        assert_eq!(text.matches("Correct!").count() as u32, tally.correct);
    }

    #[test]
    fn pitch_stops_at_end_of_input() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut audio = RecordingAudio::default();
        let mut out = Vec::new();
        let tally = pitch(Cursor::new("C\nzz\nF#\n"), &mut out, &mut audio, &mut rng).unwrap();
        assert_eq!(tally.answered, 2);
        assert!(String::from_utf8(out).unwrap().contains("Unknown note 'zz'."));
        // question, guess, question, guess, question
        assert_eq!(audio.tones.len(), 5);
    }

    #[test]
    fn rhythm_switches_tier() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut out = Vec::new();
        let shown = rhythm(Cursor::new("\nt 3\nt 9\nq\n"), &mut out, 1, &mut rng).unwrap();
        assert_eq!(shown, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[Tier 1: Quarters & Eighths]"));
        assert!(text.contains("[Tier 3: Syncopation & Rests]"));
        assert!(text.contains("invalid rhythm tier 9"));
    }
}
