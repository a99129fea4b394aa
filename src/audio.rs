use std::io::Write;
use std::time::Duration;

/// Metronome click pitch.
pub const CLICK_HZ: f64 = 880.0;
pub const CLICK_SECS: f64 = 0.05;
pub const NOTE_SECS: f64 = 0.5;
/// Gap before the second note of a melodic interval.
pub const MELODIC_DELAY_SECS: f64 = 0.6;

/// Fallback pitch for unknown note names.
pub const A4_HZ: f64 = 440.0;

const NOTE_TABLE: [(&str, f64); 13] = [
    ("C4", 261.63),
    ("C#4", 277.18),
    ("D4", 293.66),
    ("D#4", 311.13),
    ("E4", 329.63),
    ("F4", 349.23),
    ("F#4", 369.99),
    ("G4", 392.00),
    ("G#4", 415.30),
    ("A4", 440.00),
    ("A#4", 466.16),
    ("B4", 493.88),
    ("C5", 523.25),
];

pub fn note_frequency(note: &str) -> f64 {
    NOTE_TABLE
        .iter()
        .find(|(name, _)| *name == note)
        .map(|&(_, hz)| hz)
        .unwrap_or(A4_HZ)
}

/// Sound output used by the runner and the ear trainers. Calls never fail;
/// a player that cannot make sound simply stays quiet.
pub trait AudioPlayer {
    fn play_tone(&mut self, frequency_hz: f64, duration_secs: f64);

    fn play_click(&mut self) {
        self.play_tone(CLICK_HZ, CLICK_SECS);
    }

    fn play_note(&mut self, note: &str) {
        self.play_tone(note_frequency(note), NOTE_SECS);
    }

    /// Two notes, one after the other unless `harmonic`.
    fn play_interval(&mut self, first: &str, second: &str, harmonic: bool) {
        let _ = harmonic;
        self.play_note(first);
        self.play_note(second);
    }
}

/// Rings the terminal bell. Pitches are only visible in the debug log.
pub struct TerminalAudio<W: Write> {
    out: W,
}

impl<W: Write> TerminalAudio<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AudioPlayer for TerminalAudio<W> {
    fn play_tone(&mut self, frequency_hz: f64, duration_secs: f64) {
        log::debug!("tone {frequency_hz:.2} Hz for {duration_secs:.2}s");
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            log::warn!("failed to ring bell: {e}");
        }
    }

    fn play_interval(&mut self, first: &str, second: &str, harmonic: bool) {
        self.play_note(first);
        if !harmonic {
            std::thread::sleep(Duration::from_secs_f64(MELODIC_DELAY_SECS));
        }
        self.play_note(second);
    }
}

#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioPlayer for SilentAudio {
    fn play_tone(&mut self, frequency_hz: f64, duration_secs: f64) {
        log::trace!("muted tone {frequency_hz:.2} Hz for {duration_secs:.2}s");
    }
}

/// Records every tone instead of playing it.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub tones: Vec<(f64, f64)>,
}

impl AudioPlayer for RecordingAudio {
    fn play_tone(&mut self, frequency_hz: f64, duration_secs: f64) {
        self.tones.push((frequency_hz, duration_secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_notes() {
        assert_eq!(note_frequency("C4"), 261.63);
        assert_eq!(note_frequency("C5"), 523.25);
        assert_eq!(note_frequency("A#4"), 466.16);
        assert_eq!(note_frequency("H9"), 440.0);
        assert_eq!(note_frequency(""), 440.0);
    }

    #[test]
    fn click_uses_metronome_pitch() {
        let mut audio = RecordingAudio::default();
        audio.play_click();
        assert_eq!(audio.tones, vec![(880.0, 0.05)]);
    }

    #[test]
    fn interval_plays_both_notes() {
        let mut audio = RecordingAudio::default();
        audio.play_interval("C4", "G4", false);
        assert_eq!(audio.tones, vec![(261.63, 0.5), (392.0, 0.5)]);
    }

    #[test]
    fn terminal_audio_rings_bell() {
        let mut buf = Vec::new();
        {
            let mut audio = TerminalAudio::new(&mut buf);
            audio.play_click();
            audio.play_interval("C4", "E4", true);
        }
        assert_eq!(buf, b"\x07\x07\x07");
    }
}
