//! Exercise text and suggested tempo for every (area, tier, instrument).
//!
//! Tiers are coarse here: tier 1 has its own material, tiers 2-3 share a
//! band and tiers 4-5 share a band. Lookups are dispatched through a table
//! keyed by skill area; instrument-specific variation lives inside each
//! entry.

use serde::Serialize;

use crate::model::{Family, Instrument, SkillArea};
use crate::skill::Tier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub description: String,
    /// Metronome target; `None` for exercises that should not be paced.
    pub bpm: Option<u32>,
}

impl Exercise {
    fn new(description: impl Into<String>, bpm: Option<u32>) -> Self {
        Self {
            description: description.into(),
            bpm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Foundation,
    Developing,
    Advanced,
}

impl Band {
    pub fn of(tier: Tier) -> Self {
        match tier.number() {
            1 => Self::Foundation,
            2 | 3 => Self::Developing,
            _ => Self::Advanced,
        }
    }
}

type ExerciseFn = fn(Band, Instrument) -> Exercise;

fn dispatch(area: SkillArea) -> Option<ExerciseFn> {
    let f: ExerciseFn = match area {
        SkillArea::LongTones => long_tones,
        SkillArea::Flexibility => flexibility,
        SkillArea::Scales => scales,
        SkillArea::Articulation => articulation,
        SkillArea::Range => range,
        SkillArea::Improvisation => improvisation,
        SkillArea::SingleStrokes => single_strokes,
        SkillArea::DoubleStrokes => double_strokes,
        SkillArea::Paradiddles => paradiddles,
        SkillArea::Flams => flams,
        SkillArea::StickControl => stick_control,
        SkillArea::BassUnisons => bass_unisons,
        SkillArea::MalletControl => mallet_control,
        SkillArea::Reading => reading,
        SkillArea::Repertoire => return None,
    };
    Some(f)
}

/// Default tempo shown with the repertoire exercise.
pub const REPERTOIRE_BPM: u32 = 80;

pub fn repertoire_exercise() -> Exercise {
    Exercise::new(
        "Focus on your own music (e.g., marching show, solo, excerpts).\n\n\
         Use the timer and metronome to structure your practice.",
        Some(REPERTOIRE_BPM),
    )
}

/// Look up the exercise for one skill area.
///
/// # Panics
///
/// Panics when `instrument` gives `area` no time. Allocation never
/// produces such a pair, so reaching it means the tables disagree.
pub fn exercise_for(area: SkillArea, tier: Tier, instrument: Instrument) -> Exercise {
    if area == SkillArea::Repertoire {
        return repertoire_exercise();
    }
    match dispatch(area) {
        Some(f) if instrument.allocates(area) => f(Band::of(tier), instrument),
        _ => panic!("no exercise for area '{area}' on instrument '{instrument}'"),
    }
}

fn long_tones(band: Band, instrument: Instrument) -> Exercise {
    let (first, second) = match instrument {
        Instrument::Flute => ("Bb", "F"),
        Instrument::Clarinet => ("G", "C"),
        Instrument::Saxophone => ("G", "D"),
        Instrument::Trumpet => ("C (Concert Bb)", "G (Concert F)"),
        _ => ("G (Concert C)", "C (Concert F)"),
    };
    match band {
        Band::Foundation => Exercise::new(
            format!(
                "(Tier 1) Play long tones on the first 5 notes of your {first} scale. \
                 Focus on a steady, clear tone."
            ),
            Some(60),
        ),
        Band::Developing => Exercise::new(
            format!(
                "(Tier 2-3) Play long tones on your {second} scale. Perform a \
                 crescendo-decrescendo (p < f > p) over 8 beats for each note."
            ),
            Some(60),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Play a two-octave chromatic scale in whole notes. Perform a \
             pp < ff > pp swell on each note over 8 beats.",
            Some(60),
        ),
    }
}

fn flexibility(band: Band, instrument: Instrument) -> Exercise {
    if instrument.family() == Family::Woodwind {
        let home = if instrument == Instrument::Flute { "F" } else { "G" };
        let scale = if instrument == Instrument::Saxophone { "D" } else { "C" };
        return match band {
            Band::Foundation => Exercise::new(
                format!(
                    "(Tier 1) Practice finger wiggles on your {home} scale. Isolate tricky \
                     finger combinations (e.g., C-D on clarinet)."
                ),
                Some(70),
            ),
            Band::Developing => Exercise::new(
                format!(
                    "(Tier 2-3) Play your {scale} scale, focusing on smooth transitions over \
                     the break (e.g., A-B on clarinet, C#-D on flute)."
                ),
                Some(80),
            ),
            Band::Advanced => Exercise::new(
                "(Tier 4+) Practice trill fingerings. Slowly alternate between notes \
                 (e.g., G-A, F#-G#) for 10 seconds each, keeping hand movement minimal.",
                Some(90),
            ),
        };
    }
    let slur = match instrument {
        Instrument::Trumpet | Instrument::Baritone => "C-G-C",
        _ => "Bb-F-Bb",
    };
    match band {
        Band::Foundation => Exercise::new(
            format!(
                "(Tier 1) Practice simple lip slurs, like {slur}, on all valve/slide \
                 combinations. Start slow, focus on clean transitions."
            ),
            Some(70),
        ),
        Band::Developing => Exercise::new(
            format!(
                "(Tier 2-3) Expand to 5-note slurs (e.g., {slur}-E-G). Perform on all \
                 valve/slide combinations, ascending and descending."
            ),
            Some(80),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Practice extended slurs up the overtone series as high as you \
             can comfortably go.",
            Some(70),
        ),
    }
}

fn scales(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Play your Concert Bb scale, one octave, in quarter notes. \
             Memorize the fingerings before speeding up.",
            Some(70),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Play your Concert Bb and Concert F scales, two octaves if \
             comfortable, in eighth notes.",
            Some(80),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Play your Concert F scale in thirds (e.g., C-E, D-F, E-G...).",
            Some(90),
        ),
    }
}

fn articulation(band: Band, instrument: Instrument) -> Exercise {
    let note = match instrument {
        Instrument::Trumpet | Instrument::Saxophone => "G",
        _ => "C",
    };
    match band {
        Band::Foundation => Exercise::new(
            format!(
                "(Tier 1) Single tonguing: on a single note ({note}), practice crisp \
                 ta-ta-ta-ta articulations as 16th notes."
            ),
            Some(80),
        ),
        Band::Developing => Exercise::new(
            format!(
                "(Tier 2-3) Articulation styles: play a {note} scale legato (dah), \
                 staccato (dit) and marcato (dat)."
            ),
            Some(70),
        ),
        Band::Advanced => Exercise::new(
            format!(
                "(Tier 4+) Double tonguing: on a {note} scale, practice tu-ku-tu-ku in \
                 eighth notes. Strive for an even sound."
            ),
            Some(70),
        ),
    }
}

fn range(band: Band, instrument: Instrument) -> Exercise {
    let upward = instrument.family() == Family::Woodwind || instrument == Instrument::Trumpet;
    match (upward, band) {
        (true, Band::Foundation) => Exercise::new(
            "(Tier 1) High range: practice gentle sirens or octave slurs (e.g., middle C \
             to high C). Focus on fast air, not pressure or biting.",
            None,
        ),
        (true, _) => Exercise::new(
            "(Tier 2+) High range: practice arpeggio expansion (C-E-G-C-G-E-C), moving \
             up by half steps. Stop immediately if you feel strain.",
            Some(70),
        ),
        (false, Band::Foundation) => Exercise::new(
            "(Tier 1) Low range: play a Bb scale descending into the low register. \
             Focus on a relaxed, open embouchure.",
            Some(60),
        ),
        (false, _) => Exercise::new(
            "(Tier 2+) Low range: practice pedal tones. Start on low F and descend \
             chromatically, keeping the aperture open.",
            None,
        ),
    }
}

fn improvisation(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Find a backing track (e.g., Bb blues) and solo using only the \
             first three notes of the blues scale.",
            Some(100),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Over a Bb blues backing track, solo with the full blues scale. \
             Leave space: play two bars, rest two bars.",
            Some(120),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Over a Bb blues backing track, target the third of each chord \
             on beat one and connect the chords with chromatic approach notes.",
            Some(120),
        ),
    }
}

fn single_strokes(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) 8 on a hand: play RRRRRRRR LLLLLLLL. Focus on even heights and sound.",
            Some(100),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Accent grid: play 16th notes moving the accent through 1-e-&-a \
             (R-l-r-l, r-L-r-l...).",
            Some(90),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Timing builder: 1 bar of 8th notes, 1 bar of triplets, 1 bar of \
             16ths. Loop.",
            Some(80),
        ),
    }
}

fn double_strokes(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Slow doubles: play RR LL slowly. Focus on a clean, clear second note.",
            Some(80),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Open roll: play a 5-stroke roll (RRLL R). Speed up while keeping \
             it clean, not buzzed.",
            Some(90),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Triplet diddles: practice RRL RRL LLR LLR. Focus on timing and \
             sound quality.",
            Some(100),
        ),
    }
}

fn paradiddles(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Basic paradiddle: play RLRR LRLL. Go slow and say \"pa-ra-did-dle\".",
            Some(80),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Paradiddle accents: accent the first note (R-lrr L-rll). Keep the \
             other notes low.",
            Some(90),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Paradiddle-diddle: practice RLRRLL LRLLRR, six notes per beat.",
            Some(80),
        ),
    }
}

fn flams(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Basic flams: play lR rL. Keep the grace note tiny and just before \
             the main note.",
            Some(70),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Flam taps: play lR-L-R-L rL-R-L-R. Keep the taps even.",
            Some(80),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Flam drags: practice lR-r-l rL-l-r, a flam followed by a drag.",
            Some(70),
        ),
    }
}

fn bass_unisons(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Unison 8ths: play 8th notes in perfect unison with the metronome. \
             Focus on clean sound and timing.",
            Some(80),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Simple splits: practice 16th-note splits (1-e-&-a). Bass 1 plays \
             '1', bass 2 plays 'e', and so on. Focus on clean hand-to-hand timing.",
            Some(70),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Split roll-offs: run a 16th-note roll-off down the line. Aim for \
             a smooth, even roll sound across the drums.",
            Some(90),
        ),
    }
}

fn stick_control(band: Band, instrument: Instrument) -> Exercise {
    if instrument == Instrument::Tenors {
        return match band {
            Band::Foundation => Exercise::new(
                "(Tier 1) Arounds: practice simple around patterns (drum 1-2-3-4). Focus \
                 on clean wrist turns and moving together.",
                Some(80),
            ),
            _ => Exercise::new(
                "(Tier 2+) Crossovers: practice crossover patterns (right hand over left \
                 to hit the drum). Start slow and build consistency.",
                Some(70),
            ),
        };
    }
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Heights: play 8th notes, left hand at 3\", right hand at 9\". \
             Switch. Focus on control.",
            Some(90),
        ),
        _ => Exercise::new(
            "(Tier 2+) Dynamics: play 16th notes, 4 bars pp, 4 mf, 4 ff, 4 ff > pp. Loop.",
            Some(100),
        ),
    }
}

fn mallet_control(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Scales: play a one-octave C major scale with alternating strokes \
             (R L R L). Strike the center of the bar.",
            Some(100),
        ),
        Band::Developing => Exercise::new(
            "(Tier 2-3) Arpeggios: play C major arpeggios (C-E-G-C) across two octaves. \
             Focus on accuracy.",
            Some(90),
        ),
        Band::Advanced => Exercise::new(
            "(Tier 4+) Double stops: play a C major scale in thirds (C/E, D/F, E/G...), \
             striking both notes at exactly the same time.",
            Some(80),
        ),
    }
}

fn reading(band: Band, _instrument: Instrument) -> Exercise {
    match band {
        Band::Foundation => Exercise::new(
            "(Tier 1) Sight-reading: find a simple rhythm sheet, set the metronome and \
             play. Don't stop for mistakes.",
            Some(80),
        ),
        _ => Exercise::new(
            "(Tier 2+) Sight-reading: find a piece you've never seen and set the \
             metronome. First check it silently, then play it through.",
            Some(90),
        ),
    }
}
