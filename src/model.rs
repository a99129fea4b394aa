use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Brass,
    Woodwind,
    Percussion,
}

const BRASS: [Instrument; 6] = [
    Instrument::Trumpet,
    Instrument::FrenchHorn,
    Instrument::Mellophone,
    Instrument::Trombone,
    Instrument::Baritone,
    Instrument::Tuba,
];

const WOODWIND: [Instrument; 5] = [
    Instrument::Flute,
    Instrument::Clarinet,
    Instrument::Saxophone,
    Instrument::Oboe,
    Instrument::Bassoon,
];

const PERCUSSION: [Instrument; 5] = [
    Instrument::Snare,
    Instrument::Tenors,
    Instrument::BassDrum,
    Instrument::Mallets,
    Instrument::ConcertPerc,
];

/// Canonical ordering of the wind vocabulary. Session entries follow it.
pub const WIND_AREAS: [SkillArea; 7] = [
    SkillArea::LongTones,
    SkillArea::Flexibility,
    SkillArea::Scales,
    SkillArea::Articulation,
    SkillArea::Range,
    SkillArea::Improvisation,
    SkillArea::Repertoire,
];

/// Canonical ordering of the percussion vocabulary.
pub const PERCUSSION_AREAS: [SkillArea; 9] = [
    SkillArea::SingleStrokes,
    SkillArea::DoubleStrokes,
    SkillArea::Paradiddles,
    SkillArea::Flams,
    SkillArea::StickControl,
    SkillArea::BassUnisons,
    SkillArea::MalletControl,
    SkillArea::Reading,
    SkillArea::Repertoire,
];

impl Family {
    pub const ALL: [Family; 3] = [Family::Brass, Family::Woodwind, Family::Percussion];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Brass => "brass",
            Self::Woodwind => "woodwind",
            Self::Percussion => "percussion",
        }
    }

    pub fn instruments(self) -> &'static [Instrument] {
        match self {
            Self::Brass => &BRASS,
            Self::Woodwind => &WOODWIND,
            Self::Percussion => &PERCUSSION,
        }
    }

    /// Brass and woodwind share one skill vocabulary.
    pub fn is_wind(self) -> bool {
        matches!(self, Self::Brass | Self::Woodwind)
    }

    /// Every skill area of the family's vocabulary, in canonical order.
    pub fn areas(self) -> &'static [SkillArea] {
        if self.is_wind() {
            &WIND_AREAS
        } else {
            &PERCUSSION_AREAS
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Instrument {
    Trumpet,
    FrenchHorn,
    Mellophone,
    Trombone,
    Baritone,
    Tuba,
    Flute,
    Clarinet,
    Saxophone,
    Oboe,
    Bassoon,
    Snare,
    Tenors,
    BassDrum,
    Mallets,
    ConcertPerc,
}

impl Instrument {
    pub const ALL: [Instrument; 16] = [
        Self::Trumpet,
        Self::FrenchHorn,
        Self::Mellophone,
        Self::Trombone,
        Self::Baritone,
        Self::Tuba,
        Self::Flute,
        Self::Clarinet,
        Self::Saxophone,
        Self::Oboe,
        Self::Bassoon,
        Self::Snare,
        Self::Tenors,
        Self::BassDrum,
        Self::Mallets,
        Self::ConcertPerc,
    ];

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|i| i.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let ids: Vec<&str> = Self::ALL.iter().map(|i| i.id()).collect();
                anyhow::anyhow!("unknown instrument '{s}': must be one of {}", ids.join(", "))
            })
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Trumpet => "trumpet",
            Self::FrenchHorn => "frenchHorn",
            Self::Mellophone => "mellophone",
            Self::Trombone => "trombone",
            Self::Baritone => "baritone",
            Self::Tuba => "tuba",
            Self::Flute => "flute",
            Self::Clarinet => "clarinet",
            Self::Saxophone => "saxophone",
            Self::Oboe => "oboe",
            Self::Bassoon => "bassoon",
            Self::Snare => "snare",
            Self::Tenors => "tenors",
            Self::BassDrum => "bassDrum",
            Self::Mallets => "mallets",
            Self::ConcertPerc => "concertPerc",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Trumpet => "Trumpet",
            Self::FrenchHorn => "French Horn",
            Self::Mellophone => "Mellophone",
            Self::Trombone => "Trombone",
            Self::Baritone => "Baritone/Euph",
            Self::Tuba => "Tuba/Sousa",
            Self::Flute => "Flute",
            Self::Clarinet => "Clarinet",
            Self::Saxophone => "Saxophone",
            Self::Oboe => "Oboe",
            Self::Bassoon => "Bassoon",
            Self::Snare => "Snare (Battery)",
            Self::Tenors => "Tenors (Battery)",
            Self::BassDrum => "Bass Drum (Battery)",
            Self::Mallets => "Mallets (Pit)",
            Self::ConcertPerc => "Concert Perc.",
        }
    }

    pub fn family(self) -> Family {
        match self {
            Self::Trumpet
            | Self::FrenchHorn
            | Self::Mellophone
            | Self::Trombone
            | Self::Baritone
            | Self::Tuba => Family::Brass,
            Self::Flute | Self::Clarinet | Self::Saxophone | Self::Oboe | Self::Bassoon => {
                Family::Woodwind
            }
            Self::Snare | Self::Tenors | Self::BassDrum | Self::Mallets | Self::ConcertPerc => {
                Family::Percussion
            }
        }
    }

    pub fn supports_improvisation(self) -> bool {
        matches!(self, Self::Trumpet | Self::Saxophone | Self::Trombone)
    }

    /// Whether this instrument practices `area` as a focus and placement
    /// area. Session time follows [`Instrument::allocates`] instead.
    pub fn uses(self, area: SkillArea) -> bool {
        use SkillArea::*;
        match area {
            Repertoire => true,
            LongTones | Flexibility | Scales | Articulation | Range => self.family().is_wind(),
            Improvisation => self.supports_improvisation(),
            SingleStrokes | DoubleStrokes | Paradiddles | Flams => {
                matches!(self, Self::Snare | Self::Tenors | Self::ConcertPerc)
            }
            StickControl => matches!(self, Self::Snare | Self::Tenors | Self::BassDrum),
            BassUnisons => self == Self::BassDrum,
            MalletControl => matches!(self, Self::Mallets | Self::ConcertPerc),
            Reading => self.family() == Family::Percussion,
        }
    }

    /// Whether a balanced session gives `area` any time on this instrument.
    /// Concert percussion gets stick control here even though it is not one
    /// of its focus or placement areas.
    pub fn allocates(self, area: SkillArea) -> bool {
        self.uses(area) || (self == Self::ConcertPerc && area == SkillArea::StickControl)
    }

    /// Areas this instrument practices, excluding repertoire, in canonical order.
    pub fn supported_areas(self) -> Vec<SkillArea> {
        self.family()
            .areas()
            .iter()
            .copied()
            .filter(|&a| a != SkillArea::Repertoire && self.uses(a))
            .collect()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillArea {
    LongTones,
    Flexibility,
    Scales,
    Articulation,
    Range,
    Improvisation,
    Repertoire,
    SingleStrokes,
    DoubleStrokes,
    Paradiddles,
    Flams,
    StickControl,
    BassUnisons,
    MalletControl,
    Reading,
}

impl SkillArea {
    pub const ALL: [SkillArea; 15] = [
        Self::LongTones,
        Self::Flexibility,
        Self::Scales,
        Self::Articulation,
        Self::Range,
        Self::Improvisation,
        Self::Repertoire,
        Self::SingleStrokes,
        Self::DoubleStrokes,
        Self::Paradiddles,
        Self::Flams,
        Self::StickControl,
        Self::BassUnisons,
        Self::MalletControl,
        Self::Reading,
    ];

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let ids: Vec<&str> = Self::ALL.iter().map(|a| a.id()).collect();
                anyhow::anyhow!("unknown skill area '{s}': must be one of {}", ids.join(", "))
            })
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::LongTones => "longTones",
            Self::Flexibility => "flexibility",
            Self::Scales => "scales",
            Self::Articulation => "articulation",
            Self::Range => "range",
            Self::Improvisation => "improvisation",
            Self::Repertoire => "repertoire",
            Self::SingleStrokes => "singleStrokes",
            Self::DoubleStrokes => "doubleStrokes",
            Self::Paradiddles => "paradiddles",
            Self::Flams => "flams",
            Self::StickControl => "stickControl",
            Self::BassUnisons => "bassUnisons",
            Self::MalletControl => "malletControl",
            Self::Reading => "reading",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::LongTones => "Long Tones",
            Self::Flexibility => "Flexibility",
            Self::Scales => "Scales",
            Self::Articulation => "Articulation",
            Self::Range => "Range",
            Self::Improvisation => "Improvisation",
            Self::Repertoire => "Repertoire",
            Self::SingleStrokes => "Single Strokes",
            Self::DoubleStrokes => "Double Strokes",
            Self::Paradiddles => "Paradiddles",
            Self::Flams => "Flams",
            Self::StickControl => "Stick Control",
            Self::BassUnisons => "Unisons/Splits",
            Self::MalletControl => "Mallet Control",
            Self::Reading => "Reading",
        }
    }
}

impl fmt::Display for SkillArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The user's chosen emphasis for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FocusArea {
    #[default]
    Balanced,
    Repertoire,
    Area(SkillArea),
}

impl FocusArea {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        if s.eq_ignore_ascii_case("balanced") {
            return Ok(Self::Balanced);
        }
        match SkillArea::parse(s) {
            Ok(area) => Ok(Self::from(area)),
            Err(_) => anyhow::bail!(
                "invalid focus '{s}': must be balanced, repertoire, or a skill area"
            ),
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Repertoire => "repertoire",
            Self::Area(area) => area.id(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Repertoire => "Repertoire",
            Self::Area(area) => area.title(),
        }
    }

    /// The specific skill area being emphasised, if any.
    pub fn area(self) -> Option<SkillArea> {
        match self {
            Self::Area(area) => Some(area),
            _ => None,
        }
    }
}

impl From<SkillArea> for FocusArea {
    fn from(area: SkillArea) -> Self {
        if area == SkillArea::Repertoire {
            Self::Repertoire
        } else {
            Self::Area(area)
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for FocusArea {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

/// Focus choices offered for an instrument: balanced, repertoire, then
/// every supported area.
pub fn focus_options(instrument: Instrument) -> Vec<FocusArea> {
    let mut options = vec![FocusArea::Balanced, FocusArea::Repertoire];
    options.extend(instrument.supported_areas().into_iter().map(FocusArea::Area));
    options
}
