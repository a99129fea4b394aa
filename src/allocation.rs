use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::model::{Family, FocusArea, Instrument, SkillArea};

/// Share of the session given to a focused skill area.
pub const FOCUS_SHARE: f64 = 0.40;

const EPSILON: f64 = 1e-12;

/// Raw wind weights before instrument adjustments.
const WIND_WEIGHTS: [(SkillArea, f64); 7] = [
    (SkillArea::LongTones, 0.12),
    (SkillArea::Flexibility, 0.13),
    (SkillArea::Scales, 0.15),
    (SkillArea::Articulation, 0.15),
    (SkillArea::Range, 0.15),
    (SkillArea::Improvisation, 0.30),
    (SkillArea::Repertoire, 0.0),
];

/// Raw percussion weights. They sum to 1.25 before zeroing; normalization
/// takes care of whatever remains.
const PERCUSSION_WEIGHTS: [(SkillArea, f64); 9] = [
    (SkillArea::SingleStrokes, 0.0625),
    (SkillArea::DoubleStrokes, 0.0625),
    (SkillArea::Paradiddles, 0.0625),
    (SkillArea::Flams, 0.0625),
    (SkillArea::StickControl, 0.25),
    (SkillArea::BassUnisons, 0.25),
    (SkillArea::MalletControl, 0.25),
    (SkillArea::Reading, 0.25),
    (SkillArea::Repertoire, 0.0),
];

/// Where an unsupported area's weight goes instead of being dropped.
const WIND_REDIRECTS: [(SkillArea, SkillArea); 1] = [(SkillArea::Improvisation, SkillArea::Scales)];
const NO_REDIRECTS: [(SkillArea, SkillArea); 0] = [];

/// Fraction of session time per skill area, in the family's canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationMap {
    shares: Vec<(SkillArea, f64)>,
}

impl AllocationMap {
    fn zeroed(family: Family) -> Self {
        Self {
            shares: family.areas().iter().map(|&a| (a, 0.0)).collect(),
        }
    }

    pub fn get(&self, area: SkillArea) -> f64 {
        self.shares
            .iter()
            .find(|(a, _)| *a == area)
            .map(|&(_, share)| share)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillArea, f64)> + '_ {
        self.shares.iter().copied()
    }

    pub fn total(&self) -> f64 {
        self.shares.iter().map(|(_, s)| s).sum()
    }

    /// No area receives any time; sessions built from this are empty.
    pub fn is_degenerate(&self) -> bool {
        self.total() <= EPSILON
    }

    fn set(&mut self, area: SkillArea, share: f64) {
        if let Some(slot) = self.shares.iter_mut().find(|(a, _)| *a == area) {
            slot.1 = share;
        }
    }

    fn normalize(&mut self) {
        let total = self.total();
        if total > EPSILON {
            for (_, share) in &mut self.shares {
                *share /= total;
            }
        }
    }
}

impl Serialize for AllocationMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.shares.len()))?;
        for (area, share) in &self.shares {
            map.serialize_entry(area.id(), share)?;
        }
        map.end()
    }
}

/// The instrument's balanced time split, normalized to sum to 1.
pub fn base_allocation(instrument: Instrument) -> AllocationMap {
    let family = instrument.family();
    let (weights, redirects): (&[(SkillArea, f64)], &[(SkillArea, SkillArea)]) =
        if family.is_wind() {
            (&WIND_WEIGHTS[..], &WIND_REDIRECTS[..])
        } else {
            (&PERCUSSION_WEIGHTS[..], &NO_REDIRECTS[..])
        };

    let mut map = AllocationMap::zeroed(family);
    for &(area, weight) in weights {
        if instrument.allocates(area) {
            map.set(area, map.get(area) + weight);
        } else if let Some(&(_, to)) = redirects.iter().find(|(from, _)| *from == area) {
            map.set(to, map.get(to) + weight);
        }
    }
    map.normalize();
    map
}

/// Time split for a session with the given focus.
///
/// A focus area the instrument does not practice yields a degenerate map,
/// which the session builder turns into an empty session.
pub fn allocate(instrument: Instrument, focus: FocusArea) -> AllocationMap {
    let base = base_allocation(instrument);
    let allocation = match focus {
        FocusArea::Balanced => base,
        FocusArea::Repertoire => {
            let mut map = AllocationMap::zeroed(instrument.family());
            map.set(SkillArea::Repertoire, 1.0);
            map
        }
        FocusArea::Area(area) if !instrument.uses(area) => {
            log::debug!("focus '{area}' is not practiced on {instrument}; nothing to allocate");
            AllocationMap::zeroed(instrument.family())
        }
        FocusArea::Area(area) => {
            let remaining = 1.0 - base.get(area);
            let scale = if remaining > EPSILON {
                (1.0 - FOCUS_SHARE) / remaining
            } else {
                0.0
            };
            let mut map = base.clone();
            for (a, share) in &mut map.shares {
                *share = if *a == area { FOCUS_SHARE } else { *share * scale };
            }
            map
        }
    };
    log::debug!("allocation for {instrument} ({focus}): {allocation:?}");
    allocation
}
