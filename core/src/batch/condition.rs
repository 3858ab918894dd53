use crate::batch::spread::SpreadSet;
use crate::prelude::CoreError;
use crate::profile::band::{BandFamily, BandKey, Direction};
use crate::profile::limits::ToleranceProfile;
use serde::{Deserialize, Serialize};

/// Health rating of a calibration target.
///
/// `NoData` is distinct from `Excellent`: it means no band had a usable
/// current-window record. Ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Condition {
    #[default]
    NoData = 0,
    Excellent = 1,
    Good = 2,
    Problematic = 3,
}

impl TryFrom<u8> for Condition {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Condition::NoData),
            1 => Ok(Condition::Excellent),
            2 => Ok(Condition::Good),
            3 => Ok(Condition::Problematic),
            other => Err(CoreError::InvalidCondition(other)),
        }
    }
}

impl From<Condition> for u8 {
    fn from(condition: Condition) -> Self {
        condition as u8
    }
}

/// Classifies one channel spread against a border; a zero border never escalates.
pub fn channel_condition(spread: f64, border: u8) -> Condition {
    if border == 0 {
        return Condition::Excellent;
    }
    let border = f64::from(border);
    if spread > 2.0 * border {
        Condition::Problematic
    } else if spread > border {
        Condition::Good
    } else {
        Condition::Excellent
    }
}

/// Worst channel condition over every usable band of the family.
///
/// Groups are folded in only when they have at least one usable band.
pub fn classify(spreads: &SpreadSet, family: BandFamily, profile: &ToleranceProfile) -> Condition {
    let usable_groups: Vec<_> = family
        .groups()
        .iter()
        .copied()
        .filter(|group| spreads.group_usable(*group))
        .collect();
    if usable_groups.is_empty() {
        return Condition::NoData;
    }

    let mut condition = Condition::Excellent;
    for group in usable_groups {
        for &band in group.bands() {
            if !spreads.is_usable(band) {
                continue;
            }
            let Some(limits) = profile.limits(band) else {
                continue;
            };
            let border = limits.window.border();
            for direction in Direction::ALL {
                for spread in spreads.spread(BandKey::new(band, direction)) {
                    condition = condition.max(channel_condition(spread, border));
                }
            }
        }
    }
    condition
}
