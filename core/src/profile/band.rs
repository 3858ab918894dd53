use crate::prelude::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Radio band measured by the test instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Gsm900,
    Gsm1800,
    Wcdma1,
    Wcdma8,
    Lte1,
    Lte3,
    Lte7,
    Lte20,
}

impl Band {
    pub const COUNT: usize = 8;

    pub const ALL: [Band; Band::COUNT] = [
        Band::Gsm900,
        Band::Gsm1800,
        Band::Wcdma1,
        Band::Wcdma8,
        Band::Lte1,
        Band::Lte3,
        Band::Lte7,
        Band::Lte20,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Band::Gsm900 => "gsm900",
            Band::Gsm1800 => "gsm1800",
            Band::Wcdma1 => "wcdma1",
            Band::Wcdma8 => "wcdma8",
            Band::Lte1 => "lte1",
            Band::Lte3 => "lte3",
            Band::Lte7 => "lte7",
            Band::Lte20 => "lte20",
        }
    }

    pub const fn group(self) -> BandGroup {
        match self {
            Band::Gsm900 | Band::Gsm1800 | Band::Wcdma1 | Band::Wcdma8 => BandGroup::Base,
            Band::Lte1 | Band::Lte3 | Band::Lte7 | Band::Lte20 => BandGroup::Lte,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Band {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::ALL
            .iter()
            .copied()
            .find(|band| band.name() == s)
            .ok_or_else(|| CoreError::UnknownBandKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Tx, Direction::Rx];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Tx => "tx",
            Direction::Rx => "rx",
        }
    }
}

/// Channel position inside a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Low,
    Mid,
    High,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Low, Channel::Mid, Channel::High];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A (band, direction) pair, the unit compensations and spreads are addressed by.
///
/// The external string form is `<band>_<direction>`, e.g. `wcdma1_tx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BandKey {
    pub band: Band,
    pub direction: Direction,
}

impl BandKey {
    pub const fn new(band: Band, direction: Direction) -> Self {
        Self { band, direction }
    }

    pub fn all() -> impl Iterator<Item = BandKey> {
        Band::ALL.into_iter().flat_map(|band| {
            Direction::ALL
                .into_iter()
                .map(move |direction| BandKey::new(band, direction))
        })
    }
}

impl fmt::Display for BandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.band.name(), self.direction.name())
    }
}

impl FromStr for BandKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CoreError::UnknownBandKey(s.to_string());
        let (band, direction) = s.rsplit_once('_').ok_or_else(unknown)?;
        let band = band.parse::<Band>().map_err(|_| unknown())?;
        let direction = match direction {
            "tx" => Direction::Tx,
            "rx" => Direction::Rx,
            _ => return Err(unknown()),
        };
        Ok(Self::new(band, direction))
    }
}

impl TryFrom<String> for BandKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BandKey> for String {
    fn from(key: BandKey) -> Self {
        key.to_string()
    }
}

/// How a group's combined spread picks its divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisorPolicy {
    /// Divide by three times the number of bands that have usable data.
    UsableBands,
    /// Divide by three times every band of the group once any band has usable data.
    AllBands,
}

/// Bands whose spreads are combined into one scalar per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandGroup {
    Base,
    Lte,
}

impl BandGroup {
    pub const fn bands(self) -> &'static [Band] {
        match self {
            BandGroup::Base => &[Band::Gsm900, Band::Gsm1800, Band::Wcdma1, Band::Wcdma8],
            BandGroup::Lte => &[Band::Lte1, Band::Lte3, Band::Lte7, Band::Lte20],
        }
    }

    // The LTE divisor ignores how many bands carried data. Kept for
    // compatibility with existing profile ratings even though it looks accidental.
    pub const fn divisor(self) -> DivisorPolicy {
        match self {
            BandGroup::Base => DivisorPolicy::UsableBands,
            BandGroup::Lte => DivisorPolicy::AllBands,
        }
    }
}

/// Instrument band family: the four base bands, or those plus four LTE bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandFamily {
    Standard,
    Lte,
}

impl BandFamily {
    pub const fn groups(self) -> &'static [BandGroup] {
        match self {
            BandFamily::Standard => &[BandGroup::Base],
            BandFamily::Lte => &[BandGroup::Base, BandGroup::Lte],
        }
    }

    pub fn bands(self) -> impl Iterator<Item = Band> {
        self.groups()
            .iter()
            .flat_map(|group| group.bands().iter().copied())
    }

    pub fn contains(self, band: Band) -> bool {
        self.groups().contains(&band.group())
    }
}

impl fmt::Display for BandFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandFamily::Standard => f.write_str("standard"),
            BandFamily::Lte => f.write_str("lte"),
        }
    }
}
