use crate::prelude::{CoreError, CoreResult};
use crate::profile::band::{Band, BandFamily, Direction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance window width selector stored with each band's limits.
///
/// The width doubles as the classification border: narrow windows escalate a
/// channel above 2 dB of spread, wide ones above 3 dB, and the unmarked default
/// width never escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ToleranceWindow {
    Narrow,
    #[default]
    Unmarked,
    Wide,
}

impl ToleranceWindow {
    pub const fn width(self) -> u8 {
        match self {
            ToleranceWindow::Narrow => 5,
            ToleranceWindow::Unmarked => 6,
            ToleranceWindow::Wide => 7,
        }
    }

    /// Spread border used by condition checks; zero disables escalation.
    pub const fn border(self) -> u8 {
        match self {
            ToleranceWindow::Narrow => 2,
            ToleranceWindow::Unmarked => 0,
            ToleranceWindow::Wide => 3,
        }
    }
}

impl TryFrom<u8> for ToleranceWindow {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(ToleranceWindow::Narrow),
            6 => Ok(ToleranceWindow::Unmarked),
            7 => Ok(ToleranceWindow::Wide),
            other => Err(CoreError::InvalidToleranceWidth(other)),
        }
    }
}

impl From<ToleranceWindow> for u8 {
    fn from(window: ToleranceWindow) -> Self {
        window.width()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandLimits {
    pub expected_tx: f64,
    pub expected_rx: f64,
    #[serde(default)]
    pub window: ToleranceWindow,
}

impl BandLimits {
    pub fn new(expected_tx: f64, expected_rx: f64, window: ToleranceWindow) -> Self {
        Self {
            expected_tx,
            expected_rx,
            window,
        }
    }

    pub fn expected(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Tx => self.expected_tx,
            Direction::Rx => self.expected_rx,
        }
    }
}

/// Expected values and tolerance windows for every band of one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceProfile {
    pub family: BandFamily,
    #[serde(default)]
    pub bands: BTreeMap<Band, BandLimits>,
}

impl ToleranceProfile {
    pub fn new(family: BandFamily) -> Self {
        Self {
            family,
            bands: BTreeMap::new(),
        }
    }

    pub fn with_band(mut self, band: Band, limits: BandLimits) -> Self {
        self.bands.insert(band, limits);
        self
    }

    pub fn limits(&self, band: Band) -> Option<&BandLimits> {
        self.bands.get(&band)
    }

    /// Fails when a band of the profile's family has no limits.
    pub fn validate(&self) -> CoreResult<()> {
        match self.family.bands().find(|band| !self.bands.contains_key(band)) {
            Some(band) => Err(CoreError::MissingLimits {
                family: self.family,
                band,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_follows_window_width() {
        assert_eq!(ToleranceWindow::try_from(5).unwrap().border(), 2);
        assert_eq!(ToleranceWindow::try_from(6).unwrap().border(), 0);
        assert_eq!(ToleranceWindow::try_from(7).unwrap().border(), 3);
        assert!(ToleranceWindow::try_from(4).is_err());
    }

    #[test]
    fn validate_reports_first_uncovered_band() {
        let limits = BandLimits::new(20.0, -60.0, ToleranceWindow::Narrow);
        let profile = ToleranceProfile::new(BandFamily::Standard)
            .with_band(Band::Gsm900, limits)
            .with_band(Band::Gsm1800, limits)
            .with_band(Band::Wcdma1, limits);

        match profile.validate() {
            Err(CoreError::MissingLimits { band, .. }) => assert_eq!(band, Band::Wcdma8),
            other => panic!("unexpected validation result: {:?}", other),
        }

        let complete = profile.with_band(Band::Wcdma8, limits);
        assert!(complete.validate().is_ok());
    }

    #[test]
    fn profile_deserializes_widths_from_integers() {
        let json = r#"{"family":"standard","bands":{"gsm900":
            {"expected_tx":32.0,"expected_rx":-60.0,"window":7}}}"#;
        let profile: ToleranceProfile = serde_json::from_str(json).unwrap();
        let limits = profile.limits(Band::Gsm900).unwrap();
        assert_eq!(limits.window, ToleranceWindow::Wide);
        assert_eq!(limits.expected(Direction::Rx), -60.0);

        let bad = json.replace("\"window\":7", "\"window\":9");
        assert!(serde_json::from_str::<ToleranceProfile>(&bad).is_err());
    }
}
