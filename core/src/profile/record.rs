use crate::profile::band::{Band, BandGroup, Direction};
use crate::profile::table::Triplet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one device test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Passed,
    /// Passed with an acceptable deviation.
    Passable,
    Failed,
}

impl Verdict {
    pub const fn is_usable(self) -> bool {
        !matches!(self, Verdict::Failed)
    }
}

/// Low/mid/high TX and RX values measured on one band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandReading {
    pub tx: Triplet,
    pub rx: Triplet,
}

impl BandReading {
    pub fn new(tx: Triplet, rx: Triplet) -> Self {
        Self { tx, rx }
    }

    pub fn get(&self, direction: Direction) -> &Triplet {
        match direction {
            Direction::Tx => &self.tx,
            Direction::Rx => &self.rx,
        }
    }
}

/// One parsed test result for one device against one calibration target.
///
/// A band is present exactly when it has a reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub profile_serial: String,
    pub imei: String,
    pub timestamp: DateTime<Utc>,
    pub verdict: Verdict,
    #[serde(default)]
    readings: BTreeMap<Band, BandReading>,
}

impl MeasurementRecord {
    pub fn new(
        profile_serial: impl Into<String>,
        imei: impl Into<String>,
        timestamp: DateTime<Utc>,
        verdict: Verdict,
    ) -> Self {
        Self {
            profile_serial: profile_serial.into(),
            imei: imei.into(),
            timestamp,
            verdict,
            readings: BTreeMap::new(),
        }
    }

    pub fn with_reading(mut self, band: Band, reading: BandReading) -> Self {
        self.readings.insert(band, reading);
        self
    }

    pub fn reading(&self, band: Band) -> Option<&BandReading> {
        self.readings.get(&band)
    }

    pub fn has_band(&self, band: Band) -> bool {
        self.readings.contains_key(&band)
    }

    /// True when the record carries any band of `group`.
    pub fn covers(&self, group: BandGroup) -> bool {
        group.bands().iter().any(|band| self.has_band(*band))
    }

    /// Reading of `band` when the record is usable for statistics.
    pub fn usable_reading(&self, band: Band) -> Option<&BandReading> {
        if self.verdict.is_usable() {
            self.reading(band)
        } else {
            None
        }
    }

    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        self.readings.keys().copied()
    }
}
