use crate::profile::band::{Band, BandKey, Channel};
use crate::profile::table::{BandTable, Triplet};
use serde::{Deserialize, Serialize};

/// Per-band correction deltas an operator applies on top of a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Compensation {
    deltas: BandTable,
}

impl Compensation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates `delta` into one slot; repeated calls add up.
    pub fn add(&mut self, key: BandKey, channel: Channel, delta: f64) {
        self.deltas.get_mut(key)[channel.index()] += delta;
    }

    /// Zeroes the three channel slots of one band and direction.
    pub fn reset(&mut self, key: BandKey) {
        self.deltas.set(key, [0.0; 3]);
    }

    pub fn reset_all(&mut self) {
        self.deltas = BandTable::default();
    }

    pub fn copy_from(&mut self, other: &Compensation) {
        self.deltas = other.deltas;
    }

    /// Adds every slot of `other` into this compensation.
    pub fn merge(&mut self, other: &Compensation) {
        self.deltas.accumulate(&other.deltas);
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_zero()
    }

    pub fn differs_from(&self, other: &Compensation) -> bool {
        self.deltas != other.deltas
    }

    pub fn value(&self, key: BandKey, channel: Channel) -> f64 {
        self.deltas.value(key, channel)
    }

    pub fn triplet(&self, key: BandKey) -> Triplet {
        self.deltas.get(key)
    }

    /// Raw measurement corrected by this compensation.
    pub fn corrected(&self, key: BandKey, channel: Channel, measured: f64) -> f64 {
        measured + self.value(key, channel)
    }

    pub fn touches(&self, band: Band) -> bool {
        !self.deltas.band_is_zero(band)
    }

    pub fn deltas(&self) -> &BandTable {
        &self.deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::band::Direction;

    fn key() -> BandKey {
        BandKey::new(Band::Wcdma1, Direction::Tx)
    }

    #[test]
    fn add_is_additive() {
        let mut comp = Compensation::new();
        comp.add(key(), Channel::Mid, 0.5);
        comp.add(key(), Channel::Mid, -0.25);
        assert_eq!(comp.value(key(), Channel::Mid), 0.25);
        assert_eq!(comp.value(key(), Channel::Low), 0.0);
    }

    #[test]
    fn reset_clears_only_one_key() {
        let other = BandKey::new(Band::Wcdma1, Direction::Rx);
        let mut comp = Compensation::new();
        comp.add(key(), Channel::Low, 1.0);
        comp.add(other, Channel::High, 2.0);

        comp.reset(key());
        assert_eq!(comp.triplet(key()), [0.0; 3]);
        assert_eq!(comp.value(other, Channel::High), 2.0);
        assert!(!comp.is_empty());

        comp.reset_all();
        assert!(comp.is_empty());
    }

    #[test]
    fn copy_and_differs_track_edits() {
        let mut saved = Compensation::new();
        saved.add(key(), Channel::High, 1.5);

        let mut edited = Compensation::new();
        assert!(edited.differs_from(&saved));
        edited.copy_from(&saved);
        assert!(!edited.differs_from(&saved));
        assert!(!saved.differs_from(&saved));

        edited.add(key(), Channel::High, 0.1);
        assert!(edited.differs_from(&saved));
    }

    #[test]
    fn corrected_applies_delta_to_measurement() {
        let mut comp = Compensation::new();
        comp.add(key(), Channel::Low, -1.25);
        assert_eq!(comp.corrected(key(), Channel::Low, 21.25), 20.0);
        assert!(comp.touches(Band::Wcdma1));
        assert!(!comp.touches(Band::Gsm900));
    }
}
