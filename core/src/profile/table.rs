use crate::profile::band::{Band, BandKey, Channel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Low, mid and high channel values of one band and direction.
pub type Triplet = [f64; 3];

/// Fixed grid of values addressed by band, direction and channel.
///
/// Serialized as a map from the external key form (`gsm900_tx`) to a triplet;
/// keys missing from the map read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<BandKey, Triplet>", into = "BTreeMap<BandKey, Triplet>")]
pub struct BandTable {
    slots: [[Triplet; 2]; Band::COUNT],
}

impl BandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: BandKey) -> Triplet {
        self.slots[key.band.index()][key.direction.index()]
    }

    pub fn get_mut(&mut self, key: BandKey) -> &mut Triplet {
        &mut self.slots[key.band.index()][key.direction.index()]
    }

    pub fn value(&self, key: BandKey, channel: Channel) -> f64 {
        self.get(key)[channel.index()]
    }

    pub fn set(&mut self, key: BandKey, values: Triplet) {
        *self.get_mut(key) = values;
    }

    /// Element-wise sum of `other` into `self`.
    pub fn accumulate(&mut self, other: &BandTable) {
        for key in BandKey::all() {
            let source = other.get(key);
            for (slot, delta) in self.get_mut(key).iter_mut().zip(source) {
                *slot += delta;
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.slots.iter().flatten().flatten().all(|&v| v == 0.0)
    }

    pub fn band_is_zero(&self, band: Band) -> bool {
        self.slots[band.index()].iter().flatten().all(|&v| v == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BandKey, Triplet)> + '_ {
        BandKey::all().map(move |key| (key, self.get(key)))
    }
}

impl From<BTreeMap<BandKey, Triplet>> for BandTable {
    fn from(map: BTreeMap<BandKey, Triplet>) -> Self {
        let mut table = BandTable::default();
        for (key, values) in map {
            table.set(key, values);
        }
        table
    }
}

impl From<BandTable> for BTreeMap<BandKey, Triplet> {
    fn from(table: BandTable) -> Self {
        table
            .iter()
            .filter(|(_, values)| values.iter().any(|&v| v != 0.0))
            .collect()
    }
}
