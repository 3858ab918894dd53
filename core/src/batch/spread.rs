use crate::math::stats::StatsHelper;
use crate::profile::band::{Band, BandFamily, BandGroup, BandKey, Channel, Direction, DivisorPolicy};
use crate::profile::compensation::Compensation;
use crate::profile::limits::ToleranceProfile;
use crate::profile::record::MeasurementRecord;
use crate::profile::table::{BandTable, Triplet};
use serde::{Deserialize, Serialize};

/// Per-channel spreads of one window plus the usable record count per band.
///
/// Spreads of a band with no usable records stay at zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpreadSet {
    values: BandTable,
    usable: [usize; Band::COUNT],
}

impl SpreadSet {
    /// Mean absolute deviation from the expected value for every usable band.
    ///
    /// `records` must already be restricted to one window. Bands without
    /// limits in `profile` are skipped.
    pub fn compute<'a, I>(records: I, family: BandFamily, profile: &ToleranceProfile) -> Self
    where
        I: IntoIterator<Item = &'a MeasurementRecord>,
    {
        let records: Vec<&MeasurementRecord> = records.into_iter().collect();
        let mut set = SpreadSet::default();

        for band in family.bands() {
            let Some(limits) = profile.limits(band) else {
                continue;
            };
            let readings: Vec<_> = records
                .iter()
                .filter_map(|record| record.usable_reading(band))
                .collect();
            set.usable[band.index()] = readings.len();
            if readings.is_empty() {
                continue;
            }

            for direction in Direction::ALL {
                let expected = limits.expected(direction);
                let slot = set.values.get_mut(BandKey::new(band, direction));
                for channel in Channel::ALL {
                    let measured = readings.iter().map(|r| r.get(direction)[channel.index()]);
                    slot[channel.index()] = StatsHelper::mean_abs_deviation(measured, expected);
                }
            }
        }
        set
    }

    pub fn usable_count(&self, band: Band) -> usize {
        self.usable[band.index()]
    }

    pub fn is_usable(&self, band: Band) -> bool {
        self.usable_count(band) > 0
    }

    pub fn group_usable(&self, group: BandGroup) -> bool {
        group.bands().iter().any(|band| self.is_usable(*band))
    }

    pub fn spread(&self, key: BandKey) -> Triplet {
        self.values.get(key)
    }

    pub fn value(&self, key: BandKey, channel: Channel) -> f64 {
        self.values.value(key, channel)
    }

    /// Unweighted mean of the channel spreads of a group.
    ///
    /// Zero when no band of the group is usable. The divisor follows the
    /// group's [`DivisorPolicy`].
    pub fn combined(&self, group: BandGroup) -> CombinedSpread {
        let usable: Vec<Band> = group
            .bands()
            .iter()
            .copied()
            .filter(|band| self.is_usable(*band))
            .collect();
        if usable.is_empty() {
            return CombinedSpread::default();
        }

        let band_count = match group.divisor() {
            DivisorPolicy::UsableBands => usable.len(),
            DivisorPolicy::AllBands => group.bands().len(),
        };
        let divisor = (Channel::ALL.len() * band_count) as f64;
        let total = |direction: Direction| -> f64 {
            usable
                .iter()
                .flat_map(|band| self.spread(BandKey::new(*band, direction)))
                .sum::<f64>()
                / divisor
        };

        CombinedSpread {
            tx: total(Direction::Tx),
            rx: total(Direction::Rx),
        }
    }

    /// `self - earlier` per channel, when the band is usable in both sets.
    pub fn delta(&self, earlier: &SpreadSet, key: BandKey) -> Option<Triplet> {
        if !self.is_usable(key.band) || !earlier.is_usable(key.band) {
            return None;
        }
        let now = self.spread(key);
        let before = earlier.spread(key);
        Some([now[0] - before[0], now[1] - before[1], now[2] - before[2]])
    }
}

/// One scalar spread per direction for a band group.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombinedSpread {
    pub tx: f64,
    pub rx: f64,
}

impl CombinedSpread {
    pub fn delta(&self, earlier: &CombinedSpread) -> CombinedSpread {
        CombinedSpread {
            tx: self.tx - earlier.tx,
            rx: self.rx - earlier.rx,
        }
    }
}

/// Compensation that would move the mean measurement onto the expected value.
///
/// Each usable slot gets `expected - mean(measured)`; bands without usable
/// records stay untouched.
pub fn suggest_compensation<'a, I>(
    records: I,
    family: BandFamily,
    profile: &ToleranceProfile,
) -> Compensation
where
    I: IntoIterator<Item = &'a MeasurementRecord>,
{
    let records: Vec<&MeasurementRecord> = records.into_iter().collect();
    let mut compensation = Compensation::new();

    for band in family.bands() {
        let Some(limits) = profile.limits(band) else {
            continue;
        };
        let readings: Vec<_> = records
            .iter()
            .filter_map(|record| record.usable_reading(band))
            .collect();
        if readings.is_empty() {
            continue;
        }
        for direction in Direction::ALL {
            let key = BandKey::new(band, direction);
            let expected = limits.expected(direction);
            for channel in Channel::ALL {
                let measured = readings.iter().map(|r| r.get(direction)[channel.index()]);
                let offset = StatsHelper::mean_deviation(measured, expected);
                compensation.add(key, channel, -offset);
            }
        }
    }
    compensation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::limits::{BandLimits, ToleranceWindow};
    use crate::profile::record::{BandReading, Verdict};
    use chrono::{TimeZone, Utc};

    fn profile(family: BandFamily) -> ToleranceProfile {
        family.bands().fold(ToleranceProfile::new(family), |profile, band| {
            profile.with_band(band, BandLimits::new(20.0, -60.0, ToleranceWindow::Narrow))
        })
    }

    fn record(band: Band, tx: f64, verdict: Verdict) -> MeasurementRecord {
        let ts = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        MeasurementRecord::new("P", "1", ts, verdict)
            .with_reading(band, BandReading::new([tx; 3], [-60.0; 3]))
    }

    #[test]
    fn spread_is_mean_absolute_deviation_of_usable_records() {
        let records = vec![
            record(Band::Gsm900, 22.0, Verdict::Passed),
            record(Band::Gsm900, 20.5, Verdict::Passable),
            record(Band::Gsm900, 40.0, Verdict::Failed),
        ];
        let limits = profile(BandFamily::Standard);
        let set = SpreadSet::compute(&records, BandFamily::Standard, &limits);

        assert_eq!(set.usable_count(Band::Gsm900), 2);
        assert_eq!(set.spread(BandKey::new(Band::Gsm900, Direction::Tx)), [1.25; 3]);
        assert_eq!(set.spread(BandKey::new(Band::Gsm900, Direction::Rx)), [0.0; 3]);
        assert!(!set.is_usable(Band::Wcdma1));
    }

    #[test]
    fn base_divisor_counts_only_usable_bands() {
        let records = vec![
            record(Band::Gsm900, 22.0, Verdict::Passed),
            record(Band::Wcdma1, 21.0, Verdict::Passed),
        ];
        let limits = profile(BandFamily::Standard);
        let set = SpreadSet::compute(&records, BandFamily::Standard, &limits);
        let combined = set.combined(BandGroup::Base);
        assert!((combined.tx - 1.5).abs() < 1e-12);
        assert_eq!(combined.rx, 0.0);
    }

    #[test]
    fn lte_divisor_counts_every_band_of_the_group() {
        let records = vec![record(Band::Lte7, 23.0, Verdict::Passed)];
        let set = SpreadSet::compute(&records, BandFamily::Lte, &profile(BandFamily::Lte));
        let combined = set.combined(BandGroup::Lte);
        assert!((combined.tx - 0.75).abs() < 1e-12);
    }

    #[test]
    fn combined_spread_without_data_is_zero() {
        let set = SpreadSet::compute(&[], BandFamily::Lte, &profile(BandFamily::Lte));
        assert_eq!(set.combined(BandGroup::Base), CombinedSpread::default());
        assert_eq!(set.combined(BandGroup::Lte), CombinedSpread::default());
    }

    #[test]
    fn standard_family_ignores_lte_readings() {
        let records = vec![record(Band::Lte1, 30.0, Verdict::Passed)];
        let set = SpreadSet::compute(&records, BandFamily::Standard, &profile(BandFamily::Lte));
        assert!(!set.is_usable(Band::Lte1));
    }

    #[test]
    fn suggestion_cancels_mean_offset() {
        let records = vec![
            record(Band::Wcdma8, 21.0, Verdict::Passed),
            record(Band::Wcdma8, 22.0, Verdict::Passed),
        ];
        let limits = profile(BandFamily::Standard);
        let comp = suggest_compensation(&records, BandFamily::Standard, &limits);
        let key = BandKey::new(Band::Wcdma8, Direction::Tx);
        assert_eq!(comp.triplet(key), [-1.5; 3]);
        assert_eq!(comp.corrected(key, Channel::Low, 21.5), 20.0);
        assert!(!comp.touches(Band::Gsm900));
    }
}
