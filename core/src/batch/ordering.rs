use crate::batch::measurement::MeasurementBatch;
use crate::prelude::CoreError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Total orderings a list of batches can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Worst condition first, then most usable records.
    #[default]
    Condition,
    /// Most usable current-window records first.
    Passable,
    /// Ascending by manufacturer and model.
    Name,
    /// Most recently calibrated first.
    Modification,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Condition,
        SortMode::Passable,
        SortMode::Name,
        SortMode::Modification,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            SortMode::Condition => "condition",
            SortMode::Passable => "passable",
            SortMode::Name => "name",
            SortMode::Modification => "modification",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| CoreError::UnknownSortMode(s.to_string()))
    }
}

impl MeasurementBatch {
    pub fn compare(&self, other: &MeasurementBatch, mode: SortMode) -> Ordering {
        match mode {
            SortMode::Condition => other
                .condition()
                .cmp(&self.condition())
                .then_with(|| other.usable_count().cmp(&self.usable_count())),
            SortMode::Passable => other.usable_count().cmp(&self.usable_count()),
            SortMode::Name => self.name().cmp(&other.name()),
            SortMode::Modification => other.latest_event().cmp(&self.latest_event()),
        }
    }
}

/// Stable sort of `batches` by `mode`.
pub fn sort_batches(batches: &mut [MeasurementBatch], mode: SortMode) {
    batches.sort_by(|a, b| a.compare(b, mode));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::band::{Band, BandFamily};
    use crate::profile::history::{EventKind, History, HistoryEvent};
    use crate::profile::limits::{BandLimits, ToleranceProfile, ToleranceWindow};
    use crate::profile::record::{BandReading, MeasurementRecord, Verdict};
    use crate::profile::target::CalibrationTarget;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, d, 0, 0, 0).unwrap()
    }

    fn batch(
        manufacturer: &str,
        model: &str,
        calibrated: Option<u32>,
        tx: &[f64],
    ) -> MeasurementBatch {
        let limits = BandLimits::new(20.0, -60.0, ToleranceWindow::Narrow);
        let profile = BandFamily::Standard.bands().fold(
            ToleranceProfile::new(BandFamily::Standard),
            |profile, band| profile.with_band(band, limits),
        );
        let mut target = CalibrationTarget::new("S", manufacturer, model, BandFamily::Standard);
        if let Some(d) = calibrated {
            target = target.with_history(History::from_events(vec![HistoryEvent::new(
                day(d),
                EventKind::Calibrated,
                "",
            )]));
        }
        let mut batch = MeasurementBatch::new(target, profile).unwrap();
        for (i, value) in tx.iter().enumerate() {
            let record = MeasurementRecord::new("S", format!("{}", i), day(28), Verdict::Passed)
                .with_reading(Band::Gsm900, BandReading::new([*value; 3], [-60.0; 3]));
            batch.add_report(record);
        }
        batch.evaluate().unwrap();
        batch
    }

    fn names(batches: &[MeasurementBatch]) -> Vec<String> {
        batches.iter().map(|b| b.name()).collect()
    }

    #[test]
    fn name_mode_sorts_ascending_regardless_of_state() {
        let mut batches = vec![
            batch("Zeta", "A", Some(1), &[20.0]),
            batch("Acme", "Y", None, &[30.0, 30.0, 30.0]),
            batch("Acme", "X", Some(3), &[]),
        ];
        sort_batches(&mut batches, SortMode::Name);
        assert_eq!(names(&batches), vec!["Acme X", "Acme Y", "Zeta A"]);
    }

    #[test]
    fn condition_mode_puts_worst_first_then_most_usable() {
        let mut batches = vec![
            batch("A", "excellent", None, &[20.0, 20.0]),
            batch("B", "problematic", None, &[25.0]),
            batch("C", "good-few", None, &[23.0]),
            batch("D", "good-many", None, &[23.0, 23.0]),
            batch("E", "empty", None, &[]),
        ];
        sort_batches(&mut batches, SortMode::Condition);
        assert_eq!(
            names(&batches),
            vec!["B problematic", "D good-many", "C good-few", "A excellent", "E empty"]
        );
    }

    #[test]
    fn passable_mode_sorts_by_usable_count() {
        let mut batches = vec![
            batch("A", "one", None, &[25.0]),
            batch("B", "three", None, &[20.0, 20.0, 20.0]),
            batch("C", "two", None, &[20.0, 20.0]),
        ];
        sort_batches(&mut batches, SortMode::Passable);
        assert_eq!(names(&batches), vec!["B three", "C two", "A one"]);
    }

    #[test]
    fn modification_mode_puts_recent_calibration_first() {
        let mut batches = vec![
            batch("A", "old", Some(2), &[]),
            batch("B", "never", None, &[]),
            batch("C", "new", Some(20), &[]),
        ];
        sort_batches(&mut batches, SortMode::Modification);
        assert_eq!(names(&batches), vec!["C new", "A old", "B never"]);
    }

    #[test]
    fn sort_mode_parses_closed_set() {
        assert_eq!("name".parse::<SortMode>().unwrap(), SortMode::Name);
        assert!(matches!(
            "size".parse::<SortMode>(),
            Err(CoreError::UnknownSortMode(_))
        ));
    }
}
