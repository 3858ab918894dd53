use crate::batch::condition::{self, Condition};
use crate::batch::spread::{self, CombinedSpread, SpreadSet};
use crate::batch::window::{Window, WindowBounds};
use crate::prelude::{CoreError, CoreResult};
use crate::profile::band::{Band, BandFamily, BandGroup, BandKey, Channel};
use crate::profile::compensation::Compensation;
use crate::profile::limits::ToleranceProfile;
use crate::profile::record::{MeasurementRecord, Verdict};
use crate::profile::table::Triplet;
use crate::profile::target::CalibrationTarget;
use crate::telemetry::log::LogManager;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Counters maintained while records are added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub current_records: usize,
    pub previous_records: usize,
    pub stale_records: usize,
    /// Fully passed records in the current window.
    pub passed: usize,
    /// Passed-with-deviation records in the current window.
    pub passable: usize,
    /// Failed records in any window.
    pub failed: usize,
    /// Distinct devices seen in the current window.
    pub units: usize,
    pub current_usable: [usize; Band::COUNT],
    pub previous_usable: [usize; Band::COUNT],
}

impl BatchCounts {
    /// Usable records in the current window.
    pub fn usable(&self) -> usize {
        self.passed + self.passable
    }

    pub fn usable_in(&self, window: Window, band: Band) -> usize {
        match window {
            Window::Current => self.current_usable[band.index()],
            Window::Previous => self.previous_usable[band.index()],
            Window::Stale => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GroupSpread {
    group: BandGroup,
    current: CombinedSpread,
    previous: CombinedSpread,
}

/// Aggregation root: every record of one calibration target for one session.
///
/// Derived state is recomputed from the records on each call, in the order
/// average spreads, combined spreads, condition.
#[derive(Debug)]
pub struct MeasurementBatch {
    target: CalibrationTarget,
    profile: ToleranceProfile,
    bounds: WindowBounds,
    records: Vec<MeasurementRecord>,
    counts: BatchCounts,
    units: HashSet<String>,
    current: Option<SpreadSet>,
    previous: Option<SpreadSet>,
    combined: Option<Vec<GroupSpread>>,
    condition: Option<Condition>,
    compensation: Compensation,
    logger: LogManager,
}

impl MeasurementBatch {
    pub fn new(target: CalibrationTarget, profile: ToleranceProfile) -> CoreResult<Self> {
        if profile.family != target.family {
            return Err(CoreError::FamilyMismatch {
                profile: profile.family,
                target: target.family,
            });
        }
        let bounds = WindowBounds::from_history(target.history());

        Ok(Self {
            target,
            profile,
            bounds,
            records: Vec::new(),
            counts: BatchCounts::default(),
            units: HashSet::new(),
            current: None,
            previous: None,
            combined: None,
            condition: None,
            compensation: Compensation::new(),
            logger: LogManager::new(),
        })
    }

    /// Appends a record and updates the counters of the window it falls into.
    pub fn add_report(&mut self, record: MeasurementRecord) -> Window {
        let window = self.tally(&record);
        self.records.push(record);
        window
    }

    fn tally(&mut self, record: &MeasurementRecord) -> Window {
        let window = self.bounds.classify(record.timestamp);
        let family = self.target.family;

        match window {
            Window::Current => {
                self.counts.current_records += 1;
                match record.verdict {
                    Verdict::Passed => self.counts.passed += 1,
                    Verdict::Passable => self.counts.passable += 1,
                    Verdict::Failed => self.counts.failed += 1,
                }
                for band in family.bands().filter(|b| record.usable_reading(*b).is_some()) {
                    self.counts.current_usable[band.index()] += 1;
                }
                if self.units.insert(record.imei.clone()) {
                    self.counts.units += 1;
                }
            }
            Window::Previous => {
                self.counts.previous_records += 1;
                if record.verdict == Verdict::Failed {
                    self.counts.failed += 1;
                }
                for band in family.bands().filter(|b| record.usable_reading(*b).is_some()) {
                    self.counts.previous_usable[band.index()] += 1;
                }
            }
            Window::Stale => {
                self.counts.stale_records += 1;
                if record.verdict == Verdict::Failed {
                    self.counts.failed += 1;
                }
            }
        }
        window
    }

    /// Re-derives window bounds and counters after the target's history changed.
    ///
    /// Computed spreads and the condition are dropped; `evaluate` rebuilds them.
    fn rewindow(&mut self) {
        self.bounds = WindowBounds::from_history(self.target.history());
        self.counts = BatchCounts::default();
        self.units.clear();
        let records = std::mem::take(&mut self.records);
        for record in &records {
            self.tally(record);
        }
        self.records = records;

        self.current = None;
        self.previous = None;
        self.combined = None;
        self.condition = None;
    }

    pub fn calculate_average_spreads(&mut self) {
        let family = self.target.family;
        self.current = Some(SpreadSet::compute(
            self.records_in(Window::Current),
            family,
            &self.profile,
        ));
        self.previous = Some(SpreadSet::compute(
            self.records_in(Window::Previous),
            family,
            &self.profile,
        ));
        self.logger.detail(&format!(
            "{} average spreads over {} current / {} previous records",
            self.target.serial, self.counts.current_records, self.counts.previous_records
        ));
    }

    pub fn calculate_combined_spreads(&mut self) -> CoreResult<()> {
        let (current, previous) = self
            .current
            .as_ref()
            .zip(self.previous.as_ref())
            .ok_or(CoreError::MissingStage("average spreads"))?;

        let combined = self
            .target
            .family
            .groups()
            .iter()
            .map(|&group| GroupSpread {
                group,
                current: current.combined(group),
                previous: previous.combined(group),
            })
            .collect();
        self.combined = Some(combined);
        Ok(())
    }

    pub fn check_condition(&mut self) -> CoreResult<Condition> {
        if self.combined.is_none() {
            return Err(CoreError::MissingStage("combined spreads"));
        }
        let current = self
            .current
            .as_ref()
            .ok_or(CoreError::MissingStage("average spreads"))?;

        let rating = condition::classify(current, self.target.family, &self.profile);
        self.condition = Some(rating);
        self.logger.record(&format!(
            "{} ({}) condition {:?}",
            self.name(),
            self.target.serial,
            rating
        ));
        Ok(rating)
    }

    /// Runs the three compute steps in order.
    pub fn evaluate(&mut self) -> CoreResult<Condition> {
        self.calculate_average_spreads();
        self.calculate_combined_spreads()?;
        self.check_condition()
    }

    pub fn records_in(&self, window: Window) -> impl Iterator<Item = &MeasurementRecord> + '_ {
        self.records
            .iter()
            .filter(move |record| self.bounds.classify(record.timestamp) == window)
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn name(&self) -> String {
        self.target.name()
    }

    pub fn serial(&self) -> &str {
        &self.target.serial
    }

    pub fn family(&self) -> BandFamily {
        self.target.family
    }

    pub fn target(&self) -> &CalibrationTarget {
        &self.target
    }

    pub fn into_target(self) -> CalibrationTarget {
        self.target
    }

    pub fn profile(&self) -> &ToleranceProfile {
        &self.profile
    }

    pub fn bounds(&self) -> WindowBounds {
        self.bounds
    }

    pub fn latest_event(&self) -> Option<DateTime<Utc>> {
        self.bounds.latest()
    }

    pub fn counts(&self) -> &BatchCounts {
        &self.counts
    }

    pub fn usable_count(&self) -> usize {
        self.counts.usable()
    }

    /// `NoData` until [`check_condition`](Self::check_condition) has run.
    pub fn condition(&self) -> Condition {
        self.condition.unwrap_or_default()
    }

    pub fn spreads(&self, window: Window) -> Option<&SpreadSet> {
        match window {
            Window::Current => self.current.as_ref(),
            Window::Previous => self.previous.as_ref(),
            Window::Stale => None,
        }
    }

    pub fn spread(&self, window: Window, key: BandKey) -> Option<Triplet> {
        self.spreads(window)
            .filter(|set| set.is_usable(key.band))
            .map(|set| set.spread(key))
    }

    /// Current minus previous spread, when both windows have usable data.
    pub fn spread_delta(&self, key: BandKey) -> Option<Triplet> {
        let current = self.current.as_ref()?;
        let previous = self.previous.as_ref()?;
        current.delta(previous, key)
    }

    pub fn combined_spread(&self, group: BandGroup, window: Window) -> Option<CombinedSpread> {
        let entry = self.group_spread(group)?;
        match window {
            Window::Current => Some(entry.current),
            Window::Previous => Some(entry.previous),
            Window::Stale => None,
        }
    }

    /// Current minus previous combined spread, when both windows have usable data.
    pub fn combined_delta(&self, group: BandGroup) -> Option<CombinedSpread> {
        let entry = self.group_spread(group)?;
        let usable = |set: &Option<SpreadSet>| set.as_ref().is_some_and(|s| s.group_usable(group));
        if usable(&self.current) && usable(&self.previous) {
            Some(entry.current.delta(&entry.previous))
        } else {
            None
        }
    }

    fn group_spread(&self, group: BandGroup) -> Option<&GroupSpread> {
        self.combined.as_ref()?.iter().find(|entry| entry.group == group)
    }

    /// Correction that would center the current window on the expected values.
    pub fn suggested_compensation(&self) -> Compensation {
        spread::suggest_compensation(
            self.records_in(Window::Current),
            self.target.family,
            &self.profile,
        )
    }

    pub fn compensation(&self) -> &Compensation {
        &self.compensation
    }

    pub fn compensation_mut(&mut self) -> &mut Compensation {
        &mut self.compensation
    }

    pub fn add_compensation(&mut self, key: BandKey, channel: Channel, delta: f64) {
        self.compensation.add(key, channel, delta);
    }

    pub fn reset_compensation(&mut self, key: BandKey) {
        self.compensation.reset(key);
    }

    /// True while the batch holds edits not yet applied to the target.
    pub fn has_pending_compensation(&self) -> bool {
        !self.compensation.is_empty()
    }

    /// Applies the pending compensation to the owned target and clears it.
    ///
    /// The new history event moves the window bounds, so every record is
    /// reclassified and derived state must be evaluated again.
    pub fn apply_compensation(&mut self, at: DateTime<Utc>, note: &str) -> CoreResult<()> {
        if self.compensation.is_empty() {
            return Ok(());
        }
        self.target.apply_compensation(&self.compensation, at, note)?;
        self.compensation.reset_all();
        self.rewindow();
        Ok(())
    }

    pub fn summary(&self) -> BatchSummary {
        let combined = self
            .combined
            .iter()
            .flatten()
            .map(|entry| GroupSummary {
                group: entry.group,
                current: entry.current,
                previous: entry.previous,
                delta: self.combined_delta(entry.group),
            })
            .collect();

        BatchSummary {
            name: self.name(),
            serial: self.target.serial.clone(),
            family: self.target.family,
            condition: self.condition(),
            latest_event: self.latest_event(),
            counts: self.counts.clone(),
            combined,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group: BandGroup,
    pub current: CombinedSpread,
    pub previous: CombinedSpread,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<CombinedSpread>,
}

/// Read-only view of a batch handed to reporting.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub name: String,
    pub serial: String,
    pub family: BandFamily,
    pub condition: Condition,
    pub latest_event: Option<DateTime<Utc>>,
    pub counts: BatchCounts,
    pub combined: Vec<GroupSummary>,
}
