use crate::batch::condition::Condition;
use crate::prelude::{CoreError, CoreResult};
use crate::profile::band::{Band, BandFamily, BandKey, Channel};
use crate::profile::compensation::Compensation;
use crate::profile::history::{EventKind, History, HistoryEvent};
use crate::profile::table::{BandTable, Triplet};
use crate::telemetry::log::LogManager;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A physical instrument configuration whose RF profile is being calibrated.
///
/// The baseline is authoritative; the applied compensation is the only part
/// this engine mutates, and it is folded into the baseline on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationTarget {
    pub serial: String,
    pub manufacturer: String,
    pub model: String,
    pub family: BandFamily,
    #[serde(default)]
    baseline: BandTable,
    #[serde(default, skip_serializing_if = "Compensation::is_empty")]
    compensation: Compensation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    history: Option<History>,
    #[serde(default)]
    condition: Condition,
}

impl CalibrationTarget {
    pub fn new(
        serial: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        family: BandFamily,
    ) -> Self {
        Self {
            serial: serial.into(),
            manufacturer: manufacturer.into(),
            model: model.into(),
            family,
            baseline: BandTable::default(),
            compensation: Compensation::default(),
            history: None,
            condition: Condition::NoData,
        }
    }

    pub fn with_baseline(mut self, baseline: BandTable) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = Some(history);
        self
    }

    /// Manufacturer and model, the name batches sort by.
    pub fn name(&self) -> String {
        format!("{} {}", self.manufacturer, self.model)
    }

    pub fn baseline(&self) -> &BandTable {
        &self.baseline
    }

    pub fn compensation(&self) -> &Compensation {
        &self.compensation
    }

    pub fn history(&self) -> Option<&History> {
        self.history.as_ref()
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn rate(&mut self, condition: Condition) {
        self.condition = condition;
    }

    pub fn displayed_value(&self, key: BandKey, channel: Channel) -> f64 {
        self.baseline.value(key, channel) + self.compensation.value(key, channel)
    }

    pub fn displayed(&self, key: BandKey) -> Triplet {
        let mut values = self.baseline.get(key);
        for (value, delta) in values.iter_mut().zip(self.compensation.triplet(key)) {
            *value += delta;
        }
        values
    }

    /// Adds `compensation` on top of the applied one and logs the change.
    ///
    /// An empty compensation changes nothing and records no event.
    pub fn apply_compensation(
        &mut self,
        compensation: &Compensation,
        at: DateTime<Utc>,
        note: impl Into<String>,
    ) -> CoreResult<()> {
        if let Some(band) = Band::ALL
            .into_iter()
            .find(|band| !self.family.contains(*band) && compensation.touches(*band))
        {
            return Err(CoreError::BandOutsideFamily {
                family: self.family,
                band,
            });
        }
        if compensation.is_empty() {
            return Ok(());
        }

        self.compensation.merge(compensation);
        self.push_event(HistoryEvent::new(at, EventKind::Compensated, note));
        LogManager::new().record(&format!("compensation applied to {}", self.serial));
        Ok(())
    }

    /// Drops the applied compensation so displayed values equal the baseline.
    pub fn revert_compensation(&mut self, at: DateTime<Utc>) -> CoreResult<Compensation> {
        if self.compensation.is_empty() {
            return Err(CoreError::NothingToRevert {
                serial: self.serial.clone(),
            });
        }

        let removed = self.compensation;
        self.compensation.reset_all();
        self.push_event(HistoryEvent::new(at, EventKind::Reverted, ""));
        LogManager::new().record(&format!("compensation reverted on {}", self.serial));
        Ok(removed)
    }

    /// Folds the applied compensation into the baseline.
    ///
    /// Displayed values do not change, so no window-delimiting event is logged.
    pub fn commit_compensation(&mut self) -> CoreResult<()> {
        if self.compensation.is_empty() {
            return Err(CoreError::NothingToCommit {
                serial: self.serial.clone(),
            });
        }

        self.baseline.accumulate(self.compensation.deltas());
        self.compensation.reset_all();
        Ok(())
    }

    fn push_event(&mut self, event: HistoryEvent) {
        self.history.get_or_insert_with(History::new).append(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::band::Direction;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn target() -> CalibrationTarget {
        let mut baseline = BandTable::new();
        baseline.set(BandKey::new(Band::Gsm900, Direction::Tx), [32.0, 32.5, 33.0]);
        CalibrationTarget::new("P-100", "Acme", "X", BandFamily::Standard).with_baseline(baseline)
    }

    #[test]
    fn apply_then_revert_restores_baseline() {
        let key = BandKey::new(Band::Gsm900, Direction::Tx);
        let mut target = target();
        let mut comp = Compensation::new();
        comp.add(key, Channel::Mid, -0.5);

        target.apply_compensation(&comp, now(), "tuned").unwrap();
        assert_eq!(target.displayed_value(key, Channel::Mid), 32.0);
        assert_eq!(target.history().unwrap().latest(), Some(now()));

        let removed = target.revert_compensation(now()).unwrap();
        assert_eq!(removed, comp);
        assert_eq!(target.displayed(key), target.baseline().get(key));
        assert_eq!(target.history().unwrap().len(), 2);
    }

    #[test]
    fn revert_without_compensation_is_rejected() {
        let mut target = target();
        assert!(matches!(
            target.revert_compensation(now()),
            Err(CoreError::NothingToRevert { .. })
        ));
        assert!(target.history().is_none());
    }

    #[test]
    fn commit_folds_compensation_into_baseline() {
        let key = BandKey::new(Band::Gsm900, Direction::Tx);
        let mut target = target();
        let mut comp = Compensation::new();
        comp.add(key, Channel::High, 1.0);
        target.apply_compensation(&comp, now(), "").unwrap();

        target.commit_compensation().unwrap();
        assert_eq!(target.baseline().value(key, Channel::High), 34.0);
        assert!(target.compensation().is_empty());
        assert_eq!(target.displayed_value(key, Channel::High), 34.0);
        assert!(target.commit_compensation().is_err());
    }

    #[test]
    fn apply_rejects_bands_outside_family() {
        let mut target = target();
        let mut comp = Compensation::new();
        comp.add(BandKey::new(Band::Lte7, Direction::Rx), Channel::Low, 1.0);
        assert!(matches!(
            target.apply_compensation(&comp, now(), ""),
            Err(CoreError::BandOutsideFamily { band: Band::Lte7, .. })
        ));
        assert!(target.compensation().is_empty());
    }
}
