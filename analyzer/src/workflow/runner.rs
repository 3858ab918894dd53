use crate::workflow::config::SessionConfig;
use anyhow::Context;
use rfprofilecore::batch::{sort_batches, MeasurementBatch, SortMode};
use rfprofilecore::profile::{CalibrationTarget, MeasurementRecord};
use rfprofilecore::telemetry::{MetricsRecorder, MetricsSnapshot};
use std::collections::HashMap;

#[derive(Debug)]
pub struct SessionOutcome {
    pub batches: Vec<MeasurementBatch>,
    pub metrics: MetricsSnapshot,
}

impl SessionOutcome {
    /// Targets of every batch, rated with the batch's condition.
    pub fn into_targets(self) -> Vec<CalibrationTarget> {
        self.batches
            .into_iter()
            .map(|batch| {
                let condition = batch.condition();
                let mut target = batch.into_target();
                target.rate(condition);
                target
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct Runner {
    sort: SortMode,
}

impl Runner {
    pub fn new(sort: SortMode) -> Self {
        Self { sort }
    }

    /// Builds and evaluates one batch per target, sorted by the runner's mode.
    pub fn execute(&self, session: SessionConfig) -> anyhow::Result<SessionOutcome> {
        session.validate().context("validating session")?;
        let metrics = MetricsRecorder::new();
        let SessionConfig {
            limits,
            targets,
            records,
        } = session;

        let mut by_serial: HashMap<String, Vec<MeasurementRecord>> = HashMap::new();
        for record in records {
            by_serial
                .entry(record.profile_serial.clone())
                .or_default()
                .push(record);
        }

        let mut batches = Vec::with_capacity(targets.len());
        for target in targets {
            let profile = limits
                .iter()
                .find(|profile| profile.family == target.family)
                .with_context(|| {
                    format!("no limits for family {} of {}", target.family, target.serial)
                })?
                .clone();
            let serial = target.serial.clone();
            let mut batch = MeasurementBatch::new(target, profile)
                .with_context(|| format!("creating batch for {}", serial))?;

            for record in by_serial.remove(&serial).unwrap_or_default() {
                metrics.record_window(batch.add_report(record));
            }
            batch
                .evaluate()
                .with_context(|| format!("evaluating batch for {}", serial))?;
            metrics.record_batch();
            batches.push(batch);
        }

        for record in by_serial.values().flatten() {
            log::warn!(
                "record from {} references unknown profile {}",
                record.imei,
                record.profile_serial
            );
            metrics.record_unmatched();
        }

        sort_batches(&mut batches, self.sort);
        Ok(SessionOutcome {
            batches,
            metrics: metrics.snapshot(),
        })
    }
}
