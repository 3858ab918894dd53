use crate::workflow::runner::SessionOutcome;
use anyhow::Context;
use rfprofilecore::batch::{BatchSummary, SortMode};
use rfprofilecore::telemetry::MetricsSnapshot;
use serde::Serialize;
use std::fmt;

/// Session results in the order the batches were sorted.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub sort: SortMode,
    pub metrics: MetricsSnapshot,
    pub batches: Vec<BatchSummary>,
}

impl SessionReport {
    pub fn from_outcome(outcome: &SessionOutcome, sort: SortMode) -> Self {
        Self {
            sort,
            metrics: outcome.metrics,
            batches: outcome.batches.iter().map(|batch| batch.summary()).collect(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing session report")
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// One line per batch plus a metrics footer.
impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:<18} {:<9} {:>4} {:>6} {:>6} {:>5} {:>8} {:>8}",
            "serial", "name", "family", "cond", "usable", "failed", "units", "tx", "rx"
        )?;
        for batch in &self.batches {
            write_batch(f, batch)?;
        }
        writeln!(
            f,
            "sorted by {}: {} batches, records current={} previous={} stale={} unmatched={}",
            self.sort,
            self.metrics.batches,
            self.metrics.current,
            self.metrics.previous,
            self.metrics.stale,
            self.metrics.unmatched
        )
    }
}

fn write_batch(f: &mut fmt::Formatter<'_>, batch: &BatchSummary) -> fmt::Result {
    let base = batch.combined.first();
    writeln!(
        f,
        "{:<10} {:<18} {:<9} {:>4} {:>6} {:>6} {:>5} {:>8.3} {:>8.3}",
        batch.serial,
        batch.name,
        batch.family.to_string(),
        u8::from(batch.condition),
        batch.counts.usable(),
        batch.counts.failed,
        batch.counts.units,
        base.map_or(0.0, |g| g.current.tx),
        base.map_or(0.0, |g| g.current.rx),
    )?;
    for group in batch.combined.iter().skip(1) {
        writeln!(
            f,
            "{:<10} {:<18} {:<9} {:>4} {:>6} {:>6} {:>5} {:>8.3} {:>8.3}",
            "",
            format!("  {:?} group", group.group),
            "",
            "",
            "",
            "",
            "",
            group.current.tx,
            group.current.rx,
        )?;
    }
    Ok(())
}
