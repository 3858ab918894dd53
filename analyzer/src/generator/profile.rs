use crate::generator::template::default_limits;
use crate::workflow::config::SessionConfig;
use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rfprofilecore::profile::{
    Band, BandFamily, BandKey, BandReading, BandTable, CalibrationTarget, Direction, EventKind,
    History, HistoryEvent, MeasurementRecord, ToleranceProfile, Verdict,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SPAN_DAYS: i64 = 90;
const MANUFACTURERS: [&str; 3] = ["Acme", "Northwind", "Zeta"];
const MODELS: [&str; 3] = ["X", "Y", "Z"];

/// Configuration for generating a synthetic session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub targets: usize,
    pub records_per_target: usize,
    /// Probability that a target belongs to the LTE family.
    pub lte_share: f64,
    /// Per-band offset amplitude of each target, in dB.
    pub drift: f64,
    /// Per-measurement jitter amplitude, in dB.
    pub noise: f64,
    pub fail_rate: f64,
    /// Probability that a record misses a band.
    pub dropout: f64,
    pub seed: u64,
    pub start: DateTime<Utc>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            targets: 6,
            records_per_target: 40,
            lte_share: 0.5,
            drift: 3.0,
            noise: 0.8,
            fail_rate: 0.05,
            dropout: 0.1,
            seed: 0,
            start: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

fn jitter(rng: &mut StdRng, amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        rng.gen_range(-amplitude..amplitude)
    } else {
        0.0
    }
}

fn chance(rng: &mut StdRng, probability: f64) -> bool {
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

fn build_target(
    serial: &str,
    index: usize,
    profile: &ToleranceProfile,
    config: &GeneratorConfig,
) -> CalibrationTarget {
    let mut baseline = BandTable::new();
    for (band, limits) in &profile.bands {
        for direction in Direction::ALL {
            baseline.set(BandKey::new(*band, direction), [limits.expected(direction); 3]);
        }
    }

    let history = History::from_events(vec![
        HistoryEvent::new(
            config.start + Duration::days(SPAN_DAYS / 3),
            EventKind::Calibrated,
            "initial",
        ),
        HistoryEvent::new(
            config.start + Duration::days(2 * SPAN_DAYS / 3),
            EventKind::Calibrated,
            "recalibrated",
        ),
    ]);

    CalibrationTarget::new(
        serial,
        MANUFACTURERS[index % MANUFACTURERS.len()],
        MODELS[(index / MANUFACTURERS.len()) % MODELS.len()],
        profile.family,
    )
    .with_baseline(baseline)
    .with_history(history)
}

fn build_record(
    rng: &mut StdRng,
    serial: &str,
    profile: &ToleranceProfile,
    offsets: &BTreeMap<Band, f64>,
    config: &GeneratorConfig,
) -> MeasurementRecord {
    let minutes = rng.gen_range(0..SPAN_DAYS * 24 * 60);
    let timestamp = config.start + Duration::minutes(minutes);
    let verdict = if chance(rng, config.fail_rate) {
        Verdict::Failed
    } else if chance(rng, 0.2) {
        Verdict::Passable
    } else {
        Verdict::Passed
    };
    let imei = format!("35{:013}", rng.gen_range(0..5_000u64));

    let mut record = MeasurementRecord::new(serial, imei, timestamp, verdict);
    for (band, limits) in &profile.bands {
        if chance(rng, config.dropout) {
            continue;
        }
        let offset = offsets.get(band).copied().unwrap_or_default();
        let mut sample = |direction: Direction| -> [f64; 3] {
            let expected = limits.expected(direction) + offset;
            [
                expected + jitter(rng, config.noise),
                expected + jitter(rng, config.noise),
                expected + jitter(rng, config.noise),
            ]
        };
        let tx = sample(Direction::Tx);
        let rx = sample(Direction::Rx);
        record = record.with_reading(*band, BandReading::new(tx, rx));
    }
    record
}

/// Builds a deterministic session for the given seed.
pub fn build_session(config: &GeneratorConfig) -> anyhow::Result<SessionConfig> {
    let record_count = config
        .targets
        .checked_mul(config.records_per_target)
        .context("overflow computing record count for generator")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let limits = vec![
        default_limits(BandFamily::Standard),
        default_limits(BandFamily::Lte),
    ];
    let mut targets = Vec::with_capacity(config.targets);
    let mut records = Vec::with_capacity(record_count);

    for index in 0..config.targets {
        let family = if chance(&mut rng, config.lte_share) {
            BandFamily::Lte
        } else {
            BandFamily::Standard
        };
        let profile = limits
            .iter()
            .find(|profile| profile.family == family)
            .context("template limits missing a family")?;
        let serial = format!("RF-{:04}", index + 1);

        let offsets: BTreeMap<Band, f64> = family
            .bands()
            .map(|band| (band, jitter(&mut rng, config.drift)))
            .collect();
        for _ in 0..config.records_per_target {
            records.push(build_record(&mut rng, &serial, profile, &offsets, config));
        }
        targets.push(build_target(&serial, index, profile, config));
    }

    Ok(SessionConfig {
        limits,
        targets,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_record_count() {
        let config = GeneratorConfig {
            targets: 4,
            records_per_target: 25,
            ..Default::default()
        };
        let session = build_session(&config).unwrap();
        assert_eq!(session.targets.len(), 4);
        assert_eq!(session.records.len(), 100);
        assert!(session.validate().is_ok());
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig {
            seed: 13,
            ..Default::default()
        };
        let first = build_session(&config).unwrap();
        let second = build_session(&config).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.targets, second.targets);
    }

    #[test]
    fn generator_respects_family_share() {
        let config = GeneratorConfig {
            lte_share: 0.0,
            dropout: 0.0,
            ..Default::default()
        };
        let session = build_session(&config).unwrap();
        assert!(session
            .targets
            .iter()
            .all(|target| target.family == BandFamily::Standard));
        assert!(session
            .records
            .iter()
            .all(|record| !record.has_band(Band::Lte1) && record.has_band(Band::Gsm900)));
    }
}
