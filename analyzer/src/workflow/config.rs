use anyhow::{bail, Context};
use rfprofilecore::profile::{BandFamily, CalibrationTarget, MeasurementRecord, ToleranceProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Everything one session aggregates: limits per family, targets and records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub limits: Vec<ToleranceProfile>,
    #[serde(default)]
    pub targets: Vec<CalibrationTarget>,
    #[serde(default)]
    pub records: Vec<MeasurementRecord>,
}

impl SessionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session {}", path_ref.display()))?;
        let config: SessionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("validating session {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        let contents = serde_yaml::to_string(self).context("serializing session")?;
        fs::write(path_ref, contents)
            .with_context(|| format!("writing session {}", path_ref.display()))?;
        Ok(())
    }

    /// Each family has at most one profile, every profile covers its bands
    /// and target serials are unique.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (index, profile) in self.limits.iter().enumerate() {
            if self.limits[..index].iter().any(|p| p.family == profile.family) {
                bail!("duplicate limits for family {}", profile.family);
            }
            profile.validate()?;
        }
        let mut serials = HashSet::new();
        for target in &self.targets {
            if !serials.insert(target.serial.as_str()) {
                bail!("duplicate target serial {}", target.serial);
            }
        }
        Ok(())
    }

    pub fn profile_for(&self, family: BandFamily) -> Option<&ToleranceProfile> {
        self.limits.iter().find(|profile| profile.family == family)
    }
}
