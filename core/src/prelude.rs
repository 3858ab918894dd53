use crate::profile::band::{Band, BandFamily};

/// Common error type for the aggregation engine.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("target {serial} has no applied compensation to revert")]
    NothingToRevert { serial: String },
    #[error("target {serial} has no applied compensation to commit")]
    NothingToCommit { serial: String },
    #[error("{0} not computed yet")]
    MissingStage(&'static str),
    #[error("tolerance profile for {family} has no limits for band {band}")]
    MissingLimits { family: BandFamily, band: Band },
    #[error("profile family {profile} does not match target family {target}")]
    FamilyMismatch {
        profile: BandFamily,
        target: BandFamily,
    },
    #[error("compensation touches band {band} outside family {family}")]
    BandOutsideFamily { family: BandFamily, band: Band },
    #[error("unknown band key: {0}")]
    UnknownBandKey(String),
    #[error("unknown sort mode: {0}")]
    UnknownSortMode(String),
    #[error("invalid tolerance window width: {0}")]
    InvalidToleranceWidth(u8),
    #[error("invalid condition value: {0}")]
    InvalidCondition(u8),
}

pub type CoreResult<T> = Result<T, CoreError>;
