pub mod band;
pub mod compensation;
pub mod history;
pub mod limits;
pub mod record;
pub mod table;
pub mod target;

pub use band::{Band, BandFamily, BandGroup, BandKey, Channel, Direction, DivisorPolicy};
pub use compensation::Compensation;
pub use history::{EventKind, History, HistoryEvent};
pub use limits::{BandLimits, ToleranceProfile, ToleranceWindow};
pub use record::{BandReading, MeasurementRecord, Verdict};
pub use table::{BandTable, Triplet};
pub use target::CalibrationTarget;
