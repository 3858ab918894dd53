//! Measurement aggregation and compensation engine for RF calibration profiles.
//!
//! Test results are grouped per calibration target into a [`MeasurementBatch`],
//! which windows them by the target's calibration history, computes spreads
//! against the tolerance profile, rates the target's condition and carries the
//! compensation an operator applies back onto the baseline.

pub mod batch;
pub mod math;
pub mod prelude;
pub mod profile;
pub mod telemetry;

pub use batch::{Condition, MeasurementBatch, SortMode, Window};
pub use prelude::{CoreError, CoreResult};
pub use profile::{CalibrationTarget, Compensation, MeasurementRecord, ToleranceProfile};
