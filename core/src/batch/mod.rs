pub mod condition;
pub mod measurement;
pub mod ordering;
pub mod spread;
pub mod window;

pub use condition::Condition;
pub use measurement::{BatchCounts, BatchSummary, GroupSummary, MeasurementBatch};
pub use ordering::{sort_batches, SortMode};
pub use spread::{CombinedSpread, SpreadSet};
pub use window::{Window, WindowBounds};
