pub mod approach;
pub mod object;
pub mod window;

pub use approach::{sort_for_report, AlertLevel, AlertThresholds, CloseApproach, ObjectSummary};
pub use object::{parse_epoch, Catalog, EpochError, OrbitingObject};
pub use window::{CandidateMinimum, DistanceSample, TimeWindow};
