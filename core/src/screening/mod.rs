pub mod cancel;
pub mod classifier;
pub mod dedup;
pub mod epoch_filter;
pub mod report;
pub mod scanner;
pub mod segment_search;

pub use cancel::CancelToken;
pub use classifier::{Classification, Classifier};
pub use dedup::Deduplicator;
pub use epoch_filter::{EpochFilter, EpochSelection, ScanSet};
pub use report::{ApproachSummary, ScanReport, ScanStatistics};
pub use scanner::{PairOutcome, Screener};
pub use segment_search::{PairGeometry, PairMinima, SegmentPlan, SegmentSearch};
