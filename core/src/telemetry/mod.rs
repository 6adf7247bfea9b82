pub mod events;
pub mod log;
pub mod metrics;

pub use events::{EventCollector, EventSink, ScanEvent, ScanWarning};
pub use self::log::LogManager;
pub use metrics::MetricsRecorder;
