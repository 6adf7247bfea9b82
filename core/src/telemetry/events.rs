use crate::catalog::{ObjectSummary, TimeWindow};
use crate::screening::ScanStatistics;
use std::fmt;
use std::sync::Mutex;

/// Structured progress stream of a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Started {
        target: ObjectSummary,
        objects: usize,
        segments: usize,
        window: TimeWindow,
        min_distance_km: f64,
        threshold_km: f64,
    },
    Warning(ScanWarning),
    Progress {
        completed: usize,
        total: usize,
    },
    Finished(ScanStatistics),
}

/// Recoverable conditions worth surfacing to an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanWarning {
    UnparsableEpochs { count: usize, first: u32 },
    FilterFallback { fresh: usize, total: usize },
    TargetForceIncluded { catalog_id: u32 },
    NoOtherObjects { catalog_size: usize },
    Cancelled { completed: usize, total: usize },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::UnparsableEpochs { count, first } => write!(
                f,
                "{} objects with unparsable epochs excluded (first: {})",
                count, first
            ),
            ScanWarning::FilterFallback { fresh, total } => write!(
                f,
                "only {} of {} objects have fresh epochs, screening the full catalog",
                fresh, total
            ),
            ScanWarning::TargetForceIncluded { catalog_id } => write!(
                f,
                "target {} excluded by epoch filter, adding it back",
                catalog_id
            ),
            ScanWarning::NoOtherObjects { catalog_size } => write!(
                f,
                "no other objects to screen ({} in catalog), try a larger epoch age",
                catalog_size
            ),
            ScanWarning::Cancelled { completed, total } => write!(
                f,
                "scan cancelled after {} of {} pairs",
                completed, total
            ),
        }
    }
}

/// Consumer of scan events. Called from worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ScanEvent);
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Mutex<Vec<ScanEvent>>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<ScanWarning> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ScanEvent::Warning(warning) => Some(warning),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventCollector {
    fn emit(&self, event: &ScanEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit(&self, event: &ScanEvent) {
        (**self).emit(event)
    }
}
