use crate::catalog::{AlertLevel, CloseApproach, ObjectSummary, TimeWindow};
use crate::math::StatsHelper;
use crate::telemetry::ScanWarning;
use serde::Serialize;
use std::collections::BTreeSet;

/// Aggregate counters for one scan. Every recoverable failure ends up here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanStatistics {
    pub catalog_size: usize,
    pub epoch_stale: usize,
    pub epoch_unparsable: usize,
    pub filter_fallback: bool,
    pub target_forced: bool,
    pub objects_screened: usize,
    pub pairs_completed: usize,
    pub pairs_skipped: usize,
    pub segments_searched: usize,
    pub failed_segments: usize,
    pub failed_samples: usize,
    /// Pairs with at least one failed sample, segment or TCA propagation.
    pub pairs_with_failures: usize,
    /// Segment minima below the screening threshold, before deduplication.
    pub minima_found: usize,
    pub minima_after_dedup: usize,
    pub docked_dropped: usize,
    pub distant_dropped: usize,
    pub tca_propagation_dropped: usize,
    pub approaches: usize,
    /// Smallest raw minimum at or above the docking floor.
    pub min_distance_seen_km: Option<f64>,
    pub cancelled: bool,
    pub warnings: usize,
}

/// Min/max/mean over the reported approaches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApproachSummary {
    pub min_distance_km: f64,
    pub max_distance_km: f64,
    pub mean_distance_km: f64,
    pub min_velocity_km_s: f64,
    pub max_velocity_km_s: f64,
    pub mean_velocity_km_s: f64,
}

/// Result of a scan, approaches in report order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub target: ObjectSummary,
    pub window: TimeWindow,
    pub approaches: Vec<CloseApproach>,
    pub statistics: ScanStatistics,
    pub warnings: Vec<ScanWarning>,
}

impl ScanReport {
    pub fn count_by_level(&self, level: AlertLevel) -> usize {
        self.approaches
            .iter()
            .filter(|approach| approach.alert_level() == level)
            .count()
    }

    /// Distinct catalog ids that come within the reporting threshold.
    pub fn unique_objects_at_risk(&self) -> usize {
        self.approaches
            .iter()
            .map(|approach| approach.other().catalog_id)
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn summary(&self) -> Option<ApproachSummary> {
        let distances: Vec<f64> = self.approaches.iter().map(|a| a.distance_km()).collect();
        let velocities: Vec<f64> = self
            .approaches
            .iter()
            .map(|a| a.relative_velocity_km_s())
            .collect();

        let (min_distance_km, max_distance_km) = StatsHelper::range(&distances)?;
        let (min_velocity_km_s, max_velocity_km_s) = StatsHelper::range(&velocities)?;
        Some(ApproachSummary {
            min_distance_km,
            max_distance_km,
            mean_distance_km: StatsHelper::mean(&distances)?,
            min_velocity_km_s,
            max_velocity_km_s,
            mean_velocity_km_s: StatsHelper::mean(&velocities)?,
        })
    }
}
