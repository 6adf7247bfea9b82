//! Scan orchestration: screens every object in the catalog against one target.

use crate::catalog::{sort_for_report, Catalog, CloseApproach, OrbitingObject, TimeWindow};
use crate::ephemeris::EphemerisProvider;
use crate::math::ScalarMinimizer;
use crate::prelude::{ScanError, ScreenResult, ScreeningConfig};
use crate::screening::cancel::CancelToken;
use crate::screening::classifier::{Classification, Classifier};
use crate::screening::dedup::Deduplicator;
use crate::screening::epoch_filter::EpochFilter;
use crate::screening::report::{ScanReport, ScanStatistics};
use crate::screening::segment_search::{PairMinima, SegmentPlan, SegmentSearch};
use crate::telemetry::{EventSink, LogManager, MetricsRecorder, ScanEvent, ScanWarning};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;

const PROGRESS_EVERY: usize = 100;

/// Everything one target/other pair contributed to the scan.
#[derive(Debug, Clone, Default)]
pub struct PairOutcome {
    pub approaches: Vec<CloseApproach>,
    pub minima: PairMinima,
    pub merged_minima: usize,
    pub min_distance_seen_km: Option<f64>,
    pub docked: usize,
    pub distant: usize,
    pub propagation_failed: usize,
}

impl PairOutcome {
    fn had_failures(&self) -> bool {
        self.minima.failed_samples > 0 || self.minima.failed_segments > 0 || self.propagation_failed > 0
    }
}

/// Conjunction screener bound to one ephemeris provider and minimizer.
pub struct Screener<P, M> {
    config: ScreeningConfig,
    provider: P,
    minimizer: M,
    sink: Arc<dyn EventSink>,
}

impl<P: EphemerisProvider, M: ScalarMinimizer> Screener<P, M> {
    pub fn new(config: ScreeningConfig, provider: P, minimizer: M) -> Self {
        Self {
            config,
            provider,
            minimizer,
            sink: Arc::new(LogManager::new()),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Screens `target_id` against the catalog over `[start, start + hours]`.
    ///
    /// Only an empty catalog, a missing target or an invalid configuration
    /// fail the scan; all per-pair problems are folded into the statistics.
    pub fn scan(
        &self,
        catalog: &Catalog,
        target_id: u32,
        start: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> ScreenResult<ScanReport> {
        self.config.validate()?;

        let set = EpochFilter::from_config(&self.config).select_for_target(catalog, target_id, start)?;
        let window = TimeWindow::checked_from_hours(start, self.config.hours).ok_or_else(|| {
            ScanError::InvalidConfig(format!(
                "a {} hour window starting {} ends beyond the representable time range",
                self.config.hours, start
            ))
        })?;
        let plan = SegmentPlan::new(window.duration_s, self.config.segment_hours);
        let mut warnings = set.warnings.clone();

        for warning in &warnings {
            self.sink.emit(&ScanEvent::Warning(warning.clone()));
        }
        self.sink.emit(&ScanEvent::Started {
            target: set.target.into(),
            objects: set.others.len(),
            segments: plan.count,
            window,
            min_distance_km: self.config.min_distance_km,
            threshold_km: self.config.threshold_km,
        });

        let search = SegmentSearch::new(
            &self.provider,
            &self.minimizer,
            plan,
            self.config.minimizer_tolerance_s,
            self.config.screening_threshold_km,
        );
        let dedup = Deduplicator::new(self.config.dedup_merge_seconds);
        let classifier = Classifier::new(&self.provider, &self.config);
        let metrics = MetricsRecorder::new();
        let total = set.others.len();

        let outcomes: Vec<Option<PairOutcome>> = set
            .others
            .par_iter()
            .map(|other| {
                if cancel.is_cancelled() {
                    return None;
                }
                let outcome = self.screen_pair(&search, &dedup, &classifier, set.target, other, &window);
                let completed = metrics.record_pair(outcome.had_failures());
                if completed % PROGRESS_EVERY == 0 || completed == total {
                    self.sink.emit(&ScanEvent::Progress { completed, total });
                }
                Some(outcome)
            })
            .collect();

        let mut statistics = ScanStatistics {
            catalog_size: catalog.len(),
            epoch_stale: set.selection.stale,
            epoch_unparsable: set.selection.unparsable.len(),
            filter_fallback: set.fell_back,
            target_forced: set.target_forced,
            objects_screened: total,
            ..Default::default()
        };
        let mut approaches = Vec::new();

        for outcome in outcomes {
            let Some(outcome) = outcome else {
                statistics.pairs_skipped += 1;
                continue;
            };
            statistics.pairs_completed += 1;
            statistics.segments_searched += outcome.minima.segments;
            statistics.failed_segments += outcome.minima.failed_segments;
            statistics.failed_samples += outcome.minima.failed_samples;
            statistics.minima_found += outcome.minima.candidates.len();
            statistics.minima_after_dedup += outcome.merged_minima;
            statistics.docked_dropped += outcome.docked;
            statistics.distant_dropped += outcome.distant;
            statistics.tca_propagation_dropped += outcome.propagation_failed;
            statistics.min_distance_seen_km = min_option(
                statistics.min_distance_seen_km,
                outcome.min_distance_seen_km,
            );
            approaches.extend(outcome.approaches);
        }

        statistics.pairs_with_failures = metrics.snapshot().1;

        if statistics.pairs_skipped > 0 {
            statistics.cancelled = true;
            let warning = ScanWarning::Cancelled {
                completed: statistics.pairs_completed,
                total,
            };
            self.sink.emit(&ScanEvent::Warning(warning.clone()));
            warnings.push(warning);
        }

        sort_for_report(&mut approaches);
        statistics.approaches = approaches.len();
        statistics.warnings = warnings.len();
        self.sink.emit(&ScanEvent::Finished(statistics.clone()));

        Ok(ScanReport {
            target: set.target.into(),
            window,
            approaches,
            statistics,
            warnings,
        })
    }

    fn screen_pair(
        &self,
        search: &SegmentSearch<'_>,
        dedup: &Deduplicator,
        classifier: &Classifier<'_>,
        target: &OrbitingObject,
        other: &OrbitingObject,
        window: &TimeWindow,
    ) -> PairOutcome {
        let minima = search.search(target, other, window);
        let min_distance_seen_km = minima
            .candidates
            .iter()
            .map(|candidate| candidate.distance_km)
            .filter(|&distance| distance >= self.config.min_distance_km)
            .fold(None, |seen, distance| min_option(seen, Some(distance)));

        let merged = dedup.merge(minima.candidates.clone());
        let mut outcome = PairOutcome {
            merged_minima: merged.len(),
            min_distance_seen_km,
            ..Default::default()
        };

        for candidate in &merged {
            match classifier.classify(target, other, window, candidate) {
                Classification::Accepted(approach) => outcome.approaches.push(approach),
                Classification::Docked { .. } => outcome.docked += 1,
                Classification::Distant { .. } => outcome.distant += 1,
                Classification::PropagationFailed(_) => outcome.propagation_failed += 1,
            }
        }

        outcome.minima = minima;
        outcome
    }
}

fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
