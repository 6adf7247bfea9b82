//! Per-pair search for distance minima.
//!
//! One bounded minimization only finds one minimum, while two objects in
//! different orbits pass each other several times over a multi-day window.
//! The window is therefore cut into equal segments and each segment is
//! minimized on its own.

use crate::catalog::{CandidateMinimum, DistanceSample, OrbitingObject, TimeWindow};
use crate::ephemeris::EphemerisProvider;
use crate::math::vector;
use crate::math::ScalarMinimizer;
use log::trace;
use std::cell::Cell;

/// Equal-length partition of the scan window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlan {
    pub count: usize,
    pub length_s: f64,
}

impl SegmentPlan {
    /// `max(1, floor(window / segment))` segments; any remainder is spread
    /// over all of them instead of forming a short trailing segment.
    pub fn new(window_s: f64, segment_hours: f64) -> Self {
        let count = ((window_s / 3600.0 / segment_hours).floor() as usize).max(1);
        Self {
            count,
            length_s: window_s / count as f64,
        }
    }

    pub fn bounds(&self, index: usize) -> (f64, f64) {
        (
            index as f64 * self.length_s,
            (index + 1) as f64 * self.length_s,
        )
    }

    pub fn segments(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.count).map(move |index| self.bounds(index))
    }
}

/// Separation between two objects as a function of window offset.
pub struct PairGeometry<'a> {
    provider: &'a dyn EphemerisProvider,
    target: &'a OrbitingObject,
    other: &'a OrbitingObject,
    window: &'a TimeWindow,
    failed_samples: Cell<usize>,
}

impl<'a> PairGeometry<'a> {
    pub fn new(
        provider: &'a dyn EphemerisProvider,
        target: &'a OrbitingObject,
        other: &'a OrbitingObject,
        window: &'a TimeWindow,
    ) -> Self {
        Self {
            provider,
            target,
            other,
            window,
            failed_samples: Cell::new(0),
        }
    }

    /// Distance at `offset_s`; `+inf` when either object cannot be propagated.
    pub fn sample(&self, offset_s: f64) -> DistanceSample {
        let at = self.window.at(offset_s);
        let states = self.provider.propagate(self.target, at).and_then(|target| {
            self.provider
                .propagate(self.other, at)
                .map(|other| (target, other))
        });

        let distance_km = match states {
            Ok((target, other)) => vector::distance(&target.position, &other.position),
            Err(err) => {
                trace!(
                    "sample {} vs {} at {:.1}s failed: {}",
                    self.target.catalog_id,
                    self.other.catalog_id,
                    offset_s,
                    err
                );
                self.failed_samples.set(self.failed_samples.get() + 1);
                f64::INFINITY
            }
        };

        DistanceSample {
            offset_s,
            distance_km,
        }
    }

    pub fn failed_samples(&self) -> usize {
        self.failed_samples.get()
    }
}

/// Minima collected for one pair across all segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairMinima {
    pub candidates: Vec<CandidateMinimum>,
    pub segments: usize,
    pub failed_segments: usize,
    pub failed_samples: usize,
}

pub struct SegmentSearch<'a> {
    provider: &'a dyn EphemerisProvider,
    minimizer: &'a dyn ScalarMinimizer,
    plan: SegmentPlan,
    tolerance_s: f64,
    screening_threshold_km: f64,
}

impl<'a> SegmentSearch<'a> {
    pub fn new(
        provider: &'a dyn EphemerisProvider,
        minimizer: &'a dyn ScalarMinimizer,
        plan: SegmentPlan,
        tolerance_s: f64,
        screening_threshold_km: f64,
    ) -> Self {
        Self {
            provider,
            minimizer,
            plan,
            tolerance_s,
            screening_threshold_km,
        }
    }

    pub fn search(
        &self,
        target: &OrbitingObject,
        other: &OrbitingObject,
        window: &TimeWindow,
    ) -> PairMinima {
        let geometry = PairGeometry::new(self.provider, target, other, window);
        let objective = |offset_s: f64| geometry.sample(offset_s).distance_km;

        let mut minima = PairMinima {
            segments: self.plan.count,
            ..Default::default()
        };

        for (index, bounds) in self.plan.segments().enumerate() {
            match self.minimizer.minimize(&objective, bounds, self.tolerance_s) {
                Ok(minimum) if minimum.value < self.screening_threshold_km => {
                    minima
                        .candidates
                        .push(CandidateMinimum::new(minimum.x, minimum.value));
                }
                Ok(_) => {}
                Err(err) => {
                    trace!(
                        "segment {} for {} vs {} skipped: {}",
                        index,
                        target.catalog_id,
                        other.catalog_id,
                        err
                    );
                    minima.failed_segments += 1;
                }
            }
        }

        minima.failed_samples = geometry.failed_samples();
        minima
    }
}
