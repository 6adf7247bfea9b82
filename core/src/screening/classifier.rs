use crate::catalog::{AlertThresholds, CandidateMinimum, CloseApproach, OrbitingObject, TimeWindow};
use crate::ephemeris::{EphemerisProvider, PropagationError};
use crate::prelude::ScreeningConfig;

/// What became of one deduplicated candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Accepted(CloseApproach),
    /// Closer than the docking floor: stacked or duplicate catalog entries.
    Docked { distance_km: f64 },
    Distant { distance_km: f64 },
    PropagationFailed(PropagationError),
}

/// Confirms candidates at their exact TCA and turns them into records.
pub struct Classifier<'a> {
    provider: &'a dyn EphemerisProvider,
    min_distance_km: f64,
    threshold_km: f64,
    thresholds: AlertThresholds,
}

impl<'a> Classifier<'a> {
    pub fn new(provider: &'a dyn EphemerisProvider, config: &ScreeningConfig) -> Self {
        Self {
            provider,
            min_distance_km: config.min_distance_km,
            threshold_km: config.threshold_km,
            thresholds: config.alert_thresholds,
        }
    }

    pub fn classify(
        &self,
        target: &OrbitingObject,
        other: &OrbitingObject,
        window: &TimeWindow,
        candidate: &CandidateMinimum,
    ) -> Classification {
        debug_assert!(window.contains_offset(candidate.offset_s));
        let tca = window.at(candidate.offset_s);
        let states = self.provider.propagate(target, tca).and_then(|target_state| {
            self.provider
                .propagate(other, tca)
                .map(|other_state| (target_state, other_state))
        });

        let (target_state, other_state) = match states {
            Ok(states) => states,
            Err(err) => return Classification::PropagationFailed(err),
        };

        let approach = CloseApproach::new(
            tca,
            target,
            other,
            target_state,
            other_state,
            &self.thresholds,
        );
        let distance_km = approach.distance_km();

        if distance_km < self.min_distance_km {
            Classification::Docked { distance_km }
        } else if distance_km <= self.threshold_km {
            Classification::Accepted(approach)
        } else {
            Classification::Distant { distance_km }
        }
    }
}
