use crate::catalog::AlertThresholds;
use serde::{Deserialize, Serialize};

/// Tunables shared by every screening component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Upper reporting bound for a close approach (km).
    pub threshold_km: f64,
    /// Approaches closer than this are treated as docked or co-located (km).
    pub min_distance_km: f64,
    /// Segment minima below this distance are kept for refinement (km).
    pub screening_threshold_km: f64,
    pub max_epoch_age_days: f64,
    /// Scan window length.
    pub hours: f64,
    pub segment_hours: f64,
    pub dedup_merge_seconds: f64,
    pub minimizer_tolerance_s: f64,
    /// Below this many fresh objects the epoch filter falls back to the full catalog.
    pub min_filtered_objects: usize,
    pub alert_thresholds: AlertThresholds,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            threshold_km: 50.0,
            min_distance_km: 0.1,
            screening_threshold_km: 100.0,
            max_epoch_age_days: 1.0,
            hours: 72.0,
            segment_hours: 4.0,
            dedup_merge_seconds: 300.0,
            minimizer_tolerance_s: 1.0,
            min_filtered_objects: 1,
            alert_thresholds: AlertThresholds::default(),
        }
    }
}

impl ScreeningConfig {
    pub fn window_seconds(&self) -> f64 {
        self.hours * 3600.0
    }

    pub fn validate(&self) -> ScreenResult<()> {
        let positive = [
            ("hours", self.hours),
            ("segment_hours", self.segment_hours),
            ("minimizer_tolerance_s", self.minimizer_tolerance_s),
            ("threshold_km", self.threshold_km),
            ("screening_threshold_km", self.screening_threshold_km),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScanError::InvalidConfig(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("min_distance_km", self.min_distance_km),
            ("max_epoch_age_days", self.max_epoch_age_days),
            ("dedup_merge_seconds", self.dedup_merge_seconds),
        ];
        for (name, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ScanError::InvalidConfig(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if self.min_distance_km > self.threshold_km {
            return Err(ScanError::InvalidConfig(format!(
                "min_distance_km {} exceeds threshold_km {}",
                self.min_distance_km, self.threshold_km
            )));
        }

        self.alert_thresholds.validate()
    }
}

/// Conditions that abort a scan. Everything else is absorbed into statistics.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("catalog is empty")]
    EmptyCatalog,
    #[error("target object {0} not found in catalog")]
    TargetNotFound(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ScreenResult<T> = Result<T, ScanError>;
