use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Scan window: offsets are seconds from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub duration_s: f64,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, duration_s: f64) -> Self {
        Self { start, duration_s }
    }

    pub fn from_hours(start: DateTime<Utc>, hours: f64) -> Self {
        Self::new(start, hours * 3600.0)
    }

    /// Like `from_hours`, but `None` when the window end is not a
    /// representable instant.
    pub fn checked_from_hours(start: DateTime<Utc>, hours: f64) -> Option<Self> {
        let window = Self::from_hours(start, hours);
        let micros = (window.duration_s * 1e6).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return None;
        }
        start.checked_add_signed(Duration::microseconds(micros as i64))?;
        Some(window)
    }

    /// Absolute time at `offset_s`, resolved to the microsecond.
    pub fn at(&self, offset_s: f64) -> DateTime<Utc> {
        self.start + Duration::microseconds((offset_s * 1e6).round() as i64)
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.at(self.duration_s)
    }

    pub fn contains_offset(&self, offset_s: f64) -> bool {
        (0.0..=self.duration_s).contains(&offset_s)
    }
}

/// One evaluation of the pair distance function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSample {
    pub offset_s: f64,
    pub distance_km: f64,
}

/// A segment minimum that passed screening, possibly merged with neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateMinimum {
    pub offset_s: f64,
    pub distance_km: f64,
}

impl CandidateMinimum {
    pub fn new(offset_s: f64, distance_km: f64) -> Self {
        Self {
            offset_s,
            distance_km,
        }
    }
}
