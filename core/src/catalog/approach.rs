use crate::catalog::OrbitingObject;
use crate::ephemeris::StateVector;
use crate::math::vector;
use crate::prelude::{ScanError, ScreenResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk band of a close approach. Declaration order is reporting priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Red,
    Yellow,
    Green,
}

impl AlertLevel {
    pub const ALL: [AlertLevel; 3] = [AlertLevel::Red, AlertLevel::Yellow, AlertLevel::Green];

    pub fn classify(distance_km: f64, thresholds: &AlertThresholds) -> Self {
        if distance_km < thresholds.red_km {
            AlertLevel::Red
        } else if distance_km < thresholds.yellow_km {
            AlertLevel::Yellow
        } else {
            AlertLevel::Green
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Red => "RED",
            AlertLevel::Yellow => "YELLOW",
            AlertLevel::Green => "GREEN",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AlertLevel::Red => "[!!!]",
            AlertLevel::Yellow => "[!!]",
            AlertLevel::Green => "[OK]",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds (km, exclusive) of the RED and YELLOW bands; GREEN runs to `green_km`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub red_km: f64,
    pub yellow_km: f64,
    pub green_km: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            red_km: 10.0,
            yellow_km: 25.0,
            green_km: 50.0,
        }
    }
}

impl AlertThresholds {
    pub fn validate(&self) -> ScreenResult<()> {
        let ordered = 0.0 < self.red_km && self.red_km <= self.yellow_km && self.yellow_km <= self.green_km;
        if !ordered {
            return Err(ScanError::InvalidConfig(format!(
                "alert thresholds must satisfy 0 < red <= yellow <= green, got {}/{}/{}",
                self.red_km, self.yellow_km, self.green_km
            )));
        }
        Ok(())
    }
}

/// Identity of one side of an approach, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub catalog_id: u32,
    pub name: String,
}

impl From<&OrbitingObject> for ObjectSummary {
    fn from(object: &OrbitingObject) -> Self {
        Self {
            catalog_id: object.catalog_id,
            name: object.name.clone(),
        }
    }
}

/// A confirmed close approach between the target and another object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseApproach {
    tca: DateTime<Utc>,
    target: ObjectSummary,
    other: ObjectSummary,
    distance_km: f64,
    target_state: StateVector,
    other_state: StateVector,
    relative_velocity_km_s: f64,
    alert_level: AlertLevel,
}

impl CloseApproach {
    /// Builds the record from both states at TCA; distance, relative speed
    /// and alert level are derived here.
    pub fn new(
        tca: DateTime<Utc>,
        target: &OrbitingObject,
        other: &OrbitingObject,
        target_state: StateVector,
        other_state: StateVector,
        thresholds: &AlertThresholds,
    ) -> Self {
        let distance_km = vector::distance(&target_state.position, &other_state.position);
        let relative_velocity_km_s = vector::distance(&target_state.velocity, &other_state.velocity);
        Self {
            tca,
            target: target.into(),
            other: other.into(),
            distance_km,
            target_state,
            other_state,
            relative_velocity_km_s,
            alert_level: AlertLevel::classify(distance_km, thresholds),
        }
    }

    pub fn tca(&self) -> DateTime<Utc> {
        self.tca
    }

    pub fn target(&self) -> &ObjectSummary {
        &self.target
    }

    pub fn other(&self) -> &ObjectSummary {
        &self.other
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn target_state(&self) -> &StateVector {
        &self.target_state
    }

    pub fn other_state(&self) -> &StateVector {
        &self.other_state
    }

    pub fn relative_velocity_km_s(&self) -> f64 {
        self.relative_velocity_km_s
    }

    pub fn alert_level(&self) -> AlertLevel {
        self.alert_level
    }
}

/// Orders approaches RED first, then by ascending distance.
pub fn sort_for_report(approaches: &mut [CloseApproach]) {
    approaches.sort_by(|a, b| {
        a.alert_level
            .cmp(&b.alert_level)
            .then(a.distance_km.total_cmp(&b.distance_km))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn approach_at(distance_km: f64) -> CloseApproach {
        let target = OrbitingObject::new(1, "TARGET", "2024-01-01T00:00:00Z");
        let other = OrbitingObject::new(2, "OTHER", "2024-01-01T00:00:00Z");
        CloseApproach::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
            &target,
            &other,
            StateVector::new([7000.0, 0.0, 0.0], [0.0, 7.5, 0.0]),
            StateVector::new([7000.0 + distance_km, 0.0, 0.0], [0.0, 0.0, 7.5]),
            &AlertThresholds::default(),
        )
    }

    #[test]
    fn band_boundaries_follow_half_open_intervals() {
        let thresholds = AlertThresholds::default();
        assert_eq!(AlertLevel::classify(9.999, &thresholds), AlertLevel::Red);
        assert_eq!(AlertLevel::classify(10.0, &thresholds), AlertLevel::Yellow);
        assert_eq!(AlertLevel::classify(24.999, &thresholds), AlertLevel::Yellow);
        assert_eq!(AlertLevel::classify(25.0, &thresholds), AlertLevel::Green);
        assert_eq!(AlertLevel::classify(49.9, &thresholds), AlertLevel::Green);
    }

    #[test]
    fn record_derives_distance_and_relative_speed() {
        let approach = approach_at(12.0);
        assert_relative_eq!(approach.distance_km(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(
            approach.relative_velocity_km_s(),
            (2.0f64 * 7.5 * 7.5).sqrt(),
            epsilon = 1e-12
        );
        assert_eq!(approach.alert_level(), AlertLevel::Yellow);
        assert_eq!(approach.other().catalog_id, 2);
    }

    #[test]
    fn report_order_is_level_then_distance() {
        let mut approaches = vec![
            approach_at(30.0),
            approach_at(9.0),
            approach_at(26.0),
            approach_at(11.0),
            approach_at(2.0),
        ];
        sort_for_report(&mut approaches);
        let distances: Vec<f64> = approaches
            .iter()
            .map(|a| (a.distance_km() * 1e6).round() / 1e6)
            .collect();
        assert_eq!(distances, vec![2.0, 9.0, 11.0, 26.0, 30.0]);
    }

    #[test]
    fn alert_level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&AlertLevel::Yellow).unwrap(), "\"YELLOW\"");
        assert!(AlertLevel::Red < AlertLevel::Green);
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let thresholds = AlertThresholds {
            red_km: 30.0,
            yellow_km: 25.0,
            green_km: 50.0,
        };
        assert!(thresholds.validate().is_err());
    }
}
