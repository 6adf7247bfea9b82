//! Two-body reference ephemeris for synthetic catalogs.
//!
//! Mean elements are advanced with the unperturbed mean motion and turned
//! into an inertial state through the perifocal frame. Good enough to drive
//! screening scenarios; not a substitute for an operational propagator.

use super::elements::ElementRecord;
use conjcore::catalog::{parse_epoch, OrbitingObject};
use conjcore::ephemeris::{EphemerisProvider, PropagationError, StateVector};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::f64::consts::TAU;

/// Earth gravitational parameter (km^3/s^2).
pub const MU_EARTH: f64 = 398_600.4418;
/// Equatorial radius (km).
pub const EARTH_RADIUS_KM: f64 = 6378.137;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 50;

#[derive(Debug, Clone)]
struct Orbit {
    epoch: DateTime<Utc>,
    semi_major_axis_km: f64,
    eccentricity: f64,
    inclination: f64,
    raan: f64,
    arg_perigee: f64,
    mean_anomaly: f64,
    mean_motion: f64,
}

impl Orbit {
    fn from_record(record: &ElementRecord) -> Result<Self, PropagationError> {
        let epoch = parse_epoch(&record.epoch).map_err(|err| {
            PropagationError::InvalidState(format!("object {}: {}", record.catalog_id, err))
        })?;

        let a = record.semi_major_axis_km;
        let e = record.eccentricity;
        if !a.is_finite() || a <= 0.0 {
            return Err(PropagationError::InvalidState(format!(
                "object {}: semi-major axis {} km",
                record.catalog_id, a
            )));
        }
        if !(0.0..1.0).contains(&e) {
            return Err(PropagationError::InvalidState(format!(
                "object {}: eccentricity {} outside [0, 1)",
                record.catalog_id, e
            )));
        }

        let perigee_km = a * (1.0 - e);
        if perigee_km < EARTH_RADIUS_KM {
            return Err(PropagationError::Decayed {
                catalog_id: record.catalog_id,
                radius_km: perigee_km,
            });
        }

        Ok(Self {
            epoch,
            semi_major_axis_km: a,
            eccentricity: e,
            inclination: record.inclination_deg.to_radians(),
            raan: record.raan_deg.to_radians(),
            arg_perigee: record.arg_perigee_deg.to_radians(),
            mean_anomaly: record.mean_anomaly_deg.to_radians(),
            mean_motion: (MU_EARTH / a.powi(3)).sqrt(),
        })
    }

    fn state_at(&self, catalog_id: u32, at: DateTime<Utc>) -> Result<StateVector, PropagationError> {
        let dt = (at - self.epoch)
            .num_microseconds()
            .map(|us| us as f64 / 1e6)
            .ok_or_else(|| PropagationError::InvalidState("time offset overflow".into()))?;

        let mean_anomaly = (self.mean_anomaly + self.mean_motion * dt).rem_euclid(TAU);
        let e = self.eccentricity;
        let eccentric = eccentric_anomaly(mean_anomaly, e).ok_or_else(|| {
            PropagationError::Diverged {
                catalog_id,
                reason: format!("Kepler iteration failed for M = {:.6} rad", mean_anomaly),
            }
        })?;
        let true_anomaly = 2.0
            * ((1.0 + e).sqrt() * (eccentric / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (eccentric / 2.0).cos());

        Ok(self.perifocal_to_inertial(true_anomaly))
    }

    fn perifocal_to_inertial(&self, nu: f64) -> StateVector {
        let e = self.eccentricity;
        let p = self.semi_major_axis_km * (1.0 - e * e);
        let r = p / (1.0 + e * nu.cos());
        let speed = (MU_EARTH / p).sqrt();

        let r_pqw = [r * nu.cos(), r * nu.sin(), 0.0];
        let v_pqw = [-speed * nu.sin(), speed * (e + nu.cos()), 0.0];

        let (sin_o, cos_o) = self.raan.sin_cos();
        let (sin_w, cos_w) = self.arg_perigee.sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let rotation = [
            [
                cos_o * cos_w - sin_o * sin_w * cos_i,
                -cos_o * sin_w - sin_o * cos_w * cos_i,
                sin_o * sin_i,
            ],
            [
                sin_o * cos_w + cos_o * sin_w * cos_i,
                -sin_o * sin_w + cos_o * cos_w * cos_i,
                -cos_o * sin_i,
            ],
            [sin_w * sin_i, cos_w * sin_i, cos_i],
        ];

        let mut position = [0.0; 3];
        let mut velocity = [0.0; 3];
        for (row, axis) in rotation.iter().enumerate() {
            for column in 0..3 {
                position[row] += axis[column] * r_pqw[column];
                velocity[row] += axis[column] * v_pqw[column];
            }
        }
        StateVector::new(position, velocity)
    }
}

/// Solves M = E - e sin(E) by Newton iteration. `None` if it does not settle.
fn eccentric_anomaly(mean_anomaly: f64, e: f64) -> Option<f64> {
    let mut eccentric = if e < 0.8 { mean_anomaly } else { std::f64::consts::PI };
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let delta = (eccentric - e * eccentric.sin() - mean_anomaly) / (1.0 - e * eccentric.cos());
        eccentric -= delta;
        if !eccentric.is_finite() {
            return None;
        }
        if delta.abs() < KEPLER_TOLERANCE {
            return Some(eccentric);
        }
    }
    None
}

/// Ephemeris provider over a set of element records.
///
/// Records that cannot be propagated at all (bad epoch, perigee below the
/// surface) are kept and reported on every request.
pub struct KeplerEphemeris {
    orbits: HashMap<u32, Result<Orbit, PropagationError>>,
}

impl KeplerEphemeris {
    pub fn from_records(records: &[ElementRecord]) -> Self {
        let orbits = records
            .iter()
            .map(|record| (record.catalog_id, Orbit::from_record(record)))
            .collect();
        Self { orbits }
    }

    pub fn object_count(&self) -> usize {
        self.orbits.len()
    }

    /// Records that will fail every propagation request.
    pub fn unusable(&self) -> usize {
        self.orbits.values().filter(|orbit| orbit.is_err()).count()
    }
}

impl EphemerisProvider for KeplerEphemeris {
    fn propagate(
        &self,
        object: &OrbitingObject,
        at: DateTime<Utc>,
    ) -> Result<StateVector, PropagationError> {
        match self.orbits.get(&object.catalog_id) {
            Some(Ok(orbit)) => orbit.state_at(object.catalog_id, at),
            Some(Err(err)) => Err(err.clone()),
            None => Err(PropagationError::UnknownObject(object.catalog_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    const EPOCH: &str = "2024-01-01T00:00:00Z";

    fn record(catalog_id: u32, a: f64, e: f64) -> ElementRecord {
        ElementRecord {
            catalog_id,
            name: format!("OBJ-{}", catalog_id),
            epoch: EPOCH.into(),
            semi_major_axis_km: a,
            eccentricity: e,
            inclination_deg: 51.6,
            raan_deg: 30.0,
            arg_perigee_deg: 10.0,
            mean_anomaly_deg: 45.0,
        }
    }

    fn norm(v: &[f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn circular_orbit_keeps_radius_and_speed() {
        let rec = record(1, 6798.0, 0.0);
        let ephemeris = KeplerEphemeris::from_records(&[rec.clone()]);
        let epoch = parse_epoch(EPOCH).unwrap();

        for minutes in [0, 17, 45, 90] {
            let state = ephemeris
                .propagate(&rec.object(), epoch + Duration::minutes(minutes))
                .unwrap();
            assert_relative_eq!(norm(&state.position), 6798.0, max_relative = 1e-10);
            assert_relative_eq!(
                norm(&state.velocity),
                (MU_EARTH / 6798.0).sqrt(),
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn returns_to_start_after_one_period() {
        let rec = record(2, 7200.0, 0.05);
        let ephemeris = KeplerEphemeris::from_records(&[rec.clone()]);
        let epoch = parse_epoch(EPOCH).unwrap();
        let period_us = (TAU / (MU_EARTH / 7200.0f64.powi(3)).sqrt() * 1e6).round() as i64;

        let start = ephemeris.propagate(&rec.object(), epoch).unwrap();
        let later = ephemeris
            .propagate(&rec.object(), epoch + Duration::microseconds(period_us))
            .unwrap();
        for axis in 0..3 {
            assert!((start.position[axis] - later.position[axis]).abs() < 1e-3);
        }
    }

    #[test]
    fn kepler_solution_satisfies_equation() {
        for &(m, e) in &[(0.3, 0.0), (1.0, 0.1), (3.0, 0.7), (5.5, 0.95)] {
            let eccentric = eccentric_anomaly(m, e).unwrap();
            assert_relative_eq!(eccentric - e * eccentric.sin(), m, epsilon = 1e-10);
        }
    }

    #[test]
    fn unusable_records_report_their_reason() {
        let mut bad_epoch = record(3, 7000.0, 0.0);
        bad_epoch.epoch = "yesterday".into();
        let records = [record(4, 6500.0, 0.1), bad_epoch.clone(), record(5, 7000.0, 1.2)];
        let ephemeris = KeplerEphemeris::from_records(&records);
        let at = parse_epoch(EPOCH).unwrap();

        assert_eq!(ephemeris.object_count(), 3);
        assert_eq!(ephemeris.unusable(), 3);
        assert!(matches!(
            ephemeris.propagate(&records[0].object(), at),
            Err(PropagationError::Decayed { catalog_id: 4, .. })
        ));
        assert!(matches!(
            ephemeris.propagate(&bad_epoch.object(), at),
            Err(PropagationError::InvalidState(_))
        ));
        assert!(matches!(
            ephemeris.propagate(&records[2].object(), at),
            Err(PropagationError::InvalidState(_))
        ));
        assert_eq!(
            ephemeris.propagate(&OrbitingObject::new(99, "GHOST", EPOCH), at),
            Err(PropagationError::UnknownObject(99))
        );
    }
}
