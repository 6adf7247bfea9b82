//! Scripted ephemerides with analytically known geometry.

use crate::catalog::{Catalog, OrbitingObject};
use crate::ephemeris::{EphemerisProvider, PropagationError, StateVector};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{PI, TAU};

pub(crate) const BASE_POSITION: [f64; 3] = [7000.0, 0.0, 0.0];
pub(crate) const BASE_VELOCITY: [f64; 3] = [0.0, 7.5, 0.0];
pub(crate) const FRESH_EPOCH: &str = "2023-12-31T18:00:00Z";
pub(crate) const STALE_EPOCH: &str = "2023-12-30T00:00:00Z";

pub(crate) fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
pub(crate) enum Motion {
    Fixed {
        position: [f64; 3],
        velocity: [f64; 3],
    },
    /// Uniform motion on a circle in the x/y plane; `phase_s` is when the
    /// object sits at `center + (radius, 0, 0)`.
    Circle {
        center: [f64; 3],
        radius_km: f64,
        period_s: f64,
        phase_s: f64,
    },
    Failing,
    FailingBetween {
        from_s: f64,
        to_s: f64,
        inner: Box<Motion>,
    },
}

impl Motion {
    fn state(&self, catalog_id: u32, t: f64) -> Result<StateVector, PropagationError> {
        match self {
            Motion::Fixed { position, velocity } => Ok(StateVector::new(*position, *velocity)),
            Motion::Circle {
                center,
                radius_km,
                period_s,
                phase_s,
            } => {
                let omega = TAU / period_s;
                let theta = omega * (t - phase_s);
                Ok(StateVector::new(
                    [
                        center[0] + radius_km * theta.cos(),
                        center[1] + radius_km * theta.sin(),
                        center[2],
                    ],
                    [
                        BASE_VELOCITY[0] - radius_km * omega * theta.sin(),
                        BASE_VELOCITY[1] + radius_km * omega * theta.cos(),
                        BASE_VELOCITY[2],
                    ],
                ))
            }
            Motion::Failing => Err(PropagationError::Diverged {
                catalog_id,
                reason: "scripted failure".into(),
            }),
            Motion::FailingBetween { from_s, to_s, inner } => {
                if (*from_s..=*to_s).contains(&t) {
                    Err(PropagationError::Decayed {
                        catalog_id,
                        radius_km: 6000.0,
                    })
                } else {
                    inner.state(catalog_id, t)
                }
            }
        }
    }
}

pub(crate) struct ScriptedEphemeris {
    reference: DateTime<Utc>,
    objects: BTreeMap<u32, OrbitingObject>,
    motions: HashMap<u32, Motion>,
}

impl ScriptedEphemeris {
    pub(crate) fn new() -> Self {
        Self {
            reference: reference_time(),
            objects: BTreeMap::new(),
            motions: HashMap::new(),
        }
    }

    /// Object 1 sits still; object 2 circles so that the pair is exactly
    /// `min_distance_km` apart at `tca_s` and again once per period.
    pub(crate) fn circular_pair(min_distance_km: f64, period_s: f64, tca_s: f64) -> Self {
        let mut ephemeris = Self::new();
        ephemeris.add_target();
        ephemeris.add(2, "CHASER", FRESH_EPOCH, Self::circle(min_distance_km, period_s, tca_s));
        ephemeris
    }

    /// Object 2 holds a constant offset of `distance_km` from object 1.
    pub(crate) fn fixed_pair(distance_km: f64) -> Self {
        let mut ephemeris = Self::new();
        ephemeris.add_target();
        ephemeris.add(2, "NEIGHBOUR", FRESH_EPOCH, Self::offset(distance_km));
        ephemeris
    }

    pub(crate) fn circle(min_distance_km: f64, period_s: f64, tca_s: f64) -> Motion {
        let radius_km = 25.0;
        Motion::Circle {
            center: [
                BASE_POSITION[0] + radius_km + min_distance_km,
                BASE_POSITION[1],
                BASE_POSITION[2],
            ],
            radius_km,
            period_s,
            // theta reaches pi at the requested TCA.
            phase_s: tca_s - period_s * PI / TAU,
        }
    }

    pub(crate) fn offset(distance_km: f64) -> Motion {
        Motion::Fixed {
            position: [
                BASE_POSITION[0] + distance_km,
                BASE_POSITION[1],
                BASE_POSITION[2],
            ],
            velocity: [0.0, 0.0, 7.5],
        }
    }

    pub(crate) fn add_target(&mut self) {
        self.add(
            1,
            "TARGET",
            FRESH_EPOCH,
            Motion::Fixed {
                position: BASE_POSITION,
                velocity: BASE_VELOCITY,
            },
        );
    }

    pub(crate) fn add(&mut self, catalog_id: u32, name: &str, epoch: &str, motion: Motion) {
        self.objects
            .insert(catalog_id, OrbitingObject::new(catalog_id, name, epoch));
        self.motions.insert(catalog_id, motion);
    }

    pub(crate) fn set_motion(&mut self, catalog_id: u32, motion: Motion) {
        self.motions.insert(catalog_id, motion);
    }

    pub(crate) fn motion(&self, catalog_id: u32) -> &Motion {
        &self.motions[&catalog_id]
    }

    pub(crate) fn object(&self, catalog_id: u32) -> &OrbitingObject {
        &self.objects[&catalog_id]
    }

    pub(crate) fn catalog(&self) -> Catalog {
        self.objects.values().cloned().collect()
    }
}

impl EphemerisProvider for ScriptedEphemeris {
    fn propagate(
        &self,
        object: &OrbitingObject,
        at: DateTime<Utc>,
    ) -> Result<StateVector, PropagationError> {
        let motion = self
            .motions
            .get(&object.catalog_id)
            .ok_or(PropagationError::UnknownObject(object.catalog_id))?;
        let t = (at - self.reference)
            .num_microseconds()
            .map(|us| us as f64 / 1e6)
            .ok_or_else(|| PropagationError::InvalidState("time offset overflow".into()))?;
        motion.state(object.catalog_id, t)
    }
}
