//! Contract with the ephemeris provider.
//!
//! The provider owns every object's propagatable state (elements, model
//! coefficients) and resolves it from the catalog id. The search engine only
//! asks for positions and velocities at instants inside the scan window.

use crate::catalog::OrbitingObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inertial state of an object at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Position (km): [x, y, z]
    pub position: [f64; 3],
    /// Velocity (km/s): [vx, vy, vz]
    pub velocity: [f64; 3],
}

impl StateVector {
    pub fn new(position: [f64; 3], velocity: [f64; 3]) -> Self {
        Self { position, velocity }
    }
}

/// Reasons a provider cannot produce a state at the requested instant.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    #[error("no ephemeris for object {0}")]
    UnknownObject(u32),
    #[error("object {catalog_id} has decayed (radius {radius_km:.1} km)")]
    Decayed { catalog_id: u32, radius_km: f64 },
    #[error("propagation diverged for object {catalog_id}: {reason}")]
    Diverged { catalog_id: u32, reason: String },
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Position/velocity oracle for catalog objects.
pub trait EphemerisProvider: Send + Sync {
    fn propagate(
        &self,
        object: &OrbitingObject,
        at: DateTime<Utc>,
    ) -> Result<StateVector, PropagationError>;
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    fn propagate(
        &self,
        object: &OrbitingObject,
        at: DateTime<Utc>,
    ) -> Result<StateVector, PropagationError> {
        (**self).propagate(object, at)
    }
}
