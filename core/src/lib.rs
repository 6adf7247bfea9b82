//! Core conjunction screening engine.
//!
//! Screens one target object against a catalog over a time window, finding
//! every close approach below a distance threshold. Orbit propagation and
//! scalar minimization are pluggable through [`ephemeris::EphemerisProvider`]
//! and [`math::ScalarMinimizer`].

pub mod catalog;
pub mod ephemeris;
pub mod math;
pub mod prelude;
pub mod screening;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use catalog::{AlertLevel, Catalog, CloseApproach, OrbitingObject, TimeWindow};
pub use ephemeris::{EphemerisProvider, PropagationError, StateVector};
pub use prelude::{ScanError, ScreenResult, ScreeningConfig};
pub use screening::{CancelToken, ScanReport, ScanStatistics, Screener};
