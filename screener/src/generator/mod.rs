pub mod profile;

pub use profile::{build_catalog, ScenarioConfig};
