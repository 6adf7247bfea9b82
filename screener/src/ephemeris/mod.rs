pub mod elements;
pub mod kepler;

pub use elements::CatalogFile;
pub use kepler::KeplerEphemeris;
