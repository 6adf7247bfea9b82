pub mod minimizer;
pub mod stats;
pub mod vector;

pub use minimizer::{
    BoundedBrent, GoldenSection, Minimum, MinimizerError, MinimizerKind, ScalarMinimizer,
};
pub use stats::StatsHelper;
