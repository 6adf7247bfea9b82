pub mod export;
pub mod summary;

pub use export::{save_csv, save_json};
pub use summary::Summary;
