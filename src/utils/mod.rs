pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{dataset_path, station_id_from_path};
pub use progress::ProgressReporter;
