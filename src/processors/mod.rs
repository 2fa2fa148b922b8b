pub mod aggregator;
pub mod integrity_checker;

pub use aggregator::{AggregatedData, Aggregator, FileFailure};
pub use integrity_checker::{IntegrityChecker, IntegrityReport, RecordViolation, ViolationType};
