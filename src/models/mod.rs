pub mod manifest;
pub mod record;
pub mod stats;
pub mod table;
pub mod topic;

pub use manifest::StoreManifest;
pub use record::DataRecord;
pub use stats::LineStats;
pub use table::{batch_to_records, monthly_schema, records_to_batch, MonthlyTable};
pub use topic::TopicKey;
