pub mod line_classifier;
pub mod report_reader;
pub mod store_reader;
pub mod topic_buffer;

pub use line_classifier::{LineClass, LineClassifier, NoiseKind};
pub use report_reader::{resolve_encoding, ReportReader, StationReport};
pub use store_reader::StoreReader;
pub use topic_buffer::TopicBuffer;
