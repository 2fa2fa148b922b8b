use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Store not found at {}", path.display())]
    StoreNotFound { path: PathBuf },

    #[error("There is no data for the requested variable: {topic}")]
    TopicNotFound { topic: String },

    #[error("Failed to parse report {}: {source}", path.display())]
    ReportFailed {
        path: PathBuf,
        #[source]
        source: Box<ProcessingError>,
    },

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// True when the error means the requested topic was never persisted.
    pub fn is_missing_topic(&self) -> bool {
        matches!(self, ProcessingError::TopicNotFound { .. })
    }
}
