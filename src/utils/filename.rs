use crate::error::{ProcessingError, Result};
use crate::utils::constants::DATASET_EXTENSION;
use std::path::{Path, PathBuf};

/// Station identifier from a report path (e.g. RawData/11020.txt -> 11020)
pub fn station_id_from_path(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "Cannot derive station identifier from {}",
                path.display()
            ))
        })?;

    if stem.is_empty() {
        return Err(ProcessingError::InvalidFormat(format!(
            "Empty station identifier in {}",
            path.display()
        )));
    }

    Ok(stem.to_string())
}

/// Dataset file for a topic key inside a store directory: {store}/{key}.parquet
pub fn dataset_path(store_dir: &Path, topic_key: &str) -> PathBuf {
    store_dir.join(format!("{}.{}", topic_key, DATASET_EXTENSION))
}
