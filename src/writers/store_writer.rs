use crate::error::{ProcessingError, Result};
use crate::models::{monthly_schema, records_to_batch, DataRecord, StoreManifest, TopicKey};
use crate::utils::constants::{DEFAULT_ROW_GROUP_SIZE, MANIFEST_FILE};
use crate::utils::filename::dataset_path;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Writes a fresh topic store.
///
/// Datasets are staged in a temporary sibling directory; [`finish`](Self::finish)
/// replaces whatever was at the target path. Dropping the writer without
/// finishing leaves the previous store untouched.
pub struct StoreWriter {
    target: PathBuf,
    staging: TempDir,
    compression: Compression,
    row_group_size: usize,
    written: BTreeMap<String, usize>,
}

impl StoreWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let parent = store_parent(path);
        fs::create_dir_all(&parent)?;

        let staging = tempfile::Builder::new()
            .prefix(".smn-store-")
            .tempdir_in(&parent)?;

        Ok(Self {
            target: path.to_path_buf(),
            staging,
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            written: BTreeMap::new(),
        })
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write one topic's dataset, replacing any earlier write of the same topic.
    ///
    /// An empty dataset still produces a schema-only file so the topic reads
    /// back as present with zero rows.
    pub fn write_dataset(&mut self, topic: TopicKey, records: &[DataRecord]) -> Result<()> {
        let path = dataset_path(self.staging.path(), topic.as_str());
        let file = File::create(&path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, monthly_schema(), Some(props))?;
        for chunk in records.chunks(self.row_group_size) {
            let batch = records_to_batch(chunk)?;
            writer.write(&batch)?;
        }
        writer.close()?;

        debug!(topic = %topic, records = records.len(), "Staged topic dataset");
        self.written.insert(topic.as_str().to_string(), records.len());
        Ok(())
    }

    /// Write the manifest and move the staged store into place.
    ///
    /// Only an empty directory or an earlier store (one holding a manifest)
    /// is replaced. The previous store is restored if the swap fails.
    pub fn finish(self, stations: usize) -> Result<StoreManifest> {
        let manifest = StoreManifest::new(stations, self.written);
        let manifest_file = File::create(self.staging.path().join(MANIFEST_FILE))?;
        serde_json::to_writer_pretty(manifest_file, &manifest)?;

        ensure_replaceable(&self.target)?;
        swap_into_place(self.staging.path(), &self.target)?;

        info!(
            store = %self.target.display(),
            topics = manifest.topics.len(),
            records = manifest.total_records(),
            "Store written"
        );

        Ok(manifest)
    }
}

fn store_parent(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Refuse to overwrite anything that is not an earlier store
fn ensure_replaceable(target: &Path) -> Result<()> {
    if target.is_dir() {
        let is_store = target.join(MANIFEST_FILE).is_file();
        if !is_store && fs::read_dir(target)?.next().is_some() {
            return Err(ProcessingError::Config(format!(
                "Store path {} exists and is not a topic store",
                target.display()
            )));
        }
    } else if target.exists() {
        return Err(ProcessingError::Config(format!(
            "Store path {} exists and is not a directory",
            target.display()
        )));
    }
    Ok(())
}

/// Move `staged` to `target`, parking any previous store in a sibling
/// backup until the new one is in place
fn swap_into_place(staged: &Path, target: &Path) -> Result<()> {
    if !target.exists() {
        fs::rename(staged, target)?;
        return Ok(());
    }

    let backup_dir = tempfile::Builder::new()
        .prefix(".smn-previous-")
        .tempdir_in(store_parent(target))?;
    let backup = backup_dir.path().join("store");
    fs::rename(target, &backup)?;

    if let Err(e) = fs::rename(staged, target) {
        if let Err(restore) = fs::rename(&backup, target) {
            warn!(
                backup = %backup.display(),
                error = %restore,
                "Could not restore previous store"
            );
            // Leave the backup on disk for manual recovery
            let _ = backup_dir.into_path();
        }
        return Err(e.into());
    }

    debug!(store = %target.display(), "Previous store replaced");
    Ok(())
}
