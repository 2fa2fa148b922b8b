use crate::error::{ProcessingError, Result};
use crate::models::{batch_to_records, MonthlyTable, StoreManifest, TopicKey};
use crate::utils::constants::MANIFEST_FILE;
use crate::utils::filename::dataset_path;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only access to a topic store written by [`StoreWriter`](crate::writers::StoreWriter).
pub struct StoreReader {
    root: PathBuf,
}

impl StoreReader {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(ProcessingError::StoreNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, topic: TopicKey) -> bool {
        dataset_path(&self.root, topic.as_str()).is_file()
    }

    /// Topics with a dataset in the store, in report order
    pub fn topics(&self) -> Vec<TopicKey> {
        TopicKey::ALL
            .iter()
            .copied()
            .filter(|topic| self.contains(*topic))
            .collect()
    }

    /// Load a topic by its short key.
    ///
    /// Keys that were never written, including keys outside the known set,
    /// fail with [`ProcessingError::TopicNotFound`].
    pub fn load(&self, key: &str) -> Result<MonthlyTable> {
        let topic: TopicKey = key.parse().map_err(|_| ProcessingError::TopicNotFound {
            topic: key.to_string(),
        })?;
        self.load_topic(topic)
    }

    pub fn load_topic(&self, topic: TopicKey) -> Result<MonthlyTable> {
        let path = dataset_path(&self.root, topic.as_str());
        if !path.is_file() {
            return Err(ProcessingError::TopicNotFound {
                topic: topic.as_str().to_string(),
            });
        }

        let file = File::open(&path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;
            records.extend(batch_to_records(&batch)?);
        }

        Ok(MonthlyTable::new(topic, records))
    }

    pub fn manifest(&self) -> Result<Option<StoreManifest>> {
        let path = self.root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let file = File::open(path)?;
        Ok(Some(serde_json::from_reader(file)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataRecord;
    use crate::writers::StoreWriter;
    use tempfile::TempDir;

    fn record(year: &str, station: &str) -> DataRecord {
        let mut values = vec![Some(year.to_string())];
        values.extend((1..16).map(|i| if i == 7 { None } else { Some(i.to_string()) }));
        DataRecord::new(values, station.to_string()).unwrap()
    }

    fn build_store(dir: &TempDir) -> PathBuf {
        let store = dir.path().join("meteodata");
        let mut writer = StoreWriter::create(&store).unwrap();
        writer
            .write_dataset(
                TopicKey::TotalRainfall,
                &[record("1990", "00001"), record("1991", "00002")],
            )
            .unwrap();
        writer.write_dataset(TopicKey::Evaporation, &[]).unwrap();
        writer.finish(2).unwrap();
        store
    }

    #[test]
    fn test_load_written_topic() {
        let dir = TempDir::new().unwrap();
        let reader = StoreReader::open(&build_store(&dir)).unwrap();

        let table = reader.load("p").unwrap();
        assert_eq!(table.topic, TopicKey::TotalRainfall);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.records[0], record("1990", "00001"));
        assert_eq!(table.records[1].field(7), None);
        assert_eq!(table.column_names().len(), 17);
    }

    #[test]
    fn test_empty_topic_is_not_missing() {
        let dir = TempDir::new().unwrap();
        let reader = StoreReader::open(&build_store(&dir)).unwrap();

        let table = reader.load("evo").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_unwritten_topic_is_missing() {
        let dir = TempDir::new().unwrap();
        let reader = StoreReader::open(&build_store(&dir)).unwrap();

        let err = reader.load("t").unwrap_err();
        assert!(err.is_missing_topic());

        let err = reader.load("snowfall").unwrap_err();
        assert!(err.is_missing_topic());

        assert_eq!(
            reader.topics(),
            vec![TopicKey::TotalRainfall, TopicKey::Evaporation]
        );
    }

    #[test]
    fn test_missing_store() {
        let dir = TempDir::new().unwrap();
        let result = StoreReader::open(&dir.path().join("nothing-here"));
        assert!(matches!(result, Err(ProcessingError::StoreNotFound { .. })));
    }

    #[test]
    fn test_manifest_round_trip() {
        let dir = TempDir::new().unwrap();
        let reader = StoreReader::open(&build_store(&dir)).unwrap();

        let manifest = reader.manifest().unwrap().unwrap();
        assert_eq!(manifest.stations, 2);
        assert_eq!(manifest.topics.get("p"), Some(&2));
        assert_eq!(manifest.topics.get("evo"), Some(&0));
    }
}
