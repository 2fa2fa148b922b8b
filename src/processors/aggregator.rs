use crate::error::{ProcessingError, Result};
use crate::models::{DataRecord, LineStats, TopicKey};
use crate::readers::{ReportReader, StationReport};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A report that could not be read; its stations contribute nothing.
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// All topics merged across every report of a run.
#[derive(Debug, Clone, Default)]
pub struct AggregatedData {
    pub datasets: BTreeMap<TopicKey, Vec<DataRecord>>,
    pub stations: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub stats: LineStats,
}

impl AggregatedData {
    pub fn records(&self, topic: TopicKey) -> &[DataRecord] {
        self.datasets.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_records(&self) -> usize {
        self.datasets.values().map(Vec::len).sum()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Stations parsed: {}\nReports failed: {}\nTotal records: {}\n",
            self.stations.len(),
            self.failures.len(),
            self.total_records()
        );

        for topic in TopicKey::ALL {
            summary.push_str(&format!(
                "  {:<10} {:>10} records  ({})\n",
                topic.as_str(),
                self.records(topic).len(),
                topic.description()
            ));
        }

        summary.push_str(&self.stats.summary());
        summary
    }
}

/// Parses a directory of station reports on a bounded worker pool and
/// concatenates each topic across stations in file-name order.
pub struct Aggregator {
    max_workers: usize,
    fail_fast: bool,
    reader: ReportReader,
}

impl Aggregator {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            fail_fast: false,
            reader: ReportReader::new(),
        }
    }

    pub fn with_reader(mut self, reader: ReportReader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Regular, non-hidden files in `dir`, sorted by file name
    pub fn discover_reports(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let hidden = path
                .file_name()
                .map(|name| name.to_string_lossy().starts_with('.'))
                .unwrap_or(true);

            if path.is_file() && !hidden {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn aggregate_directory(
        &self,
        dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregatedData> {
        let files = Self::discover_reports(dir)?;
        info!(dir = %dir.display(), reports = files.len(), workers = self.max_workers, "Parsing station reports");

        if let Some(p) = progress {
            p.set_length(files.len() as u64);
            p.set_message(&format!("Parsing {} station reports...", files.len()));
        }

        self.aggregate_files(&files, progress)
    }

    pub fn aggregate_files(
        &self,
        files: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregatedData> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        // Indexed collect keeps results in input order
        let results: Vec<(&PathBuf, Result<StationReport>)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let result = self.reader.read_report(path);
                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    (path, result)
                })
                .collect()
        });

        let mut reports = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (path, result) in results {
            match result {
                Ok(report) => reports.push(report),
                Err(e) if self.fail_fast => {
                    return Err(ProcessingError::ReportFailed {
                        path: path.clone(),
                        source: Box::new(e),
                    })
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable report");
                    failures.push(FileFailure {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut data = Self::merge_reports(reports);
        data.failures = failures;
        Ok(data)
    }

    /// Concatenate each topic across reports, preserving report order and
    /// each report's internal record order
    pub fn merge_reports(reports: Vec<StationReport>) -> AggregatedData {
        let mut data = AggregatedData::default();
        for topic in TopicKey::ALL {
            data.datasets.insert(topic, Vec::new());
        }

        for mut report in reports {
            for topic in TopicKey::ALL {
                let records = report.take_records(topic);
                if let Some(dataset) = data.datasets.get_mut(&topic) {
                    dataset.extend(records);
                }
            }
            data.stats += report.stats;
            data.stations.push(report.station);
        }

        data
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
