use crate::error::{ProcessingError, Result};
use crate::models::{DataRecord, LineStats, TopicKey};
use crate::readers::{LineClassifier, TopicBuffer};
use crate::utils::constants::DEFAULT_SEPARATOR;
use crate::utils::filename::station_id_from_path;
use encoding_rs::Encoding;
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Parsed contents of one station report.
#[derive(Debug, Clone)]
pub struct StationReport {
    pub station: String,
    pub topics: BTreeMap<TopicKey, Vec<DataRecord>>,
    pub stats: LineStats,
}

impl StationReport {
    pub fn records(&self, topic: TopicKey) -> &[DataRecord] {
        self.topics.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Move a topic's records out of the report, leaving nothing behind.
    pub fn take_records(&mut self, topic: TopicKey) -> Vec<DataRecord> {
        self.topics.remove(&topic).unwrap_or_default()
    }

    pub fn record_count(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }
}

impl From<TopicBuffer> for StationReport {
    fn from(buffer: TopicBuffer) -> Self {
        let (station, topics, stats) = buffer.into_parts();
        Self {
            station,
            topics,
            stats,
        }
    }
}

/// Reads SMN monthly report files into per-topic record sequences.
#[derive(Debug, Clone)]
pub struct ReportReader {
    classifier: LineClassifier,
    encoding: &'static Encoding,
    use_mmap: bool,
}

impl ReportReader {
    pub fn new() -> Self {
        Self {
            classifier: LineClassifier::with_separator(DEFAULT_SEPARATOR),
            encoding: encoding_rs::UTF_8,
            use_mmap: false,
        }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.classifier = LineClassifier::with_separator(separator);
        self
    }

    /// Select the text encoding by WHATWG label ("utf-8", "windows-1252", ...)
    pub fn with_encoding(mut self, label: &str) -> Result<Self> {
        self.encoding = resolve_encoding(label)?;
        Ok(self)
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Read a report file; the station identifier is the file name without extension
    pub fn read_report(&self, path: &Path) -> Result<StationReport> {
        let station = station_id_from_path(path)?;

        let report = if self.use_mmap {
            self.read_report_mmap(path, station)?
        } else {
            let bytes = std::fs::read(path)?;
            self.parse_bytes(station, &bytes)
        };

        debug!(
            path = %path.display(),
            station = %report.station,
            topics = report.topics.len(),
            records = report.stats.records,
            dropped = report.stats.dropped(),
            "Parsed station report"
        );

        Ok(report)
    }

    fn read_report_mmap(&self, path: &Path, station: String) -> Result<StationReport> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(self.parse_bytes(station, &[]));
        }

        let mmap = unsafe { Mmap::map(&file)? };
        Ok(self.parse_bytes(station, &mmap))
    }

    /// Decode raw report bytes and run every line through the classifier
    pub fn parse_bytes(&self, station: String, bytes: &[u8]) -> StationReport {
        let (text, _, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            warn!(
                station = %station,
                encoding = self.encoding.name(),
                "Report contains malformed sequences; replaced during decoding"
            );
        }

        self.parse_text(station, &text)
    }

    pub fn parse_text(&self, station: String, text: &str) -> StationReport {
        let mut buffer = TopicBuffer::new(station);
        for line in text.lines() {
            buffer.apply(self.classifier.classify(line));
        }
        buffer.into()
    }
}

impl Default for ReportReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ProcessingError::UnsupportedEncoding(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    fn record_line(year: u32) -> String {
        let mut fields = vec![year.to_string()];
        fields.extend((1..=12).map(|m| format!("{}.5", m)));
        fields.push("78.0".to_string());
        fields.push("6.5".to_string());
        fields.push("12".to_string());
        fields.join("\t")
    }

    fn write_report(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_single_topic_report() {
        let dir = TempDir::new().unwrap();
        let content = format!("LLUVIA TOTAL MENSUAL\r\n{}\r\n", record_line(1985));
        let path = write_report(&dir, "00001.txt", content.as_bytes());

        let report = ReportReader::new().read_report(&path).unwrap();

        assert_eq!(report.station, "00001");
        assert_eq!(report.topics.len(), 1);

        let records = report.records(TopicKey::TotalRainfall);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields().count(), 17);
        assert_eq!(records[0].year(), Some("1985"));
        assert_eq!(records[0].field(16), Some("00001"));
    }

    #[test]
    fn test_noise_lines_do_not_split_records() {
        let header = "AÑO\tENE\tFEB\tMAR\tABR\tMAY\tJUN\tJUL\tAGO\tSEP\tOCT\tNOV\tDIC\tACUM\tPROM\tMESES";
        let content = format!(
            "TEMPERATURA MEDIA MENSUAL\r\n\r\n{}\r\n{}\r\n\r\n{}\r\n{}\r\n",
            header,
            record_line(1990),
            record_line(1991),
            record_line(1992)
        );

        let report = ReportReader::new().parse_text("11020".to_string(), &content);
        let years: Vec<_> = report
            .records(TopicKey::MeanTemperature)
            .iter()
            .map(|r| r.year().unwrap_or_default().to_string())
            .collect();

        assert_eq!(years, vec!["1990", "1991", "1992"]);
        assert_eq!(report.stats.blank_lines, 2);
        assert_eq!(report.stats.column_headers, 1);
    }

    #[test]
    fn test_report_without_headers_is_empty() {
        let content = format!("ESTACIÓN : 11020\r\n{}\r\n", record_line(1990));
        let report = ReportReader::new().parse_text("11020".to_string(), &content);

        assert!(report.topics.is_empty());
        assert_eq!(report.record_count(), 0);
        assert_eq!(report.stats.orphan_records, 1);
        assert_eq!(report.stats.unrecognized_lines, 1);
    }

    #[test]
    fn test_repeated_header_keeps_last_block() {
        let content = format!(
            "LLUVIA TOTAL MENSUAL\n{}\n{}\nLLUVIA TOTAL MENSUAL\n{}\n",
            record_line(1980),
            record_line(1981),
            record_line(2001)
        );
        let report = ReportReader::new().parse_text("00001".to_string(), &content);
        let records = report.records(TopicKey::TotalRainfall);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].year(), Some("2001"));
    }

    #[test]
    fn test_windows_1252_report() {
        let dir = TempDir::new().unwrap();
        let mut content = b"EVAPORACI\xD3N MENSUAL\r\n".to_vec();
        content.extend_from_slice(record_line(1999).as_bytes());
        content.extend_from_slice(b"\r\n");
        let path = write_report(&dir, "25010.txt", &content);

        let reader = ReportReader::new().with_encoding("windows-1252").unwrap();
        let report = reader.read_report(&path).unwrap();
        assert_eq!(report.records(TopicKey::Evaporation).len(), 1);

        // Read as UTF-8 the label no longer matches
        let report = ReportReader::new().read_report(&path).unwrap();
        assert!(report.topics.is_empty());
    }

    #[test]
    fn test_mmap_matches_buffered_read() {
        let dir = TempDir::new().unwrap();
        let content = format!(
            "TEMPERATURA MÁXIMA EXTREMA\r\n{}\r\n{}\r\n",
            record_line(1970),
            record_line(1971)
        );
        let path = write_report(&dir, "09001.txt", content.as_bytes());

        let buffered = ReportReader::new().read_report(&path).unwrap();
        let mapped = ReportReader::new().with_mmap(true).read_report(&path).unwrap();
        assert_eq!(buffered.topics, mapped.topics);

        let empty = write_report(&dir, "09002.txt", b"");
        let report = ReportReader::new().with_mmap(true).read_report(&empty).unwrap();
        assert!(report.topics.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ReportReader::new().read_report(Path::new("/nonexistent/00001.txt"));
        assert!(matches!(result, Err(ProcessingError::Io(_))));
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        assert!(matches!(
            ReportReader::new().with_encoding("klingon"),
            Err(ProcessingError::UnsupportedEncoding(_))
        ));
        assert_eq!(
            ReportReader::new().with_encoding("latin1").unwrap().encoding_name(),
            "windows-1252"
        );
    }
}
