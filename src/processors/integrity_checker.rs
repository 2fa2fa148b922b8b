use crate::models::{DataRecord, TopicKey};
use crate::processors::AggregatedData;
use std::collections::{BTreeMap, HashSet};
use validator::Validate;

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub valid_records: usize,
    pub violations: Vec<RecordViolation>,
    pub topic_statistics: BTreeMap<TopicKey, TopicStatistics>,
}

#[derive(Debug, Clone)]
pub struct RecordViolation {
    pub topic: TopicKey,
    pub station: String,
    pub year: Option<String>,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    InvalidWidth,
    MissingStation,
    MalformedYear,
    DuplicateYear,
}

#[derive(Debug, Clone, Default)]
pub struct TopicStatistics {
    pub records: usize,
    pub stations: usize,
    pub first_year: Option<u32>,
    pub last_year: Option<u32>,
    pub missing_years: usize,
}

/// Audits aggregated datasets. Findings are reported, never enforced.
pub struct IntegrityChecker {
    max_listed_violations: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_listed_violations: 10,
        }
    }

    pub fn with_max_listed_violations(max_listed_violations: usize) -> Self {
        Self {
            max_listed_violations,
        }
    }

    pub fn check_integrity(&self, data: &AggregatedData) -> IntegrityReport {
        let mut report = IntegrityReport::default();

        for (topic, records) in &data.datasets {
            let stats = self.check_topic(*topic, records, &mut report);
            report.topic_statistics.insert(*topic, stats);
        }

        report
    }

    fn check_topic(
        &self,
        topic: TopicKey,
        records: &[DataRecord],
        report: &mut IntegrityReport,
    ) -> TopicStatistics {
        let mut stats = TopicStatistics {
            records: records.len(),
            ..Default::default()
        };
        let mut stations = HashSet::new();
        let mut seen = HashSet::new();

        for record in records {
            report.total_records += 1;
            stations.insert(record.station.as_str());

            let violation_count = report.violations.len();
            self.check_record(topic, record, report);

            match record.year() {
                None => stats.missing_years += 1,
                Some(year) => {
                    if !seen.insert((record.station.as_str(), year)) {
                        report.violations.push(violation(
                            topic,
                            record,
                            ViolationType::DuplicateYear,
                            format!("Year {} appears more than once", year),
                        ));
                    }
                    if let Ok(year) = year.parse::<u32>() {
                        stats.first_year = Some(stats.first_year.map_or(year, |y| y.min(year)));
                        stats.last_year = Some(stats.last_year.map_or(year, |y| y.max(year)));
                    }
                }
            }

            if report.violations.len() == violation_count {
                report.valid_records += 1;
            }
        }

        stats.stations = stations.len();
        stats
    }

    fn check_record(&self, topic: TopicKey, record: &DataRecord, report: &mut IntegrityReport) {
        if let Err(errors) = record.validate() {
            let field_errors = errors.field_errors();
            if field_errors.contains_key("values") {
                report.violations.push(violation(
                    topic,
                    record,
                    ViolationType::InvalidWidth,
                    format!("Record has {} fields", record.field_count()),
                ));
            }
            if field_errors.contains_key("station") {
                report.violations.push(violation(
                    topic,
                    record,
                    ViolationType::MissingStation,
                    "Record has no station identifier".to_string(),
                ));
            }
        }

        if !record.has_valid_year() {
            report.violations.push(violation(
                topic,
                record,
                ViolationType::MalformedYear,
                format!("Year field {:?} is not four digits", record.year().unwrap_or_default()),
            ));
        }
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = format!(
            "Integrity Report\n================\nTotal records: {}\nValid records: {}\nViolations: {}\n",
            report.total_records,
            report.valid_records,
            report.violations.len()
        );

        for (topic, stats) in &report.topic_statistics {
            let span = match (stats.first_year, stats.last_year) {
                (Some(first), Some(last)) => format!("{}-{}", first, last),
                _ => "no years".to_string(),
            };
            summary.push_str(&format!(
                "  {:<10} {:>8} records, {:>5} stations, {}\n",
                topic.as_str(),
                stats.records,
                stats.stations,
                span
            ));
        }

        if !report.violations.is_empty() {
            summary.push_str("\nViolations:\n");
            for v in report.violations.iter().take(self.max_listed_violations) {
                summary.push_str(&format!(
                    "  [{}] station {} year {}: {:?} - {}\n",
                    v.topic,
                    v.station,
                    v.year.as_deref().unwrap_or("-"),
                    v.violation_type,
                    v.details
                ));
            }
            if report.violations.len() > self.max_listed_violations {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    report.violations.len() - self.max_listed_violations
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn violation(
    topic: TopicKey,
    record: &DataRecord,
    violation_type: ViolationType,
    details: String,
) -> RecordViolation {
    RecordViolation {
        topic,
        station: record.station.clone(),
        year: record.year().map(str::to_string),
        violation_type,
        details,
    }
}
