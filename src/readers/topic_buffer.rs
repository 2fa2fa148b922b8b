use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{DataRecord, LineStats, TopicKey};
use crate::readers::line_classifier::{LineClass, NoiseKind};
use crate::utils::constants::RECORD_FIELD_COUNT;

/// Per-report accumulator of records grouped by topic.
///
/// A section header moves the current-topic cursor and clears that topic's
/// sequence; records are appended to the topic under the cursor. Records seen
/// before any header are dropped.
#[derive(Debug, Clone)]
pub struct TopicBuffer {
    station: String,
    current: Option<TopicKey>,
    topics: BTreeMap<TopicKey, Vec<DataRecord>>,
    stats: LineStats,
}

impl TopicBuffer {
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            current: None,
            topics: BTreeMap::new(),
            stats: LineStats::default(),
        }
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    pub fn current_topic(&self) -> Option<TopicKey> {
        self.current
    }

    pub fn apply(&mut self, class: LineClass) {
        self.stats.total_lines += 1;

        match class {
            LineClass::Noise(NoiseKind::Blank) => self.stats.blank_lines += 1,
            LineClass::Noise(NoiseKind::ColumnHeader) => self.stats.column_headers += 1,
            LineClass::Noise(NoiseKind::Unrecognized { fields }) => {
                debug!(station = %self.station, fields, "Dropping unrecognized line");
                self.stats.unrecognized_lines += 1;
            }
            LineClass::SectionHeader(topic) => {
                self.stats.section_headers += 1;
                if let Some(previous) = self.topics.insert(topic, Vec::new()) {
                    if !previous.is_empty() {
                        debug!(
                            station = %self.station,
                            topic = %topic,
                            discarded = previous.len(),
                            "Repeated section header resets topic"
                        );
                    }
                    self.stats.records -= previous.len();
                    self.stats.reset_records += previous.len();
                }
                self.current = Some(topic);
            }
            LineClass::DataRecord(values) if values.len() != RECORD_FIELD_COUNT => {
                debug!(
                    station = %self.station,
                    fields = values.len(),
                    "Dropping record of unexpected width"
                );
                self.stats.unrecognized_lines += 1;
            }
            LineClass::DataRecord(values) => match self.current {
                Some(topic) => {
                    let record = DataRecord {
                        values,
                        station: self.station.clone(),
                    };
                    self.topics.entry(topic).or_default().push(record);
                    self.stats.records += 1;
                }
                None => {
                    debug!(station = %self.station, "Dropping record before any section header");
                    self.stats.orphan_records += 1;
                }
            },
        }
    }

    pub fn records(&self, topic: TopicKey) -> &[DataRecord] {
        self.topics.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn topics(&self) -> impl Iterator<Item = TopicKey> + '_ {
        self.topics.keys().copied()
    }

    pub fn stats(&self) -> LineStats {
        self.stats
    }

    pub fn into_parts(self) -> (String, BTreeMap<TopicKey, Vec<DataRecord>>, LineStats) {
        (self.station, self.topics, self.stats)
    }
}
