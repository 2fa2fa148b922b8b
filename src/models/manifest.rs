use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary written next to the datasets of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub created_at: DateTime<Utc>,
    pub generator: String,
    pub stations: usize,
    /// Row count per topic key, for every dataset in the store
    pub topics: BTreeMap<String, usize>,
}

impl StoreManifest {
    pub fn new(stations: usize, topics: BTreeMap<String, usize>) -> Self {
        Self {
            created_at: Utc::now(),
            generator: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            stations,
            topics,
        }
    }

    pub fn total_records(&self) -> usize {
        self.topics.values().sum()
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Store created: {}\nGenerator: {}\nStations: {}\nTotal records: {}\n",
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.generator,
            self.stations,
            self.total_records()
        );

        for (topic, count) in &self.topics {
            summary.push_str(&format!("  {:<10} {:>10} records\n", topic, count));
        }

        summary
    }
}
