use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Line accounting for one or more parsed reports.
///
/// Dropped lines are never errors; these counters make their volume visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub column_headers: usize,
    pub section_headers: usize,
    pub records: usize,
    pub unrecognized_lines: usize,
    pub orphan_records: usize,
    pub reset_records: usize,
}

impl LineStats {
    /// Lines or records that did not reach a topic sequence.
    pub fn dropped(&self) -> usize {
        self.unrecognized_lines + self.orphan_records + self.reset_records
    }

    pub fn summary(&self) -> String {
        format!(
            "Lines: {} total, {} blank, {} column headers, {} section headers\n\
             Records: {} kept, {} without topic, {} discarded by repeated header\n\
             Unrecognized lines: {}",
            self.total_lines,
            self.blank_lines,
            self.column_headers,
            self.section_headers,
            self.records,
            self.orphan_records,
            self.reset_records,
            self.unrecognized_lines
        )
    }
}

impl AddAssign for LineStats {
    fn add_assign(&mut self, other: Self) {
        self.total_lines += other.total_lines;
        self.blank_lines += other.blank_lines;
        self.column_headers += other.column_headers;
        self.section_headers += other.section_headers;
        self.records += other.records;
        self.unrecognized_lines += other.unrecognized_lines;
        self.orphan_records += other.orphan_records;
        self.reset_records += other.reset_records;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let mut total = LineStats::default();
        total += LineStats {
            total_lines: 10,
            records: 6,
            unrecognized_lines: 1,
            ..Default::default()
        };
        total += LineStats {
            total_lines: 4,
            records: 2,
            orphan_records: 1,
            reset_records: 2,
            ..Default::default()
        };

        assert_eq!(total.total_lines, 14);
        assert_eq!(total.records, 8);
        assert_eq!(total.dropped(), 4);
        assert!(total.summary().contains("8 kept"));
    }
}
