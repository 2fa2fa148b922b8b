use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value};
use std::io::Write;
use std::sync::Arc;

use crate::error::{ProcessingError, Result};
use crate::models::{DataRecord, TopicKey};
use crate::utils::constants::{COLUMN_NAMES, RECORD_FIELD_COUNT, STORED_FIELD_COUNT};

/// Arrow schema shared by the store and the query table.
pub fn monthly_schema() -> Arc<Schema> {
    let fields: Vec<Field> = COLUMN_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Field::new(*name, DataType::Utf8, i != RECORD_FIELD_COUNT))
        .collect();

    Arc::new(Schema::new(fields))
}

/// Convert records to an Arrow RecordBatch, one string column per field
pub fn records_to_batch(records: &[DataRecord]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = (0..STORED_FIELD_COUNT)
        .map(|index| {
            let values: Vec<Option<&str>> = records.iter().map(|r| r.field(index)).collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(monthly_schema(), columns)?)
}

/// Convert a RecordBatch read from the store back into records
pub fn batch_to_records(batch: &RecordBatch) -> Result<Vec<DataRecord>> {
    if batch.num_columns() != STORED_FIELD_COUNT {
        return Err(ProcessingError::InvalidFormat(format!(
            "Dataset has {} columns, expected {}",
            batch.num_columns(),
            STORED_FIELD_COUNT
        )));
    }

    let columns: Vec<&StringArray> = (0..STORED_FIELD_COUNT)
        .map(|i| {
            batch
                .column(i)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| {
                    ProcessingError::InvalidFormat(format!(
                        "Invalid {} column type",
                        COLUMN_NAMES[i]
                    ))
                })
        })
        .collect::<Result<_>>()?;

    (0..batch.num_rows())
        .map(|row| {
            let fields = columns
                .iter()
                .map(|column| {
                    if column.is_null(row) {
                        None
                    } else {
                        Some(column.value(row).to_string())
                    }
                })
                .collect();
            DataRecord::from_fields(fields)
        })
        .collect()
}

/// Tabular view of one topic's aggregated dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTable {
    pub topic: TopicKey,
    pub records: Vec<DataRecord>,
}

impl MonthlyTable {
    pub fn new(topic: TopicKey, records: Vec<DataRecord>) -> Self {
        Self { topic, records }
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        &COLUMN_NAMES
    }

    pub fn num_rows(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Vec<Option<&str>>> {
        self.records.get(index).map(|r| r.fields().collect())
    }

    /// Distinct station identifiers in first-seen order
    pub fn stations(&self) -> Vec<&str> {
        let mut stations: Vec<&str> = Vec::new();
        for record in &self.records {
            if !stations.contains(&record.station.as_str()) {
                stations.push(&record.station);
            }
        }
        stations
    }

    pub fn head(&self, limit: usize) -> MonthlyTable {
        MonthlyTable {
            topic: self.topic,
            records: self.records.iter().take(limit).cloned().collect(),
        }
    }

    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        records_to_batch(&self.records)
    }

    /// Write as CSV with a header row; absent values become empty cells
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(COLUMN_NAMES)?;

        for record in &self.records {
            csv_writer.write_record(record.fields().map(|f| f.unwrap_or("")))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// One JSON object per record; absent values are `null`
    pub fn to_json_rows(&self) -> Value {
        let rows = self
            .records
            .iter()
            .map(|record| {
                let object: Map<String, Value> = COLUMN_NAMES
                    .iter()
                    .zip(record.fields())
                    .map(|(name, value)| {
                        let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
                        (name.to_string(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();

        Value::Array(rows)
    }

    /// Fixed-width text rendering for terminal output
    pub fn render(&self) -> String {
        let cells: Vec<Vec<&str>> = self
            .records
            .iter()
            .map(|r| r.fields().map(|f| f.unwrap_or("-")).collect())
            .collect();

        let widths: Vec<usize> = COLUMN_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |row: &[&str]| -> String {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:>width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut output = format_row(&COLUMN_NAMES[..]);
        for row in &cells {
            output.push('\n');
            output.push_str(&format_row(&row[..]));
        }
        output
    }
}
