use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{RECORD_FIELD_COUNT, STORED_FIELD_COUNT};

/// One year of monthly values for one topic at one station.
///
/// `values` holds the sixteen report fields in order (year, twelve months,
/// accumulated, mean, months with data); empty report fields are `None`.
/// `station` is the owning report's station identifier and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DataRecord {
    #[validate(length(equal = 16))]
    pub values: Vec<Option<String>>,

    #[validate(length(min = 1))]
    pub station: String,
}

impl DataRecord {
    pub fn new(values: Vec<Option<String>>, station: String) -> Result<Self> {
        if values.len() != RECORD_FIELD_COUNT {
            return Err(ProcessingError::InvalidFormat(format!(
                "Record for station {} has {} fields, expected {}",
                station,
                values.len(),
                RECORD_FIELD_COUNT
            )));
        }

        let record = Self { values, station };
        record.validate()?;
        Ok(record)
    }

    /// Build from stored row fields (the station being the last one).
    pub fn from_fields(mut fields: Vec<Option<String>>) -> Result<Self> {
        if fields.len() != STORED_FIELD_COUNT {
            return Err(ProcessingError::InvalidFormat(format!(
                "Stored row has {} fields, expected {}",
                fields.len(),
                STORED_FIELD_COUNT
            )));
        }

        let station = fields.pop().flatten().ok_or_else(|| {
            ProcessingError::InvalidFormat("Stored row has no station identifier".to_string())
        })?;

        Self::new(fields, station)
    }

    pub fn year(&self) -> Option<&str> {
        self.values.first().and_then(|v| v.as_deref())
    }

    /// Field `index` of the stored row, station included (0..17).
    pub fn field(&self, index: usize) -> Option<&str> {
        if index == RECORD_FIELD_COUNT {
            Some(self.station.as_str())
        } else {
            self.values.get(index).and_then(|v| v.as_deref())
        }
    }

    /// All seventeen stored fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.values
            .iter()
            .map(|v| v.as_deref())
            .chain(std::iter::once(Some(self.station.as_str())))
    }

    /// Stored width: the report values plus the station column.
    pub fn field_count(&self) -> usize {
        self.values.len() + 1
    }

    /// Year field is four ASCII digits, or absent.
    pub fn has_valid_year(&self) -> bool {
        match self.year() {
            None => true,
            Some(year) => year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()),
        }
    }
}
