use crate::models::TopicKey;
use crate::utils::constants::{COLUMN_HEADER_MARKER, DEFAULT_SEPARATOR, RECORD_FIELD_COUNT};

/// Why a line carried no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseKind {
    Blank,
    ColumnHeader,
    /// Field count or content matched neither a section label nor a record.
    Unrecognized { fields: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Noise(NoiseKind),
    SectionHeader(TopicKey),
    DataRecord(Vec<Option<String>>),
}

/// Sorts decoded report lines into section headers, data records and noise.
///
/// Classification is stateless; the current-topic cursor lives in
/// [`TopicBuffer`](crate::readers::TopicBuffer).
#[derive(Debug, Clone)]
pub struct LineClassifier {
    separator: char,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn classify(&self, line: &str) -> LineClass {
        let line = line.trim_end();

        if line.trim_start().is_empty() {
            return LineClass::Noise(NoiseKind::Blank);
        }

        if line.contains(COLUMN_HEADER_MARKER) {
            return LineClass::Noise(NoiseKind::ColumnHeader);
        }

        let fields: Vec<&str> = line.split(self.separator).collect();

        match fields.len() {
            1 => match TopicKey::from_label(fields[0].trim()) {
                Some(topic) => LineClass::SectionHeader(topic),
                None => LineClass::Noise(NoiseKind::Unrecognized { fields: 1 }),
            },
            RECORD_FIELD_COUNT => LineClass::DataRecord(
                fields
                    .into_iter()
                    .map(|field| {
                        if field.is_empty() {
                            None
                        } else {
                            Some(field.to_string())
                        }
                    })
                    .collect(),
            ),
            n => LineClass::Noise(NoiseKind::Unrecognized { fields: n }),
        }
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str =
        "1985\t12.5\t0\t\t3.1\t45.2\t120.8\t200.1\t180.4\t150.0\t60.2\t10.5\t2.0\t784.8\t65.4\t11";

    #[test]
    fn test_section_header() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("LLUVIA TOTAL MENSUAL\r\n"),
            LineClass::SectionHeader(TopicKey::TotalRainfall)
        );
        assert_eq!(
            classifier.classify("EVAPORACIÓN MENSUAL"),
            LineClass::SectionHeader(TopicKey::Evaporation)
        );
    }

    #[test]
    fn test_unknown_single_field_is_noise() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("ESTACIÓN : 11020"),
            LineClass::Noise(NoiseKind::Unrecognized { fields: 1 })
        );
    }

    #[test]
    fn test_data_record_normalizes_empty_fields() {
        let classifier = LineClassifier::new();
        match classifier.classify(RECORD) {
            LineClass::DataRecord(fields) => {
                assert_eq!(fields.len(), 16);
                assert_eq!(fields[0].as_deref(), Some("1985"));
                assert_eq!(fields[3], None);
                assert_eq!(fields[15].as_deref(), Some("11"));
                assert!(fields.iter().all(|f| f.as_deref() != Some("")));
            }
            other => panic!("expected data record, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_lines() {
        let classifier = LineClassifier::new();
        for line in ["\r\n", "\n", "", "   \t  "] {
            assert_eq!(
                classifier.classify(line),
                LineClass::Noise(NoiseKind::Blank)
            );
        }
    }

    #[test]
    fn test_column_header_line() {
        let classifier = LineClassifier::new();
        let header = "AÑO\tENE\tFEB\tMAR\tABR\tMAY\tJUN\tJUL\tAGO\tSEP\tOCT\tNOV\tDIC\tACUM\tPROM\tMESES";
        assert_eq!(
            classifier.classify(header),
            LineClass::Noise(NoiseKind::ColumnHeader)
        );
    }

    #[test]
    fn test_other_field_counts_are_noise() {
        let classifier = LineClassifier::new();
        assert_eq!(
            classifier.classify("LATITUD\t21.01"),
            LineClass::Noise(NoiseKind::Unrecognized { fields: 2 })
        );

        let seventeen = format!("{}\t99", RECORD);
        assert_eq!(
            classifier.classify(&seventeen),
            LineClass::Noise(NoiseKind::Unrecognized { fields: 17 })
        );
    }

    #[test]
    fn test_trailing_empty_fields_are_stripped() {
        let classifier = LineClassifier::new();
        let short = "1985\t1\t2\t3\t4\t5\t6\t7\t8\t9\t10\t11\t12\t78\t6.5\t\t";
        assert_eq!(
            classifier.classify(short),
            LineClass::Noise(NoiseKind::Unrecognized { fields: 15 })
        );
    }

    #[test]
    fn test_custom_separator() {
        let classifier = LineClassifier::with_separator(';');
        let line = RECORD.replace('\t', ";");
        assert!(matches!(classifier.classify(&line), LineClass::DataRecord(_)));
        assert_eq!(classifier.separator(), ';');
    }
}
