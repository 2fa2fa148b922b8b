/// Report layout
pub const RECORD_FIELD_COUNT: usize = 16;
pub const STORED_FIELD_COUNT: usize = RECORD_FIELD_COUNT + 1;
pub const COLUMN_HEADER_MARKER: &str = "ENE";
pub const DEFAULT_SEPARATOR: char = '\t';
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Store layout
pub const DEFAULT_STORE_DIR: &str = "meteodata";
pub const DEFAULT_RAW_DATA_DIR: &str = "RawData";
pub const DATASET_EXTENSION: &str = "parquet";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_CONFIG_FILE: &str = "smn.toml";
pub const ENV_PREFIX: &str = "SMN";

/// Query table columns, in stored order
pub const COLUMN_NAMES: [&str; STORED_FIELD_COUNT] = [
    "year",
    "jan",
    "feb",
    "mar",
    "apr",
    "may",
    "jun",
    "jul",
    "aug",
    "sep",
    "oct",
    "nov",
    "dec",
    "accumulated",
    "mean",
    "months_with_data",
    "station",
];

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
