use crate::error::{ProcessingError, Result};
use crate::readers::{resolve_encoding, ReportReader};
use crate::utils::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_ENCODING, DEFAULT_SEPARATOR, DEFAULT_STORE_DIR, ENV_PREFIX,
};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime settings for parsing and storage.
///
/// Sources, lowest precedence first: built-in defaults, a TOML file,
/// `SMN_*` environment variables, then command-line overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub separator: char,
    pub encoding: String,
    pub max_workers: usize,
    pub use_mmap: bool,
    pub store_path: PathBuf,
    pub compression: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            encoding: DEFAULT_ENCODING.to_string(),
            max_workers: num_cpus::get(),
            use_mmap: false,
            store_path: PathBuf::from(DEFAULT_STORE_DIR),
            compression: "snappy".to_string(),
        }
    }
}

impl Settings {
    /// Load layered settings. An explicit `config_file` must exist; the
    /// default `smn.toml` is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path.to_path_buf()).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(ProcessingError::Config(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.separator == '\n' || self.separator == '\r' {
            return Err(ProcessingError::Config(
                "separator cannot be a line terminator".to_string(),
            ));
        }
        resolve_encoding(&self.encoding)?;
        Ok(())
    }

    pub fn report_reader(&self) -> Result<ReportReader> {
        Ok(ReportReader::new()
            .with_separator(self.separator)
            .with_encoding(&self.encoding)?
            .with_mmap(self.use_mmap))
    }
}
