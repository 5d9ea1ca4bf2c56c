//! Migration settings loaded from YAML.
//!
//! Every key is optional; missing keys fall back to the conventions of the
//! data table exports (`datatable_*.xml`, `USA` overrides, `<Class>` records
//! keyed by `classid`, 200-row insert chunks).

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

pub const DEFAULT_FILE_PATTERN: &str = "datatable_*.xml";
pub const DEFAULT_OVERRIDE_LOCALE: &str = "USA";
pub const DEFAULT_RECORD_ELEMENT: &str = "Class";
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "classid";
pub const DEFAULT_CHUNK_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub file_pattern: String,
    pub override_locale: String,
    pub record_element: String,
    pub identifier_column: String,
    pub chunk_size: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            override_locale: DEFAULT_OVERRIDE_LOCALE.to_string(),
            record_element: DEFAULT_RECORD_ELEMENT.to_string(),
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl MigrationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let mut config: MigrationConfig =
            serde_yaml::from_reader(reader).context("Parsing config YAML")?;
        // attribute names are lower-cased at ingestion
        config.identifier_column = config.identifier_column.to_ascii_lowercase();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.file_pattern.trim().is_empty(),
            "file_pattern cannot be empty"
        );
        ensure!(
            !self.override_locale.trim().is_empty(),
            "override_locale cannot be empty"
        );
        ensure!(
            !self.record_element.trim().is_empty(),
            "record_element cannot be empty"
        );
        ensure!(
            !self.identifier_column.trim().is_empty(),
            "identifier_column cannot be empty"
        );
        ensure!(self.chunk_size > 0, "chunk_size must be positive");
        Ok(())
    }
}
