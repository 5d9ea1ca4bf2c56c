use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::config::MigrationConfig;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Migrate XML data tables into SQL tables with inferred column types",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create and fill one table per data table file found in a folder
    Migrate(MigrateArgs),
    /// Print the inferred columns of a single data table file
    Infer(InferArgs),
}

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("destination")
        .required(true)
        .args(["database", "script"])
))]
pub struct MigrateArgs {
    /// Folder holding the data table files (and their locale override folder)
    #[arg(short, long)]
    pub folder: PathBuf,
    /// SQLite database file to create the tables in
    #[arg(short, long)]
    pub database: Option<PathBuf>,
    /// Write a MySQL script instead of executing (use '-' for stdout)
    #[arg(short, long)]
    pub script: Option<PathBuf>,
    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Debug, Args)]
pub struct InferArgs {
    /// Data table file to inspect
    #[arg(short, long)]
    pub input: PathBuf,
    /// Ignore the locale override file next to the input
    #[arg(long)]
    pub no_overrides: bool,
    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// YAML file with migration settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Name of the locale override folder (defaults to USA)
    #[arg(long)]
    pub locale: Option<String>,
    /// File name pattern with '*' and '?' wildcards (defaults to datatable_*.xml)
    #[arg(long)]
    pub pattern: Option<String>,
    /// Rows per INSERT statement (defaults to 200)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl SettingsArgs {
    /// Configuration file values (or defaults) with command line overrides applied.
    pub fn resolve(&self) -> Result<MigrationConfig> {
        let mut config = match &self.config {
            Some(path) => MigrationConfig::load(path)
                .with_context(|| format!("Loading settings from {path:?}"))?,
            None => MigrationConfig::default(),
        };
        if let Some(locale) = &self.locale {
            config.override_locale = locale.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.file_pattern = pattern.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        config.validate()?;
        Ok(config)
    }
}
