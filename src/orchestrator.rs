//! Batch migration of every data table file in a folder.
//!
//! [`MigrationOrchestrator::run`] discovers the files matching the configured
//! pattern, refuses the whole batch when any destination table already exists,
//! then migrates the sources one at a time in file-name order. A failure stops
//! the run; tables committed for earlier files are kept.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use regex::Regex;

use crate::{
    config::MigrationConfig,
    destination::Destination,
    error::{MigrationError, Result},
    source::{DataTableSource, MigrationSummary},
};

/// Receives progress events from a migration run.
pub trait ProgressObserver {
    fn files_discovered(&self, _folder: &Path, _count: usize) {}

    fn override_applied(&self, _table: &str, _path: &Path) {}

    fn source_completed(&self, summary: &MigrationSummary);
}

/// Forwards progress events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn files_discovered(&self, folder: &Path, count: usize) {
        info!("Found {count} file(s) to parse in {folder:?}");
    }

    fn override_applied(&self, table: &str, path: &Path) {
        info!("Applied overrides for {table} from {path:?}");
    }

    fn source_completed(&self, summary: &MigrationSummary) {
        if summary.created {
            info!(
                "Migration for {} complete: {} column(s), {} row(s) in {} chunk(s)",
                summary.table, summary.columns, summary.rows_inserted, summary.chunks
            );
        } else {
            info!(
                "Migration for {} complete: no meaningful columns, table not created",
                summary.table
            );
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: Vec<MigrationSummary>,
}

impl RunSummary {
    pub fn tables_created(&self) -> usize {
        self.sources.iter().filter(|source| source.created).count()
    }

    pub fn rows_inserted(&self) -> usize {
        self.sources.iter().map(|source| source.rows_inserted).sum()
    }
}

pub struct MigrationOrchestrator<'a> {
    destination: &'a mut dyn Destination,
    observer: &'a dyn ProgressObserver,
    config: MigrationConfig,
}

impl<'a> MigrationOrchestrator<'a> {
    pub fn new(
        destination: &'a mut dyn Destination,
        observer: &'a dyn ProgressObserver,
        config: MigrationConfig,
    ) -> Self {
        Self {
            destination,
            observer,
            config,
        }
    }

    pub fn run(&mut self, folder: &Path) -> Result<RunSummary> {
        self.config
            .validate()
            .map_err(|err| MigrationError::Config(err.to_string()))?;

        let paths = discover_sources(folder, &self.config.file_pattern)?;
        self.observer.files_discovered(folder, paths.len());

        let sources: Vec<DataTableSource> = paths
            .into_iter()
            .map(|path| DataTableSource::new(path, &self.config))
            .collect();
        self.check_table_collisions(&sources)?;

        let mut summary = RunSummary::default();
        for mut source in sources {
            debug!("Migrating {:?} into {}", source.path(), source.table_name());
            source.parse()?;
            if source.overrides()? {
                self.observer
                    .override_applied(source.table_name(), &source.override_path());
            }
            source.flatten_data();
            let migrated = source.migrate(&mut *self.destination)?;
            source.cleanup();
            self.observer.source_completed(&migrated);
            summary.sources.push(migrated);
        }
        Ok(summary)
    }

    /// Fails when a destination table exists or two files share a table name.
    pub fn check_table_collisions(&self, sources: &[DataTableSource]) -> Result<()> {
        let mut planned = BTreeSet::new();
        for source in sources {
            let table = source.table_name();
            if !planned.insert(table) || self.destination.table_exists(table)? {
                return Err(MigrationError::Collision {
                    table: table.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Files directly under `folder` whose names match `pattern`, sorted by name.
///
/// `*` matches any run of characters and `?` a single character; matching is
/// case-sensitive.
pub fn discover_sources(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = wildcard_matcher(pattern)?;
    let discovery_error = |source| MigrationError::Discovery {
        path: folder.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(folder).map_err(discovery_error)? {
        let path = entry.map_err(discovery_error)?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if matcher.is_match(name) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn wildcard_matcher(pattern: &str) -> Result<Regex> {
    let mut expression = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            other => expression.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    expression.push('$');
    Regex::new(&expression)
        .map_err(|err| MigrationError::Config(format!("invalid file pattern '{pattern}': {err}")))
}
