//! One data table file and its migration into a destination table.
//!
//! A [`DataTableSource`] walks through a fixed sequence of stages:
//!
//! 1. [`parse`](DataTableSource::parse) reads the records of the file and
//!    merges them by identifier;
//! 2. [`overrides`](DataTableSource::overrides) merges the locale override
//!    file, when one exists next to the source;
//! 3. [`flatten_data`](DataTableSource::flatten_data) drops the identifier
//!    keys, keeping first-appearance order;
//! 4. [`migrate`](DataTableSource::migrate) infers one column per attribute,
//!    creates the table and loads the rows in chunked transactions;
//! 5. [`cleanup`](DataTableSource::cleanup) releases the working state.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::debug;

use crate::{
    column::{ColumnTypeInferencer, NULL_SENTINEL, ParsedValue},
    config::MigrationConfig,
    destination::{Destination, SqlDialect, execute_in_transaction},
    error::Result,
    row::{Row, RowSet, parse_identifier},
    xml,
};

/// Outcome of migrating one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub table: String,
    pub created: bool,
    pub columns: usize,
    pub rows_inserted: usize,
    pub rows_skipped: usize,
    pub chunks: usize,
}

/// Destination table name plus its non-meaningless columns, in order.
#[derive(Debug, Clone)]
pub struct TableSpec<'a> {
    pub name: &'a str,
    pub columns: Vec<&'a ColumnTypeInferencer>,
}

impl TableSpec<'_> {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn create_statement(&self, dialect: SqlDialect) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let definitions = self
            .columns
            .iter()
            .map(|column| column.sql_definition(dialect))
            .join(",");
        Some(format!(
            "CREATE TABLE {} ({definitions});",
            dialect.quote_identifier(self.name)
        ))
    }
}

/// A multi-row INSERT together with the number of rows it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertChunk {
    pub statement: String,
    pub rows: usize,
}

#[derive(Debug)]
pub struct DataTableSource {
    path: PathBuf,
    table_name: String,
    config: MigrationConfig,
    keyed: RowSet,
    rows: Vec<Row>,
    columns: Vec<ColumnTypeInferencer>,
}

impl DataTableSource {
    pub fn new(path: impl Into<PathBuf>, config: &MigrationConfig) -> Self {
        let path = path.into();
        let table_name = table_name_for(&path);
        Self {
            path,
            table_name,
            config: config.clone(),
            keyed: RowSet::new(config.identifier_column.clone()),
            rows: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn parse(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.merge_file(&path)
    }

    /// `<dir>/<locale>/<file name>` next to the source file.
    pub fn override_path(&self) -> PathBuf {
        let folder = self.path.parent().unwrap_or_else(|| Path::new(""));
        let mut path = folder.join(&self.config.override_locale);
        if let Some(file_name) = self.path.file_name() {
            path.push(file_name);
        }
        path
    }

    /// Merges the override file when present; returns whether one was applied.
    pub fn overrides(&mut self) -> Result<bool> {
        let override_path = self.override_path();
        if !override_path.is_file() {
            return Ok(false);
        }
        self.merge_file(&override_path)?;
        Ok(true)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let records = xml::read_records(path, &self.config.record_element)?;
        for record in records {
            self.keyed.merge(record);
        }
        Ok(())
    }

    pub fn flatten_data(&mut self) {
        let rows = self.keyed.take_rows();
        self.rows.extend(rows);
    }

    /// Rows pending before [`flatten_data`](Self::flatten_data).
    pub fn keyed_rows(&self) -> &RowSet {
        &self.keyed
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnTypeInferencer] {
        &self.columns
    }

    /// Builds and finishes one inferencer per distinct attribute name.
    pub fn infer_structure(&mut self) {
        let names: Vec<String> = self
            .rows
            .iter()
            .flat_map(Row::names)
            .unique()
            .map(str::to_string)
            .collect();

        self.columns = names
            .into_iter()
            .map(|name| {
                let mut column = if name == self.config.identifier_column {
                    ColumnTypeInferencer::identifier(name)
                } else {
                    ColumnTypeInferencer::new(name)
                };
                for row in &self.rows {
                    column.evaluate(row.get(column.name()).unwrap_or(NULL_SENTINEL));
                }
                let decision = column.finish();
                debug!(
                    "{}.{}: {:?} (nullable: {})",
                    self.table_name,
                    column.name(),
                    decision,
                    column.is_nullable()
                );
                column
            })
            .collect();
    }

    pub fn table_spec(&self) -> TableSpec<'_> {
        TableSpec {
            name: &self.table_name,
            columns: self
                .columns
                .iter()
                .filter(|column| !column.is_meaningless())
                .collect(),
        }
    }

    /// One multi-row INSERT for `chunk`, skipping rows whose identifier is 0.
    ///
    /// Returns `None` when there are no columns or every row was skipped.
    pub fn insert_statement(
        &self,
        chunk: &[Row],
        destination: &dyn Destination,
    ) -> Result<Option<InsertChunk>> {
        let spec = self.table_spec();
        if spec.is_empty() {
            return Ok(None);
        }
        let dialect = destination.dialect();

        let mut lines = Vec::with_capacity(chunk.len());
        for row in chunk {
            if self.identifier_of(row) == 0 {
                continue;
            }
            let values = spec
                .columns
                .iter()
                .map(|column| match row.get(column.name()) {
                    Some(raw) => column
                        .parse_value(raw)
                        .map(|parsed| render_value(&parsed, destination)),
                    None => Ok("NULL".to_string()),
                })
                .collect::<Result<Vec<_>>>()?;
            lines.push(format!("({})", values.join(",")));
        }
        if lines.is_empty() {
            return Ok(None);
        }

        let column_list = spec
            .columns
            .iter()
            .map(|column| dialect.quote_identifier(column.name()))
            .join(",");
        Ok(Some(InsertChunk {
            statement: format!(
                "INSERT INTO {} ({column_list}) VALUES {};",
                dialect.quote_identifier(spec.name),
                lines.join(",")
            ),
            rows: lines.len(),
        }))
    }

    pub fn migrate(&mut self, destination: &mut dyn Destination) -> Result<MigrationSummary> {
        self.infer_structure();

        let mut summary = MigrationSummary {
            table: self.table_name.clone(),
            ..MigrationSummary::default()
        };
        let Some(create) = self.table_spec().create_statement(destination.dialect()) else {
            debug!(
                "Skipping {}: no meaningful columns in {} row(s)",
                self.table_name,
                self.rows.len()
            );
            return Ok(summary);
        };
        execute_in_transaction(destination, &create)?;
        summary.created = true;
        summary.columns = self.table_spec().columns.len();
        debug!("Created table {}", self.table_name);

        for (index, chunk) in self.rows.chunks(self.config.chunk_size).enumerate() {
            let Some(insert) = self.insert_statement(chunk, destination)? else {
                summary.rows_skipped += chunk.len();
                continue;
            };
            execute_in_transaction(destination, &insert.statement)?;
            summary.chunks += 1;
            summary.rows_inserted += insert.rows;
            summary.rows_skipped += chunk.len() - insert.rows;
            debug!(
                "{}: chunk {} inserted {} row(s)",
                self.table_name,
                index + 1,
                insert.rows
            );
        }
        Ok(summary)
    }

    pub fn cleanup(&mut self) {
        self.keyed = RowSet::new(self.config.identifier_column.clone());
        self.rows = Vec::new();
        self.columns = Vec::new();
    }

    fn identifier_of(&self, row: &Row) -> i64 {
        row.get(&self.config.identifier_column)
            .map(parse_identifier)
            .unwrap_or(0)
    }
}

/// Lower-cased file stem of `path`.
pub fn table_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// SQL literal for one parsed value.
///
/// Null literals render as SQL `NULL`, not as a quoted empty string `''`.
fn render_value(value: &ParsedValue, destination: &dyn Destination) -> String {
    match value {
        ParsedValue::Null => destination.quote_literal(None),
        ParsedValue::Text(text) => destination.quote_literal(Some(text.as_str())),
        ParsedValue::Boolean(true) => "1".to_string(),
        ParsedValue::Boolean(false) => "0".to_string(),
        ParsedValue::Integer(value) => value.to_string(),
        ParsedValue::Decimal(value) => value.to_string(),
        ParsedValue::Numeric(literal) => literal.clone(),
    }
}
