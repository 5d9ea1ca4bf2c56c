//! The `infer` command: column inference for a single data table file.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::InferArgs,
    column::{ColumnType, ColumnTypeInferencer},
    config::MigrationConfig,
    destination::SqlDialect,
    source::DataTableSource,
    table::{self, Column},
};

pub fn execute(args: &InferArgs) -> Result<()> {
    let config = args.settings.resolve()?;
    let source = infer_file(&args.input, &config, !args.no_overrides)
        .with_context(|| format!("Inferring columns of {:?}", args.input))?;
    info!(
        "Inferred {} column(s) for table {} from {} row(s)",
        source.columns().len(),
        source.table_name(),
        source.rows().len()
    );
    table::print_table(&headers(), &column_rows(source.columns(), SqlDialect::MySql));
    Ok(())
}

/// Parses `path` (and its override file, when `apply_overrides` is set) and
/// decides every column without touching a destination.
pub fn infer_file(
    path: &Path,
    config: &MigrationConfig,
    apply_overrides: bool,
) -> crate::error::Result<DataTableSource> {
    let mut source = DataTableSource::new(path, config);
    source.parse()?;
    if apply_overrides && source.overrides()? {
        info!("Applied overrides from {:?}", source.override_path());
    }
    source.flatten_data();
    source.infer_structure();
    Ok(source)
}

pub fn headers() -> Vec<Column> {
    vec![
        Column::right("#"),
        Column::left("name"),
        Column::left("type"),
        Column::left("nullable"),
        Column::right("length"),
        Column::left("definition"),
    ]
}

pub fn column_rows(columns: &[ColumnTypeInferencer], dialect: SqlDialect) -> Vec<Vec<String>> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let (kind, length, definition) = if column.is_meaningless() {
                ("meaningless".to_string(), String::new(), String::new())
            } else {
                (
                    type_label(column),
                    if is_varchar(column) {
                        column.column_length().to_string()
                    } else {
                        String::new()
                    },
                    column.sql_definition(dialect),
                )
            };
            vec![
                (idx + 1).to_string(),
                column.name().to_string(),
                kind,
                if column.is_nullable() { "yes" } else { "no" }.to_string(),
                length,
                definition,
            ]
        })
        .collect()
}

fn type_label(column: &ColumnTypeInferencer) -> String {
    if column.is_identifier() {
        return "identifier".to_string();
    }
    match column.integer_subtype() {
        Some(subtype) => format!("integer ({})", subtype.sql_type().to_ascii_lowercase()),
        None => column.data_type().to_string(),
    }
}

fn is_varchar(column: &ColumnTypeInferencer) -> bool {
    if column.is_identifier() {
        return false;
    }
    match column.data_type() {
        ColumnType::String => true,
        ColumnType::Integer => column.integer_subtype().is_none(),
        ColumnType::Float | ColumnType::Boolean => false,
    }
}
