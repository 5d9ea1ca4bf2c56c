//! SQL destinations that receive the generated DDL and bulk inserts.
//!
//! The migration core never talks to a database directly. It is handed a
//! [`Destination`] which answers table-existence checks, scopes statements in
//! transactions, and quotes string literals for its [`SqlDialect`].
//!
//! Two adapters ship with the crate:
//!
//! - [`SqliteDestination`]: an embedded SQLite database via `rusqlite`.
//! - [`ScriptDestination`]: a MySQL-dialect SQL script written to a file or
//!   stdout, for loading with an external client.

mod script;
mod sqlite;

use log::warn;

pub use script::ScriptDestination;
pub use sqlite::SqliteDestination;

use crate::error::DestinationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Sqlite,
}

impl SqlDialect {
    pub fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// Renders `value` as a string literal; `None` becomes `NULL`.
    pub fn quote_literal(&self, value: Option<&str>) -> String {
        let Some(value) = value else {
            return "NULL".to_string();
        };
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('\'');
        match self {
            SqlDialect::MySql => {
                for ch in value.chars() {
                    match ch {
                        '\0' => quoted.push_str("\\0"),
                        '\n' => quoted.push_str("\\n"),
                        '\r' => quoted.push_str("\\r"),
                        '\\' => quoted.push_str("\\\\"),
                        '\'' => quoted.push_str("\\'"),
                        '"' => quoted.push_str("\\\""),
                        '\u{1a}' => quoted.push_str("\\Z"),
                        other => quoted.push(other),
                    }
                }
            }
            SqlDialect::Sqlite => {
                for ch in value.chars() {
                    if ch == '\'' {
                        quoted.push('\'');
                    }
                    quoted.push(ch);
                }
            }
        }
        quoted.push('\'');
        quoted
    }

    /// Column definition of the reserved auto-incrementing primary key.
    pub fn identity_column(&self, name: &str) -> String {
        let name = self.quote_identifier(name);
        match self {
            SqlDialect::MySql => format!("{name} INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY"),
            // AUTOINCREMENT is only accepted on an exact INTEGER PRIMARY KEY
            SqlDialect::Sqlite => format!("{name} INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT"),
        }
    }

    pub fn begin_statement(&self) -> &'static str {
        match self {
            SqlDialect::MySql => "START TRANSACTION;",
            SqlDialect::Sqlite => "BEGIN;",
        }
    }
}

/// Injected SQL capability used by the migration pipeline.
pub trait Destination {
    fn dialect(&self) -> SqlDialect;

    fn table_exists(&self, table: &str) -> Result<bool, DestinationError>;

    fn begin(&mut self) -> Result<(), DestinationError>;

    fn execute(&mut self, statement: &str) -> Result<(), DestinationError>;

    fn commit(&mut self) -> Result<(), DestinationError>;

    fn rollback(&mut self) -> Result<(), DestinationError>;

    fn quote_literal(&self, value: Option<&str>) -> String {
        self.dialect().quote_literal(value)
    }
}

/// Runs `statement` as its own transaction, rolling back when it fails.
pub fn execute_in_transaction(
    destination: &mut dyn Destination,
    statement: &str,
) -> Result<(), DestinationError> {
    destination.begin()?;
    if let Err(err) = destination.execute(statement) {
        if let Err(rollback_err) = destination.rollback() {
            warn!("Rollback after failed statement also failed: {rollback_err}");
        }
        return Err(err);
    }
    destination.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_literal_escapes_backslashes_and_quotes() {
        let quoted = SqlDialect::MySql.quote_literal(Some("it's a \\ path\n"));
        assert_eq!(quoted, "'it\\'s a \\\\ path\\n'");
    }

    #[test]
    fn sqlite_literal_doubles_single_quotes() {
        let quoted = SqlDialect::Sqlite.quote_literal(Some("O'Brien"));
        assert_eq!(quoted, "'O''Brien'");
    }

    #[test]
    fn missing_literal_renders_null() {
        assert_eq!(SqlDialect::MySql.quote_literal(None), "NULL");
        assert_eq!(SqlDialect::Sqlite.quote_literal(None), "NULL");
    }

    #[test]
    fn identity_column_matches_dialect() {
        assert_eq!(
            SqlDialect::MySql.identity_column("classid"),
            "`classid` INT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY"
        );
        assert_eq!(
            SqlDialect::Sqlite.identity_column("classid"),
            "`classid` INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT"
        );
    }

    #[test]
    fn identifiers_escape_backticks() {
        assert_eq!(SqlDialect::MySql.quote_identifier("we`ird"), "`we``ird`");
    }
}
