use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use super::{Destination, SqlDialect};
use crate::error::DestinationError;

/// Destination that writes a MySQL-dialect script instead of executing it.
///
/// Table existence is answered from the set of known tables supplied with
/// [`ScriptDestination::with_known_tables`]; the script itself is never read
/// back.
pub struct ScriptDestination<W: Write> {
    writer: W,
    known_tables: BTreeSet<String>,
    in_transaction: bool,
    statements: usize,
}

impl ScriptDestination<Box<dyn Write>> {
    /// Opens `path` for writing; `-` writes to stdout.
    pub fn create(path: &Path) -> Result<Self, DestinationError> {
        let writer: Box<dyn Write> = if path == Path::new("-") {
            Box::new(std::io::stdout())
        } else {
            Box::new(BufWriter::new(File::create(path)?))
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write> ScriptDestination<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            known_tables: BTreeSet::new(),
            in_transaction: false,
            statements: 0,
        }
    }

    pub fn with_known_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Number of statements written, excluding transaction markers.
    pub fn statement_count(&self) -> usize {
        self.statements
    }

    pub fn into_inner(mut self) -> Result<W, DestinationError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> Destination for ScriptDestination<W> {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::MySql
    }

    fn table_exists(&self, table: &str) -> Result<bool, DestinationError> {
        Ok(self.known_tables.contains(table))
    }

    fn begin(&mut self) -> Result<(), DestinationError> {
        if self.in_transaction {
            return Err(DestinationError::Transaction(
                "a transaction is already open".to_string(),
            ));
        }
        writeln!(self.writer, "{}", self.dialect().begin_statement())?;
        self.in_transaction = true;
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), DestinationError> {
        writeln!(self.writer, "{statement}")?;
        self.statements += 1;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DestinationError> {
        if !self.in_transaction {
            return Err(DestinationError::Transaction(
                "commit without an open transaction".to_string(),
            ));
        }
        self.in_transaction = false;
        writeln!(self.writer, "COMMIT;")?;
        self.writer.flush()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DestinationError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        writeln!(self.writer, "ROLLBACK;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destination::execute_in_transaction;

    #[test]
    fn statements_are_wrapped_in_transaction_markers() {
        let mut destination = ScriptDestination::new(Vec::new());
        execute_in_transaction(&mut destination, "CREATE TABLE t (`a` BIT NOT NULL);").unwrap();
        assert_eq!(destination.statement_count(), 1);
        let script = String::from_utf8(destination.into_inner().unwrap()).unwrap();
        assert_eq!(
            script,
            "START TRANSACTION;\nCREATE TABLE t (`a` BIT NOT NULL);\nCOMMIT;\n"
        );
    }

    #[test]
    fn known_tables_drive_existence_checks() {
        let destination = ScriptDestination::new(Vec::new()).with_known_tables(["datatable_item"]);
        assert!(destination.table_exists("datatable_item").unwrap());
        assert!(!destination.table_exists("datatable_skill").unwrap());
    }
}
