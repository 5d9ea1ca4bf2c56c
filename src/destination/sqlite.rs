use std::path::Path;

use log::debug;
use rusqlite::Connection;

use super::{Destination, SqlDialect};
use crate::error::DestinationError;

/// Destination backed by an embedded SQLite database.
pub struct SqliteDestination {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteDestination {
    pub fn open(path: &Path) -> Result<Self, DestinationError> {
        debug!("Opening SQLite database {path:?}");
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, DestinationError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            in_transaction: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Destination for SqliteDestination {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn table_exists(&self, table: &str) -> Result<bool, DestinationError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn begin(&mut self) -> Result<(), DestinationError> {
        if self.in_transaction {
            return Err(DestinationError::Transaction(
                "a transaction is already open".to_string(),
            ));
        }
        self.conn.execute_batch("BEGIN")?;
        self.in_transaction = true;
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> Result<(), DestinationError> {
        self.conn.execute_batch(statement)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DestinationError> {
        if !self.in_transaction {
            return Err(DestinationError::Transaction(
                "commit without an open transaction".to_string(),
            ));
        }
        self.in_transaction = false;
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DestinationError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
