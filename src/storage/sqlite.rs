//! SQLite store connection.
//!
//! `Database` wraps a rusqlite connection together with the dialect and
//! schema prefix used to render queries. The connection is reference
//! counted so that a duplicate handle can share it without ever closing
//! it.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, ToSql};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::storage::dialect::Dialect;
use crate::storage::row::{Cursor, Row};
use crate::storage::schema::{apply_schema, is_initialized};

#[derive(Debug)]
pub struct Database {
    conn: Rc<Connection>,
    dialect: Dialect,
    schema: String,
    duplicate: bool,
}

impl Database {
    /// Open an existing store.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if the file does not exist or has no
    /// schema, or a database error if the connection fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open an existing store with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Same as [`Database::open`].
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotInitialized {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(timeout_ms.map_or(Duration::from_secs(5), Duration::from_millis))?;
        if !is_initialized(&conn)? {
            return Err(Error::NotInitialized {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), "opened store");
        Ok(Self::from_connection(conn))
    }

    /// Create (or upgrade) a store at the given path and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the schema fails.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        debug!(path = %path.display(), "created store");
        Ok(Self::from_connection(conn))
    }

    /// Open an in-memory store with the schema applied (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Rc::new(conn),
            dialect: Dialect::default(),
            schema: String::new(),
            duplicate: false,
        }
    }

    #[must_use]
    pub const fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Prefix every table name with `schema.`. An empty schema means none.
    #[must_use]
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = if schema.is_empty() || schema.ends_with('.') {
            schema.to_string()
        } else {
            format!("{schema}.")
        };
        self
    }

    /// A handle sharing this connection. Closing it leaves the connection open.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            conn: Rc::clone(&self.conn),
            dialect: self.dialect,
            schema: self.schema.clone(),
            duplicate: true,
        }
    }

    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        self.duplicate
    }

    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Table name with the schema prefix applied.
    #[must_use]
    pub fn table(&self, name: &str) -> String {
        format!("{}{name}", self.schema)
    }

    /// Run a query and buffer every row.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub fn select(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Cursor> {
        trace!(sql, "select");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

        let mut rows = stmt.query(params)?;
        let mut buffered = Vec::new();
        while let Some(row) = rows.next()? {
            let mut pairs = Vec::with_capacity(columns.len());
            for (index, name) in columns.iter().enumerate() {
                pairs.push((name.clone(), row.get::<_, Value>(index)?));
            }
            buffered.push(Row::from_pairs(pairs));
        }
        Ok(Cursor::new(buffered))
    }

    /// Run a query expected to return at most one row.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub fn select_one(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<Row>> {
        Ok(self.select(sql, params)?.next())
    }

    /// Number of rows a request returns, by wrapping it in `COUNT(*)`.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub fn count(&self, request: &str, params: &[&dyn ToSql]) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM ({request}) counted");
        let count: i64 = self.conn.query_row(&sql, params, |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Single integer column of the first row, `None` if no row or NULL.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub fn query_i64(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<i64>> {
        let value: Option<Option<i64>> = self
            .conn
            .query_row(sql, params, |row| row.get(0))
            .optional()?;
        Ok(value.flatten())
    }

    /// Execute a statement, returning the number of changed rows.
    ///
    /// # Errors
    ///
    /// Returns a database error if the statement fails.
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Close the connection unless this handle is a duplicate.
    ///
    /// When duplicates are still alive the connection stays open until the
    /// last of them is dropped.
    ///
    /// # Errors
    ///
    /// Returns a database error if SQLite refuses to close.
    pub fn close(self) -> Result<()> {
        if self.duplicate {
            trace!("leaving shared connection open");
            return Ok(());
        }
        match Rc::try_unwrap(self.conn) {
            Ok(conn) => conn.close().map_err(|(_, e)| Error::Database(e)),
            Err(_) => {
                debug!("connection still shared by a duplicate, deferring close");
                Ok(())
            }
        }
    }
}
