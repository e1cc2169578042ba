//! SQLite adapter backed by `rusqlite`.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, ErrorCode};

use super::{Dialect, EngineError, EngineErrorKind, QueryInterface, ResultSet, Value};

/// SQLite connection with foreign key enforcement switched on.
#[derive(Debug)]
pub struct SqliteEngine {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteEngine {
    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory().map_err(connection_error)?;
        Self::configure(conn, None)
    }

    /// Opens (or creates) a database file.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let conn = Connection::open(path).map_err(connection_error)?;
        Self::configure(conn, Some(path.to_path_buf()))
    }

    fn configure(conn: Connection, path: Option<PathBuf>) -> Result<Self, EngineError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(connection_error)?;
        tracing::debug!(
            "Opened SQLite database at {}",
            path.as_deref()
                .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
        );
        Ok(Self { conn, path })
    }

    /// Database file, or None for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` with a watchdog that interrupts the connection once
    /// `timeout` elapses.
    fn with_deadline<T, E>(
        &self,
        timeout: Option<Duration>,
        f: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E> {
        let Some(timeout) = timeout else {
            return f(&self.conn);
        };

        let handle = self.conn.get_interrupt_handle();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let watchdog = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
                tracing::warn!("Query exceeded {} ms, interrupting", timeout.as_millis());
                handle.interrupt();
            }
        });

        let result = f(&self.conn);
        drop(done_tx);
        if watchdog.join().is_err() {
            tracing::error!("Query watchdog thread panicked");
        }
        result
    }
}

impl QueryInterface for SqliteEngine {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute_batch(&mut self, sql: &str) -> Result<(), EngineError> {
        self.conn.execute_batch(sql).map_err(EngineError::from)
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, EngineError> {
        let params = params.iter().map(to_sqlite);
        self.conn
            .execute(sql, params_from_iter(params))
            .map_err(EngineError::from)
    }

    fn query(&self, sql: &str, timeout: Option<Duration>) -> Result<ResultSet, EngineError> {
        self.with_deadline(timeout, |conn| -> Result<ResultSet, EngineError> {
            let mut stmt = conn.prepare(sql)?;
            // A leading WITH can still carry a DELETE/UPDATE/INSERT.
            if !stmt.readonly() {
                return Err(EngineError::new(
                    EngineErrorKind::Rejected,
                    "statement is not read-only",
                ));
            }
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();
            let width = columns.len();

            let mut rows = stmt.query([])?;
            let mut materialized = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(width);
                for index in 0..width {
                    values.push(from_sqlite(row.get_ref(index)?));
                }
                materialized.push(values);
            }

            Ok(ResultSet {
                columns,
                rows: materialized,
            })
        })
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        let kind = match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => EngineErrorKind::Constraint,
            Some(ErrorCode::OperationInterrupted) => EngineErrorKind::Interrupted,
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::NotADatabase) => {
                EngineErrorKind::Connection
            }
            _ => EngineErrorKind::Rejected,
        };
        EngineError::new(kind, err.to_string())
    }
}

fn connection_error(err: rusqlite::Error) -> EngineError {
    EngineError::new(EngineErrorKind::Connection, err.to_string())
}

fn to_sqlite(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(r) => rusqlite::types::Value::Real(*r),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
