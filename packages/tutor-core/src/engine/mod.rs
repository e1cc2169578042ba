//! Query interface seam between the tutor and an external SQL engine.
//!
//! The loader and executor only ever talk to a [`QueryInterface`]; each
//! supported dialect provides one adapter.

mod sqlite;
mod value;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::RunConfig;
use crate::error::TutorError;

pub use sqlite::SqliteEngine;
pub use value::{format_row, ResultSet, Row, Value};

/// Classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Constraint violation (foreign key, unique, check)
    Constraint,
    /// Statement interrupted by a timeout
    Interrupted,
    /// Statement rejected (syntax, missing table, type mismatch)
    Rejected,
    /// Connection could not be opened or configured
    Connection,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineErrorKind::Constraint => "constraint violation",
            EngineErrorKind::Interrupted => "interrupted",
            EngineErrorKind::Rejected => "rejected",
            EngineErrorKind::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// Error reported by the underlying engine, with its original message.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Submit SQL text, get rows or an error.
///
/// Writes take `&mut self` so that only the owner of the connection can
/// change the dataset; scenario queries go through [`QueryInterface::query`].
pub trait QueryInterface {
    /// Dialect served by this adapter.
    fn dialect(&self) -> Dialect;

    /// Executes one or more statements that return no rows.
    fn execute_batch(&mut self, sql: &str) -> Result<(), EngineError>;

    /// Executes a single parameterized statement, returning affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, EngineError>;

    /// Runs a query and materializes every row.
    ///
    /// # Arguments
    /// * `sql` - Query text
    /// * `timeout` - Upper bound on execution time (None = unbounded)
    fn query(&self, sql: &str, timeout: Option<Duration>) -> Result<ResultSet, EngineError>;

    fn begin(&mut self) -> Result<(), EngineError> {
        self.execute_batch("BEGIN")
    }

    fn commit(&mut self) -> Result<(), EngineError> {
        self.execute_batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), EngineError> {
        self.execute_batch("ROLLBACK")
    }
}

/// Supported query interface adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
}

impl Dialect {
    pub const ALL: &'static [Dialect] = &[Dialect::Sqlite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(TutorError::UnknownDialect {
                name: s.to_string(),
                supported: Dialect::ALL
                    .iter()
                    .map(Dialect::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

/// Opens a connection for the configured dialect.
pub fn open(config: &RunConfig) -> Result<Box<dyn QueryInterface>, EngineError> {
    match config.dialect {
        Dialect::Sqlite => {
            let engine = match &config.database {
                Some(path) => SqliteEngine::open(path)?,
                None => SqliteEngine::open_in_memory()?,
            };
            Ok(Box::new(engine))
        }
    }
}
