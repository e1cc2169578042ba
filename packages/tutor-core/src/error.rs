//! Tutor error types.

use thiserror::Error;

use crate::engine::EngineError;

/// Errors raised while loading the fixture or running scenarios.
#[derive(Error, Debug, Clone)]
pub enum TutorError {
    /// DDL rejected by the engine
    #[error("Schema rejected for table '{table}': {source}")]
    Schema {
        table: String,
        #[source]
        source: EngineError,
    },

    /// Referential invariant violated at load time
    #[error("Integrity violation in table '{table}': {detail}")]
    Integrity { table: String, detail: String },

    /// Scenario query rejected or failed at execution time
    #[error("Query failed for scenario '{scenario}': {source}")]
    Query {
        scenario: String,
        #[source]
        source: EngineError,
    },

    /// Run exceeded its configured bound
    #[error("Run exceeded timeout of {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    /// Engine failure outside schema loading and scenario execution
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scenario name not present in the registry
    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    /// Dialect name without an adapter
    #[error("Unknown dialect '{name}' (supported: {supported})")]
    UnknownDialect { name: String, supported: String },

    /// I/O error while writing the report
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error while encoding the report
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TutorError {
    /// Returns true for errors that make the fixture unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TutorError::Schema { .. } | TutorError::Integrity { .. } | TutorError::Engine(_)
        )
    }
}
