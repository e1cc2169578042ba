//! Runs one scenario against the query interface.

use std::time::{Duration, Instant};

use crate::engine::{EngineError, EngineErrorKind, QueryInterface, ResultSet};
use crate::error::TutorError;

use super::Scenario;

/// Submits the scenario's query and materializes every returned row.
///
/// # Arguments
/// * `conn` - Connection holding the loaded fixture
/// * `scenario` - Scenario to execute
/// * `timeout` - Upper bound on query execution (None = unbounded)
///
/// # Returns
/// `Result<ResultSet, TutorError>`; engine failures are wrapped in
/// `TutorError::Query` with the scenario name.
pub fn run(
    conn: &dyn QueryInterface,
    scenario: &Scenario,
    timeout: Option<Duration>,
) -> Result<ResultSet, TutorError> {
    ensure_read_only(scenario.name, scenario.query)?;

    let start = Instant::now();
    let rows = conn
        .query(scenario.query, timeout)
        .map_err(|source| TutorError::Query {
            scenario: scenario.name.to_string(),
            source,
        })?;

    tracing::debug!(
        "Scenario {} returned {} rows in {:?}",
        scenario.name,
        rows.len(),
        start.elapsed()
    );
    Ok(rows)
}

/// Rejects statements that do not start with SELECT or WITH.
pub fn ensure_read_only(scenario: &str, query: &str) -> Result<(), TutorError> {
    let keyword = strip_leading_comments(query)
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" | "WITH" => Ok(()),
        _ => Err(TutorError::Query {
            scenario: scenario.to_string(),
            source: EngineError::new(
                EngineErrorKind::Rejected,
                format!("scenario queries must be read-only, found '{keyword}' statement"),
            ),
        }),
    }
}

fn strip_leading_comments(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}
