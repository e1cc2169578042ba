//! Named subquery scenarios and their execution.

mod executor;
mod registry;

use std::fmt;

use serde::Serialize;

use crate::engine::Row;

pub use executor::{ensure_read_only, run};
pub use registry::ScenarioRegistry;

/// Subquery technique a scenario demonstrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubqueryPattern {
    /// Single value compared against each row
    Scalar,
    /// Membership test against a list (IN)
    List,
    /// Correlated subquery in the select list
    CorrelatedSelect,
    /// Correlated NOT EXISTS filter
    CorrelatedNotExists,
    /// Aliased subquery in FROM
    DerivedTable,
    /// Named intermediate result (WITH)
    CommonTableExpression,
}

impl fmt::Display for SubqueryPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubqueryPattern::Scalar => "scalar subquery",
            SubqueryPattern::List => "list subquery (IN)",
            SubqueryPattern::CorrelatedSelect => "correlated subquery in SELECT",
            SubqueryPattern::CorrelatedNotExists => "correlated NOT EXISTS",
            SubqueryPattern::DerivedTable => "derived table in FROM",
            SubqueryPattern::CommonTableExpression => "common table expression",
        };
        f.write_str(name)
    }
}

/// Whether row order is part of a scenario's expected result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// Compare as a multiset
    Unordered,
    /// Sequence must match exactly
    Exact,
}

/// Immutable scenario record.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub pattern: SubqueryPattern,
    pub description: &'static str,
    pub query: &'static str,
    /// Expected column names, for display
    pub columns: &'static [&'static str],
    pub expected: Vec<Row>,
    pub order: RowOrder,
}
