//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::engine::Dialect;

/// Run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Query interface adapter
    pub dialect: Dialect,
    /// Database file (None = in-memory)
    pub database: Option<PathBuf>,
    /// Per-query timeout in milliseconds (0 = unbounded)
    pub query_timeout_ms: u64,
    /// Whole-run timeout in milliseconds (0 = unbounded)
    pub run_timeout_ms: u64,
    /// Absolute tolerance for numeric comparisons
    pub tolerance: f64,
}

impl RunConfig {
    /// Per-query timeout, if bounded.
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    /// Whole-run timeout, if bounded.
    pub fn run_timeout(&self) -> Option<Duration> {
        (self.run_timeout_ms > 0).then(|| Duration::from_millis(self.run_timeout_ms))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            database: None,
            query_timeout_ms: 5000, // 5 seconds default
            run_timeout_ms: 30000,  // 30 seconds default
            tolerance: 1e-6,
        }
    }
}
