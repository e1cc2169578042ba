//! Machine-readable run report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::engine::Dialect;
use crate::error::TutorError;
use crate::scenario::SubqueryPattern;
use crate::verify::VerificationFailure;

/// Final state of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed(VerificationFailure),
    Errored { error: String },
    Skipped { reason: String },
}

impl ScenarioStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioStatus::Passed => "PASS",
            ScenarioStatus::Failed(_) => "FAIL",
            ScenarioStatus::Errored { .. } => "ERROR",
            ScenarioStatus::Skipped { .. } => "SKIP",
        }
    }
}

/// Report entry for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub pattern: SubqueryPattern,
    pub duration_ms: u64,
    /// Rows returned by the engine, when the query ran
    pub row_count: Option<usize>,
    #[serde(flatten)]
    pub status: ScenarioStatus,
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

/// Report for a complete run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub dialect: Dialect,
    pub duration_ms: u64,
    /// Schema load or connection failure that ended the run
    pub fatal: Option<String>,
    /// Dataset checksum right after loading
    pub checksum_before: Option<u32>,
    /// Dataset checksum after the last scenario
    pub checksum_after: Option<u32>,
    pub summary: Summary,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    /// Report for a run that never got past loading.
    pub fn fatal(dialect: Dialect, error: &TutorError, duration_ms: u64) -> Self {
        Self {
            dialect,
            duration_ms,
            fatal: Some(error.to_string()),
            checksum_before: None,
            checksum_after: None,
            summary: Summary::default(),
            scenarios: Vec::new(),
        }
    }

    /// Builds a report and tallies the summary.
    pub fn completed(
        dialect: Dialect,
        scenarios: Vec<ScenarioReport>,
        checksum_before: Option<u32>,
        checksum_after: Option<u32>,
        duration_ms: u64,
    ) -> Self {
        let mut summary = Summary {
            total: scenarios.len(),
            ..Default::default()
        };
        for scenario in &scenarios {
            match scenario.status {
                ScenarioStatus::Passed => summary.passed += 1,
                ScenarioStatus::Failed(_) => summary.failed += 1,
                ScenarioStatus::Errored { .. } => summary.errored += 1,
                ScenarioStatus::Skipped { .. } => summary.skipped += 1,
            }
        }
        Self {
            dialect,
            duration_ms,
            fatal: None,
            checksum_before,
            checksum_after,
            summary,
            scenarios,
        }
    }

    /// True only when both checksums were taken and match. A missing
    /// checksum leaves isolation unverified, which counts as a failure.
    pub fn dataset_unchanged(&self) -> bool {
        matches!(
            (self.checksum_before, self.checksum_after),
            (Some(before), Some(after)) if before == after
        )
    }

    /// Whether both dataset checksums were taken.
    pub fn isolation_verified(&self) -> bool {
        self.checksum_before.is_some() && self.checksum_after.is_some()
    }

    pub fn all_passed(&self) -> bool {
        self.fatal.is_none()
            && self.summary.passed == self.summary.total
            && self.dataset_unchanged()
    }

    /// Process exit code: 0 all passed, 1 any scenario did not pass, 2 fatal.
    pub fn exit_code(&self) -> i32 {
        if self.fatal.is_some() {
            2
        } else if self.all_passed() {
            0
        } else {
            1
        }
    }

    pub fn to_json(&self) -> Result<String, TutorError> {
        serde_json::to_string_pretty(self).map_err(|e| TutorError::Serialization(e.to_string()))
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), TutorError> {
        let file = File::create(path)
            .map_err(|e| TutorError::Io(format!("{}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| TutorError::Serialization(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| TutorError::Io(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Wrote report to {}", path.display());
        Ok(())
    }
}
