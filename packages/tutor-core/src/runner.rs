//! Drives a full run: load the fixture, then execute and verify each
//! scenario in registry order.

use std::time::{Duration, Instant};

use crate::config::RunConfig;
use crate::engine::{self, EngineErrorKind, QueryInterface};
use crate::error::TutorError;
use crate::fixture::{dataset_checksum, SchemaLoader};
use crate::report::{RunReport, ScenarioReport, ScenarioStatus};
use crate::scenario::{self, Scenario, ScenarioRegistry};
use crate::verify;

/// Run lifecycle.
///
/// `NotStarted → SchemaLoaded → {ScenarioRunning → ScenarioVerified}* → Completed`;
/// a failed load goes straight from `NotStarted` to `Completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    SchemaLoaded,
    ScenarioRunning(&'static str),
    ScenarioVerified(&'static str),
    Completed,
}

impl RunState {
    fn can_advance_to(&self, next: &RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (NotStarted, SchemaLoaded) | (NotStarted, Completed) => true,
            (SchemaLoaded, ScenarioRunning(_)) | (SchemaLoaded, Completed) => true,
            (ScenarioRunning(a), ScenarioVerified(b)) => a == b,
            (ScenarioVerified(_), ScenarioRunning(_)) | (ScenarioVerified(_), Completed) => true,
            _ => false,
        }
    }
}

/// Sequential fixture-and-scenario runner.
#[derive(Debug)]
pub struct DemoRunner {
    config: RunConfig,
    loader: SchemaLoader,
    registry: ScenarioRegistry,
    state: RunState,
    history: Vec<RunState>,
}

impl DemoRunner {
    /// Runner over the standard fixture and all registered scenarios.
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            loader: SchemaLoader::standard(),
            registry: ScenarioRegistry::standard(),
            state: RunState::NotStarted,
            history: vec![RunState::NotStarted],
        }
    }

    pub fn with_loader(mut self, loader: SchemaLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_registry(mut self, registry: ScenarioRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn registry(&self) -> &ScenarioRegistry {
        &self.registry
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Every state visited by the last run, in order.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Opens a connection for the configured dialect and runs against it.
    ///
    /// A connection failure produces a fatal report.
    pub fn execute(&mut self) -> RunReport {
        let start = Instant::now();
        match engine::open(&self.config) {
            Ok(mut conn) => self.run(conn.as_mut()),
            Err(e) => {
                let err = TutorError::Engine(e);
                tracing::error!("Failed to open {} connection: {}", self.config.dialect, err);
                self.reset();
                self.advance(RunState::Completed);
                RunReport::fatal(self.config.dialect, &err, elapsed_ms(start))
            }
        }
    }

    /// Loads the fixture and runs every scenario on `conn`.
    ///
    /// Scenario failures are recorded and the run continues; a load failure
    /// or an exhausted run timeout ends it early.
    pub fn run(&mut self, conn: &mut dyn QueryInterface) -> RunReport {
        let start = Instant::now();
        let deadline = self.config.run_timeout().map(|t| start + t);
        self.reset();

        if let Err(e) = self.loader.load(conn) {
            tracing::error!("Schema load failed: {}", e);
            self.advance(RunState::Completed);
            return RunReport::fatal(conn.dialect(), &e, elapsed_ms(start));
        }
        self.advance(RunState::SchemaLoaded);

        let checksum_before = checksum(conn);
        let scenarios: Vec<Scenario> = self.registry.iter().cloned().collect();
        let mut reports = Vec::with_capacity(scenarios.len());

        for (index, scenario) in scenarios.iter().enumerate() {
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            if remaining == Some(Duration::ZERO) {
                let err = TutorError::Timeout {
                    limit_ms: self.config.run_timeout_ms,
                };
                tracing::warn!(
                    "{}; skipping {} remaining scenarios",
                    err,
                    scenarios.len() - index
                );
                reports.extend(scenarios[index..].iter().map(|s| skipped(s, &err)));
                break;
            }

            self.advance(RunState::ScenarioRunning(scenario.name));
            let report = self.run_scenario(conn, scenario, remaining);
            self.advance(RunState::ScenarioVerified(scenario.name));
            reports.push(report);
        }

        let checksum_after = checksum(conn);
        if checksum_before.is_none() || checksum_after.is_none() {
            tracing::error!("Dataset isolation could not be verified");
        } else if checksum_before != checksum_after {
            tracing::error!(
                "Dataset changed during scenario run ({:?} -> {:?})",
                checksum_before,
                checksum_after
            );
        }
        self.advance(RunState::Completed);

        let report = RunReport::completed(
            conn.dialect(),
            reports,
            checksum_before,
            checksum_after,
            elapsed_ms(start),
        );
        tracing::info!(
            "Run completed: {}/{} passed, {} failed, {} errored, {} skipped",
            report.summary.passed,
            report.summary.total,
            report.summary.failed,
            report.summary.errored,
            report.summary.skipped
        );
        report
    }

    fn run_scenario(
        &self,
        conn: &dyn QueryInterface,
        scenario: &Scenario,
        remaining: Option<Duration>,
    ) -> ScenarioReport {
        let start = Instant::now();
        let run_bound_applies = match (remaining, self.config.query_timeout()) {
            (Some(r), Some(q)) => r < q,
            (Some(_), None) => true,
            (None, _) => false,
        };
        let timeout = if run_bound_applies {
            remaining
        } else {
            self.config.query_timeout()
        };

        tracing::debug!("Running scenario {} ({})", scenario.name, scenario.pattern);
        let (row_count, status) = match scenario::run(conn, scenario, timeout) {
            Ok(rows) => {
                let status = match verify::verify(
                    &rows.rows,
                    &scenario.expected,
                    scenario.order,
                    self.config.tolerance,
                ) {
                    Ok(()) => ScenarioStatus::Passed,
                    Err(failure) => {
                        tracing::warn!("Scenario {} failed: {}", scenario.name, failure);
                        ScenarioStatus::Failed(failure)
                    }
                };
                (Some(rows.len()), status)
            }
            Err(e) => {
                let e = match e {
                    TutorError::Query { source, .. }
                        if source.kind == EngineErrorKind::Interrupted && run_bound_applies =>
                    {
                        TutorError::Timeout {
                            limit_ms: self.config.run_timeout_ms,
                        }
                    }
                    other => other,
                };
                tracing::warn!("Scenario {} errored: {}", scenario.name, e);
                (
                    None,
                    ScenarioStatus::Errored {
                        error: e.to_string(),
                    },
                )
            }
        };

        ScenarioReport {
            name: scenario.name.to_string(),
            pattern: scenario.pattern,
            duration_ms: elapsed_ms(start),
            row_count,
            status,
        }
    }

    fn reset(&mut self) {
        self.state = RunState::NotStarted;
        self.history = vec![RunState::NotStarted];
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(&next),
            "illegal run transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!("Run state {:?} -> {:?}", self.state, next);
        self.history.push(next.clone());
        self.state = next;
    }
}

fn skipped(scenario: &Scenario, cause: &TutorError) -> ScenarioReport {
    ScenarioReport {
        name: scenario.name.to_string(),
        pattern: scenario.pattern,
        duration_ms: 0,
        row_count: None,
        status: ScenarioStatus::Skipped {
            reason: cause.to_string(),
        },
    }
}

fn checksum(conn: &dyn QueryInterface) -> Option<u32> {
    match dataset_checksum(conn) {
        Ok(sum) => Some(sum),
        Err(e) => {
            tracing::warn!("Could not checksum dataset: {}", e);
            None
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
