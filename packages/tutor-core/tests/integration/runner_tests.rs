//! Full runs through the runner.

use ntest::timeout;
use tempfile::tempdir;

use tutor_core::engine::SqliteEngine;
use tutor_core::fixture::{Fixture, SchemaLoader};
use tutor_core::report::ScenarioStatus;
use tutor_core::runner::RunState;
use tutor_core::scenario::ScenarioRegistry;
use tutor_core::{DemoRunner, RunConfig, Value};

use super::helpers::{adhoc, ENDLESS_QUERY};

/// Standard run passes every scenario and visits every state in order
#[timeout(10000)]
#[test]
fn test_standard_run_passes() {
    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let mut runner = DemoRunner::new(RunConfig::default());
    let report = runner.run(&mut engine);

    assert_eq!(report.fatal, None);
    assert_eq!(report.summary.total, 6);
    assert_eq!(report.summary.passed, 6);
    assert!(report.dataset_unchanged());
    assert!(report.checksum_before.is_some());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(runner.state(), &RunState::Completed);

    let history = runner.history();
    assert_eq!(history.len(), 2 + 2 * 6 + 1);
    assert_eq!(history[0], RunState::NotStarted);
    assert_eq!(history[1], RunState::SchemaLoaded);
    for (i, name) in runner.registry().names().into_iter().enumerate() {
        assert_eq!(history[2 + 2 * i], RunState::ScenarioRunning(name));
        assert_eq!(history[3 + 2 * i], RunState::ScenarioVerified(name));
    }
    assert_eq!(history.last(), Some(&RunState::Completed));
}

/// Schema load failure is fatal and runs no scenario
#[timeout(5000)]
#[test]
fn test_integrity_failure_is_fatal() {
    let mut fixture = Fixture::standard();
    fixture.orders[0].employee_id = Some(100);

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let mut runner = DemoRunner::new(RunConfig::default()).with_loader(SchemaLoader::new(fixture));
    let report = runner.run(&mut engine);

    assert!(report.fatal.as_deref().unwrap().contains("Integrity violation"));
    assert!(report.scenarios.is_empty());
    assert_eq!(report.exit_code(), 2);
    assert_eq!(
        runner.history(),
        &[RunState::NotStarted, RunState::Completed]
    );
}

/// A write hidden behind a WITH clause errors and leaves later scenarios intact
#[timeout(10000)]
#[test]
fn test_write_behind_with_clause_does_not_reach_later_scenarios() {
    let registry = ScenarioRegistry::from_scenarios(vec![
        adhoc(
            "HiddenDelete",
            "WITH x AS (SELECT 1) DELETE FROM order_items RETURNING id",
            Vec::new(),
        ),
        adhoc(
            "CountItems",
            "SELECT COUNT(*) FROM order_items",
            vec![vec![Value::Integer(7)]],
        ),
    ]);

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let mut runner = DemoRunner::new(RunConfig::default()).with_registry(registry);
    let report = runner.run(&mut engine);

    match &report.scenarios[0].status {
        ScenarioStatus::Errored { error } => assert!(error.contains("read-only")),
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(report.scenarios[1].status, ScenarioStatus::Passed);
    assert!(report.dataset_unchanged());
    assert_eq!(report.exit_code(), 1);
}

/// A failing or erroring scenario does not stop the ones after it
#[timeout(10000)]
#[test]
fn test_failures_are_scoped_to_their_scenario() {
    let registry = ScenarioRegistry::from_scenarios(vec![
        adhoc(
            "WrongExpectation",
            "SELECT name FROM employees WHERE department = 'Soporte'",
            vec![vec![Value::Text("Somebody Else".into())]],
        ),
        adhoc("MissingTable", "SELECT * FROM staff", Vec::new()),
        adhoc(
            "CountEmployees",
            "SELECT COUNT(*) FROM employees",
            vec![vec![Value::Integer(5)]],
        ),
    ]);

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let mut runner = DemoRunner::new(RunConfig::default()).with_registry(registry);
    let report = runner.run(&mut engine);

    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.errored, 1);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.exit_code(), 1);

    match &report.scenarios[0].status {
        ScenarioStatus::Failed(failure) => {
            assert_eq!(failure.missing, vec![vec![Value::Text("Somebody Else".into())]]);
            assert_eq!(failure.extra, vec![vec![Value::Text("Eduardo Soporte".into())]]);
        }
        other => panic!("unexpected status {other:?}"),
    }
    match &report.scenarios[1].status {
        ScenarioStatus::Errored { error } => {
            assert!(error.contains("MissingTable"));
            assert!(error.contains("no such table"));
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(report.scenarios[2].status, ScenarioStatus::Passed);
}

/// A query over its own timeout errors; the run carries on
#[timeout(10000)]
#[test]
fn test_query_timeout() {
    let registry = ScenarioRegistry::from_scenarios(vec![
        adhoc("Endless", ENDLESS_QUERY, Vec::new()),
        adhoc(
            "CountEmployees",
            "SELECT COUNT(*) FROM employees",
            vec![vec![Value::Integer(5)]],
        ),
    ]);
    let config = RunConfig {
        query_timeout_ms: 100,
        run_timeout_ms: 0,
        ..Default::default()
    };

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let report = DemoRunner::new(config)
        .with_registry(registry)
        .run(&mut engine);

    match &report.scenarios[0].status {
        ScenarioStatus::Errored { error } => assert!(error.contains("interrupted")),
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(report.scenarios[1].status, ScenarioStatus::Passed);
}

/// Exhausting the run timeout skips every remaining scenario
#[timeout(10000)]
#[test]
fn test_run_timeout_skips_remaining() {
    let registry = ScenarioRegistry::from_scenarios(vec![
        adhoc("Endless", ENDLESS_QUERY, Vec::new()),
        adhoc("Second", "SELECT 1", vec![vec![Value::Integer(1)]]),
        adhoc("Third", "SELECT 2", vec![vec![Value::Integer(2)]]),
    ]);
    let config = RunConfig {
        query_timeout_ms: 60_000,
        run_timeout_ms: 200,
        ..Default::default()
    };

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let mut runner = DemoRunner::new(config).with_registry(registry);
    let report = runner.run(&mut engine);

    match &report.scenarios[0].status {
        ScenarioStatus::Errored { error } => assert!(error.contains("timeout of 200 ms")),
        other => panic!("unexpected status {other:?}"),
    }
    assert_eq!(report.summary.skipped, 2);
    assert!(report.scenarios[1..]
        .iter()
        .all(|s| matches!(s.status, ScenarioStatus::Skipped { .. })));
    assert_eq!(report.exit_code(), 1);
    assert_eq!(runner.state(), &RunState::Completed);
}

/// Selected subset runs in registry order
#[timeout(10000)]
#[test]
fn test_selected_scenarios() {
    let registry = ScenarioRegistry::standard()
        .select(&["DepartmentsAboveAverageCTE", "ScalarAboveAverageSalary"])
        .unwrap();
    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let report = DemoRunner::new(RunConfig::default())
        .with_registry(registry)
        .run(&mut engine);

    let names: Vec<&str> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["ScalarAboveAverageSalary", "DepartmentsAboveAverageCTE"]);
    assert_eq!(report.exit_code(), 0);
}

/// execute() opens the configured database and the report lands on disk
#[timeout(10000)]
#[test]
fn test_execute_with_file_database_and_report() {
    let dir = tempdir().unwrap();
    let config = RunConfig {
        database: Some(dir.path().join("demo.db")),
        ..Default::default()
    };

    let report = DemoRunner::new(config).execute();
    assert_eq!(report.exit_code(), 0);

    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["summary"]["passed"], 6);
    assert_eq!(json["scenarios"][4]["name"], "DepartmentsAboveAverage");
    assert_eq!(json["scenarios"][4]["pattern"], "derived_table");
}

/// An unopenable database is a fatal connection error
#[timeout(5000)]
#[test]
fn test_execute_unopenable_database() {
    let dir = tempdir().unwrap();
    let config = RunConfig {
        database: Some(dir.path().join("missing").join("demo.db")),
        ..Default::default()
    };

    let mut runner = DemoRunner::new(config);
    let report = runner.execute();
    assert_eq!(report.exit_code(), 2);
    assert!(report.fatal.unwrap().contains("connection"));
    assert_eq!(runner.state(), &RunState::Completed);
}
