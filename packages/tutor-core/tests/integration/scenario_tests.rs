//! Scenario results against the standard fixture.

use ntest::timeout;

use tutor_core::fixture::dataset_checksum;
use tutor_core::scenario::{self, ScenarioRegistry};
use tutor_core::verify::verify;
use tutor_core::Value;

use super::helpers::loaded_engine;

/// Every registered scenario returns its expected rows
#[timeout(5000)]
#[test]
fn test_all_scenarios_match_expectations() {
    let engine = loaded_engine();
    let registry = ScenarioRegistry::standard();
    assert_eq!(registry.len(), 6);

    for s in &registry {
        let rows = scenario::run(&engine, s, None).unwrap();
        assert_eq!(rows.columns, s.columns, "{}", s.name);
        if let Err(failure) = verify(&rows.rows, &s.expected, s.order, 1e-6) {
            panic!("{} failed:\n{}", s.name, failure.describe());
        }
    }
}

#[timeout(5000)]
#[test]
fn test_scalar_above_average_salary() {
    let engine = loaded_engine();
    let registry = ScenarioRegistry::standard();
    let rows = scenario::run(
        &engine,
        registry.get("ScalarAboveAverageSalary").unwrap(),
        None,
    )
    .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows.rows[0][0], Value::Text("Ana Gerente".into()));
    assert!(rows.rows[0][1].approx_eq(&Value::Real(8000.00), 1e-6));
}

#[timeout(5000)]
#[test]
fn test_order_count_per_employee() {
    let engine = loaded_engine();
    let registry = ScenarioRegistry::standard();
    let rows = scenario::run(&engine, registry.get("OrderCountPerEmployee").unwrap(), None).unwrap();

    assert_eq!(rows.len(), 5);
    let mut counts: Vec<(String, i64)> = rows
        .rows
        .iter()
        .map(|r| match (&r[0], &r[1]) {
            (Value::Text(name), Value::Integer(n)) => (name.clone(), *n),
            other => panic!("unexpected row {other:?}"),
        })
        .collect();
    counts.sort();
    assert_eq!(
        counts,
        vec![
            ("Ana Gerente".to_string(), 1),
            ("Carlos Vendedor".to_string(), 2),
            ("Diana Analista".to_string(), 1),
            ("Eduardo Soporte".to_string(), 0),
            ("Fernando Nuevo".to_string(), 0),
        ]
    );
}

/// The derived-table and WITH formulations are equivalent
#[timeout(5000)]
#[test]
fn test_derived_table_and_cte_agree() {
    let engine = loaded_engine();
    let registry = ScenarioRegistry::standard();
    let derived =
        scenario::run(&engine, registry.get("DepartmentsAboveAverage").unwrap(), None).unwrap();
    let cte = scenario::run(
        &engine,
        registry.get("DepartmentsAboveAverageCTE").unwrap(),
        None,
    )
    .unwrap();

    assert_eq!(derived.columns, cte.columns);
    assert_eq!(derived.canonical_rows(), cte.canonical_rows());
    assert_eq!(derived.len(), 1);
    assert_eq!(derived.get(0, "department"), Some(&Value::Text("Ventas".into())));
}

/// Running every scenario leaves the dataset untouched
#[timeout(5000)]
#[test]
fn test_scenarios_do_not_mutate() {
    let engine = loaded_engine();
    let before = dataset_checksum(&engine).unwrap();

    for s in &ScenarioRegistry::standard() {
        scenario::run(&engine, s, None).unwrap();
    }

    assert_eq!(dataset_checksum(&engine).unwrap(), before);
}
