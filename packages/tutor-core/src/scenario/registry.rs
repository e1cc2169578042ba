//! The six tutorial scenarios and their expected rows.

use crate::engine::{Row, Value};
use crate::error::TutorError;

use super::{RowOrder, Scenario, SubqueryPattern};

/// Ordered, read-only collection of scenarios.
#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    scenarios: Vec<Scenario>,
}

fn row<const N: usize>(values: [Value; N]) -> Row {
    values.into()
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

impl ScenarioRegistry {
    /// Scenarios whose expected rows match [`crate::fixture::Fixture::standard`].
    pub fn standard() -> Self {
        let ventas_average = row([text("Ventas"), Value::Real(4733.33)]);

        let scenarios = vec![
            Scenario {
                name: "ScalarAboveAverageSalary",
                pattern: SubqueryPattern::Scalar,
                description: "Employees earning more than the company-wide average salary",
                query: "SELECT name, salary
    FROM employees
    WHERE salary > (SELECT AVG(salary) FROM employees)",
                columns: &["name", "salary"],
                expected: vec![row([text("Ana Gerente"), Value::Real(8000.00)])],
                order: RowOrder::Unordered,
            },
            Scenario {
                name: "SameCategoryExcludingSelf",
                pattern: SubqueryPattern::List,
                description: "Products in the same category as 'Silla Ergonómica', excluding it",
                query: "SELECT name, price
    FROM products
    WHERE category IN (SELECT category FROM products WHERE name = 'Silla Ergonómica')
      AND name <> 'Silla Ergonómica'",
                columns: &["name", "price"],
                expected: vec![row([text("Escritorio"), Value::Real(150.00)])],
                order: RowOrder::Unordered,
            },
            Scenario {
                name: "OrderCountPerEmployee",
                pattern: SubqueryPattern::CorrelatedSelect,
                description: "Number of orders handled by each employee",
                query: "SELECT e.name,
           (SELECT COUNT(*) FROM orders o WHERE o.employee_id = e.id) AS order_count
    FROM employees e",
                columns: &["name", "order_count"],
                expected: vec![
                    row([text("Ana Gerente"), Value::Integer(1)]),
                    row([text("Carlos Vendedor"), Value::Integer(2)]),
                    row([text("Diana Analista"), Value::Integer(1)]),
                    row([text("Eduardo Soporte"), Value::Integer(0)]),
                    row([text("Fernando Nuevo"), Value::Integer(0)]),
                ],
                order: RowOrder::Unordered,
            },
            Scenario {
                name: "SalesStaffWithNoOrders",
                pattern: SubqueryPattern::CorrelatedNotExists,
                description: "Sales department employees who have not placed any order",
                query: "SELECT e.name
    FROM employees e
    WHERE e.department = 'Ventas'
      AND NOT EXISTS (SELECT 1 FROM orders o WHERE o.employee_id = e.id)",
                columns: &["name"],
                expected: vec![row([text("Fernando Nuevo")])],
                order: RowOrder::Unordered,
            },
            Scenario {
                name: "DepartmentsAboveAverage",
                pattern: SubqueryPattern::DerivedTable,
                description: "Departments whose average salary exceeds 3000, via a derived table",
                query: "SELECT department, avg_salary
    FROM (SELECT department, ROUND(AVG(salary), 2) AS avg_salary
          FROM employees
          GROUP BY department) AS dept_avg
    WHERE avg_salary > 3000",
                columns: &["department", "avg_salary"],
                expected: vec![ventas_average.clone()],
                order: RowOrder::Unordered,
            },
            Scenario {
                name: "DepartmentsAboveAverageCTE",
                pattern: SubqueryPattern::CommonTableExpression,
                description: "Departments whose average salary exceeds 3000, via a WITH clause",
                query: "WITH dept_avg AS (
        SELECT department, ROUND(AVG(salary), 2) AS avg_salary
        FROM employees
        GROUP BY department
    )
    SELECT department, avg_salary
    FROM dept_avg
    WHERE avg_salary > 3000",
                columns: &["department", "avg_salary"],
                expected: vec![ventas_average],
                order: RowOrder::Unordered,
            },
        ];

        Self { scenarios }
    }

    /// Registry over caller-supplied scenarios, kept in the given order.
    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenarios in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Scenario> {
        self.scenarios.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.scenarios.iter().map(|s| s.name).collect()
    }

    /// Subset of the registry, kept in registry order.
    ///
    /// # Returns
    /// `TutorError::UnknownScenario` for the first name not registered.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self, TutorError> {
        if let Some(unknown) = names.iter().find(|n| self.get(n.as_ref()).is_none()) {
            return Err(TutorError::UnknownScenario(unknown.as_ref().to_string()));
        }
        let scenarios = self
            .scenarios
            .iter()
            .filter(|s| names.iter().any(|n| n.as_ref() == s.name))
            .cloned()
            .collect();
        Ok(Self { scenarios })
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a ScenarioRegistry {
    type Item = &'a Scenario;
    type IntoIter = std::slice::Iter<'a, Scenario>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
