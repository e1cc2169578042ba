//! Tutorial dataset: record types, the standard seed and its loader.

mod loader;
mod schema;

use std::collections::HashSet;

use crate::engine::Value;
use crate::error::TutorError;

pub use loader::{dataset_checksum, row_counts, LoadSummary, SchemaLoader};
pub use schema::{TableDef, TABLES};

/// Staff member; orders reference employees by id.
#[derive(Debug, Clone, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub salary: f64,
    pub department: String,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
}

/// Sales order. `employee_id` is None for orders placed without a salesperson.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub employee_id: Option<i64>,
    pub total: f64,
    /// ISO-8601 date (YYYY-MM-DD)
    pub order_date: String,
}

/// Order line item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// A row that can be inserted into one of the fixture tables.
pub trait SeedRow {
    /// Target table name
    const TABLE: &'static str;

    /// Primary key
    fn id(&self) -> i64;

    /// Column values in table column order.
    fn values(&self) -> Vec<Value>;
}

impl SeedRow for Employee {
    const TABLE: &'static str = "employees";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.salary.into(),
            self.department.as_str().into(),
        ]
    }
}

impl SeedRow for Product {
    const TABLE: &'static str = "products";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.name.as_str().into(),
            self.category.as_str().into(),
            self.price.into(),
        ]
    }
}

impl SeedRow for Order {
    const TABLE: &'static str = "orders";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.employee_id.into(),
            self.total.into(),
            self.order_date.as_str().into(),
        ]
    }
}

impl SeedRow for OrderItem {
    const TABLE: &'static str = "order_items";

    fn id(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.order_id.into(),
            self.product_id.into(),
            self.quantity.into(),
        ]
    }
}

/// Complete dataset loaded before any scenario runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fixture {
    pub employees: Vec<Employee>,
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
}

impl Fixture {
    /// The seed data every scenario's expected rows are derived from.
    pub fn standard() -> Self {
        let employee = |id, name: &str, salary, department: &str| Employee {
            id,
            name: name.to_string(),
            salary,
            department: department.to_string(),
        };
        let product = |id, name: &str, category: &str, price| Product {
            id,
            name: name.to_string(),
            category: category.to_string(),
            price,
        };
        let order = |id, employee_id, total, order_date: &str| Order {
            id,
            employee_id,
            total,
            order_date: order_date.to_string(),
        };
        let item = |id, order_id, product_id, quantity| OrderItem {
            id,
            order_id,
            product_id,
            quantity,
        };

        Self {
            employees: vec![
                employee(1, "Ana Gerente", 8000.00, "Ventas"),
                employee(2, "Carlos Vendedor", 3500.00, "Ventas"),
                employee(3, "Diana Analista", 2000.00, "Marketing"),
                employee(4, "Eduardo Soporte", 1700.00, "Soporte"),
                employee(5, "Fernando Nuevo", 2700.00, "Ventas"),
            ],
            products: vec![
                product(1, "Laptop", "Electrónica", 1200.00),
                product(2, "Mouse", "Electrónica", 25.00),
                product(3, "Silla Ergonómica", "Muebles", 250.00),
                product(4, "Escritorio", "Muebles", 150.00),
                product(5, "Monitor", "Electrónica", 300.00),
            ],
            orders: vec![
                order(1, Some(1), 1225.00, "2024-01-15"),
                order(2, Some(2), 400.00, "2024-01-20"),
                order(3, Some(2), 300.00, "2024-02-03"),
                order(4, Some(3), 75.00, "2024-02-10"),
                // web sale, no salesperson
                order(5, None, 500.00, "2024-03-01"),
            ],
            order_items: vec![
                item(1, 1, 1, 1),
                item(2, 1, 2, 1),
                item(3, 2, 3, 1),
                item(4, 2, 4, 1),
                item(5, 3, 5, 1),
                item(6, 4, 2, 3),
                item(7, 5, 3, 2),
            ],
        }
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.employees.len() + self.products.len() + self.orders.len() + self.order_items.len()
    }

    /// Checks keys, references and value domains before anything is written.
    ///
    /// # Returns
    /// `Result<(), TutorError>` with `TutorError::Integrity` naming the first
    /// offending table and row.
    pub fn validate(&self) -> Result<(), TutorError> {
        let employee_ids = unique_ids(&self.employees)?;
        let product_ids = unique_ids(&self.products)?;
        let order_ids = unique_ids(&self.orders)?;
        unique_ids(&self.order_items)?;

        for e in &self.employees {
            if e.salary < 0.0 || !e.salary.is_finite() {
                return Err(integrity::<Employee>(format!(
                    "employee {} has invalid salary {}",
                    e.id, e.salary
                )));
            }
            if e.department.trim().is_empty() {
                return Err(integrity::<Employee>(format!(
                    "employee {} has an empty department",
                    e.id
                )));
            }
        }

        for p in &self.products {
            if p.price < 0.0 || !p.price.is_finite() {
                return Err(integrity::<Product>(format!(
                    "product {} has invalid price {}",
                    p.id, p.price
                )));
            }
        }

        for o in &self.orders {
            if let Some(employee_id) = o.employee_id {
                if !employee_ids.contains(&employee_id) {
                    return Err(integrity::<Order>(format!(
                        "order {} references nonexistent employee {}",
                        o.id, employee_id
                    )));
                }
            }
            if o.total < 0.0 || !o.total.is_finite() {
                return Err(integrity::<Order>(format!(
                    "order {} has invalid total {}",
                    o.id, o.total
                )));
            }
        }

        for item in &self.order_items {
            if !order_ids.contains(&item.order_id) {
                return Err(integrity::<OrderItem>(format!(
                    "item {} references nonexistent order {}",
                    item.id, item.order_id
                )));
            }
            if !product_ids.contains(&item.product_id) {
                return Err(integrity::<OrderItem>(format!(
                    "item {} references nonexistent product {}",
                    item.id, item.product_id
                )));
            }
            if item.quantity <= 0 {
                return Err(integrity::<OrderItem>(format!(
                    "item {} has non-positive quantity {}",
                    item.id, item.quantity
                )));
            }
        }

        Ok(())
    }
}

fn unique_ids<R: SeedRow>(rows: &[R]) -> Result<HashSet<i64>, TutorError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.id()) {
            return Err(integrity::<R>(format!("duplicate id {}", row.id())));
        }
    }
    Ok(seen)
}

fn integrity<R: SeedRow>(detail: String) -> TutorError {
    TutorError::Integrity {
        table: R::TABLE.to_string(),
        detail,
    }
}
