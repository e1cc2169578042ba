//! Table definitions for the tutorial dataset.

/// One fixture table.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    /// Table name
    pub name: &'static str,
    /// Column names in insertion order
    pub columns: &'static [&'static str],
    /// CREATE TABLE statement
    pub ddl: &'static str,
}

impl TableDef {
    /// Parameterized INSERT covering every column.
    pub fn insert_sql(&self) -> String {
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            self.columns.join(", "),
            placeholders.join(", ")
        )
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }
}

/// Tables in dependency order: parents before children.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "employees",
        columns: &["id", "name", "salary", "department"],
        ddl: "CREATE TABLE employees (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            salary DECIMAL(10, 2) NOT NULL CHECK (salary >= 0),
            department TEXT NOT NULL CHECK (department <> '')
        )",
    },
    TableDef {
        name: "products",
        columns: &["id", "name", "category", "price"],
        ddl: "CREATE TABLE products (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            price DECIMAL(10, 2) NOT NULL CHECK (price >= 0)
        )",
    },
    TableDef {
        name: "orders",
        columns: &["id", "employee_id", "total", "order_date"],
        ddl: "CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            employee_id INTEGER REFERENCES employees(id),
            total DECIMAL(10, 2) NOT NULL CHECK (total >= 0),
            order_date DATE NOT NULL
        )",
    },
    TableDef {
        name: "order_items",
        columns: &["id", "order_id", "product_id", "quantity"],
        ddl: "CREATE TABLE order_items (
            id INTEGER PRIMARY KEY,
            order_id INTEGER NOT NULL REFERENCES orders(id),
            product_id INTEGER NOT NULL REFERENCES products(id),
            quantity INTEGER NOT NULL CHECK (quantity > 0)
        )",
    },
];

/// Looks up a table definition by name.
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}
