//! Dataset lifecycle: create, populate, fingerprint and drop.

use crate::engine::{EngineError, EngineErrorKind, QueryInterface};
use crate::error::TutorError;

use super::schema::{self, TABLES};
use super::{Fixture, SeedRow};

/// Rows written by a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub tables: usize,
    pub rows: usize,
}

/// Owns the dataset lifecycle on a connection.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    fixture: Fixture,
}

impl SchemaLoader {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    /// Loader for the standard seed data.
    pub fn standard() -> Self {
        Self::new(Fixture::standard())
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    /// Drops, recreates and populates every fixture table.
    ///
    /// Runs inside a single transaction: on failure nothing is committed
    /// and any previously loaded dataset is left as it was.
    ///
    /// # Returns
    /// `Result<LoadSummary, TutorError>`; `Schema` when DDL is rejected,
    /// `Integrity` when a row breaks a reference or constraint.
    pub fn load(&self, conn: &mut dyn QueryInterface) -> Result<LoadSummary, TutorError> {
        self.fixture.validate()?;

        conn.begin()?;
        match self.populate(conn) {
            Ok(summary) => {
                conn.commit()?;
                tracing::info!(
                    "Loaded fixture: {} tables, {} rows",
                    summary.tables,
                    summary.rows
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!("Fixture load failed, rolling back: {}", e);
                if let Err(rollback) = conn.rollback() {
                    tracing::error!("Rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    /// Drops every fixture table, children first.
    pub fn teardown(&self, conn: &mut dyn QueryInterface) -> Result<(), TutorError> {
        drop_tables(conn)?;
        tracing::info!("Dropped {} fixture tables", TABLES.len());
        Ok(())
    }

    fn populate(&self, conn: &mut dyn QueryInterface) -> Result<LoadSummary, TutorError> {
        drop_tables(conn)?;

        for table in TABLES {
            tracing::debug!("Creating table {}", table.name);
            conn.execute_batch(table.ddl)
                .map_err(|source| TutorError::Schema {
                    table: table.name.to_string(),
                    source,
                })?;
        }

        let rows = insert_rows(conn, &self.fixture.employees)?
            + insert_rows(conn, &self.fixture.products)?
            + insert_rows(conn, &self.fixture.orders)?
            + insert_rows(conn, &self.fixture.order_items)?;

        Ok(LoadSummary {
            tables: TABLES.len(),
            rows,
        })
    }
}

fn drop_tables(conn: &mut dyn QueryInterface) -> Result<(), TutorError> {
    for table in TABLES.iter().rev() {
        conn.execute_batch(&table.drop_sql())
            .map_err(|source| TutorError::Schema {
                table: table.name.to_string(),
                source,
            })?;
    }
    Ok(())
}

fn insert_rows<R: SeedRow>(conn: &mut dyn QueryInterface, rows: &[R]) -> Result<usize, TutorError> {
    let table = schema::table(R::TABLE).ok_or_else(|| TutorError::Integrity {
        table: R::TABLE.to_string(),
        detail: "no table definition".to_string(),
    })?;
    let sql = table.insert_sql();

    for row in rows {
        conn.execute(&sql, &row.values())
            .map_err(|e| insert_error(R::TABLE, row.id(), e))?;
    }
    tracing::debug!("Inserted {} rows into {}", rows.len(), R::TABLE);
    Ok(rows.len())
}

fn insert_error(table: &str, id: i64, err: EngineError) -> TutorError {
    match err.kind {
        EngineErrorKind::Constraint => TutorError::Integrity {
            table: table.to_string(),
            detail: format!("row {}: {}", id, err.message),
        },
        _ => TutorError::Engine(err),
    }
}

/// CRC32 over every fixture table's contents in primary key order.
///
/// Identical datasets produce identical checksums regardless of how many
/// times they were loaded.
pub fn dataset_checksum(conn: &dyn QueryInterface) -> Result<u32, TutorError> {
    let mut hasher = crc32fast::Hasher::new();
    for table in TABLES {
        let rs = conn.query(
            &format!("SELECT {} FROM {} ORDER BY id", table.columns.join(", "), table.name),
            None,
        )?;
        hasher.update(table.name.as_bytes());
        hasher.update(&(rs.len() as u64).to_le_bytes());
        for row in &rs.rows {
            for value in row {
                value.hash_into(&mut hasher);
            }
        }
    }
    Ok(hasher.finalize())
}

/// Row count per fixture table, in dependency order.
pub fn row_counts(conn: &dyn QueryInterface) -> Result<Vec<(&'static str, usize)>, TutorError> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let rs = conn.query(&format!("SELECT COUNT(*) FROM {}", table.name), None)?;
        let count = rs
            .rows
            .first()
            .and_then(|row| row.first())
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as usize;
        counts.push((table.name, count));
    }
    Ok(counts)
}
