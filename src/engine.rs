//! The seam between the harness and the SQL engine under test.
//!
//! The harness never executes SQL itself. A [`SqlEngine`] is the shared
//! execution context every case borrows; implementations live with the
//! engine being tested (or in test code).

use thiserror::Error;

use crate::case::{ColumnDef, Datum, TableDef};

/// Database used when neither the case nor its fixture names one.
pub const DEFAULT_DB: &str = "test_db";

/// An error reported by the engine. The harness treats it as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Columns and rows returned by a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Datum>>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Vec<Datum>>) -> Self {
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Handle to the system under test.
///
/// All methods take `&self`: the engine is shared by every case of a run and
/// is responsible for its own interior state.
pub trait SqlEngine {
    fn create_table(&self, db: &str, table: &TableDef) -> Result<(), EngineError>;

    /// Inserts rows into an existing table, returning how many were written.
    fn insert(&self, db: &str, table: &str, rows: &[Vec<Datum>]) -> Result<usize, EngineError>;

    fn query(&self, db: &str, sql: &str) -> Result<ResultSet, EngineError>;

    fn drop_table(&self, db: &str, table: &str) -> Result<(), EngineError>;
}

impl<T: SqlEngine + ?Sized> SqlEngine for &T {
    fn create_table(&self, db: &str, table: &TableDef) -> Result<(), EngineError> {
        (**self).create_table(db, table)
    }

    fn insert(&self, db: &str, table: &str, rows: &[Vec<Datum>]) -> Result<usize, EngineError> {
        (**self).insert(db, table, rows)
    }

    fn query(&self, db: &str, sql: &str) -> Result<ResultSet, EngineError> {
        (**self).query(db, sql)
    }

    fn drop_table(&self, db: &str, table: &str) -> Result<(), EngineError> {
        (**self).drop_table(db, table)
    }
}

impl<T: SqlEngine + ?Sized> SqlEngine for std::sync::Arc<T> {
    fn create_table(&self, db: &str, table: &TableDef) -> Result<(), EngineError> {
        (**self).create_table(db, table)
    }

    fn insert(&self, db: &str, table: &str, rows: &[Vec<Datum>]) -> Result<usize, EngineError> {
        (**self).insert(db, table, rows)
    }

    fn query(&self, db: &str, sql: &str) -> Result<ResultSet, EngineError> {
        (**self).query(db, sql)
    }

    fn drop_table(&self, db: &str, table: &str) -> Result<(), EngineError> {
        (**self).drop_table(db, table)
    }
}
