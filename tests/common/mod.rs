//! Shared test support: an in-memory engine that understands plain
//! projections, and wrappers that record what the harness asked for.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;
use sqlcase::case::{ColumnDef, TableDef};
use sqlcase::{
    CaseLoader, Datum, EngineError, EngineExecutorFactory, Executor, ExecutorFactory,
    FixtureLoader, HarnessError, ResultSet, SqlCase, SqlEngine,
};

static SELECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*select\s+(.+?)\s+from\s+([A-Za-z_][A-Za-z0-9_]*)\s*;?\s*$").unwrap()
});

pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

struct Table {
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<Datum>>,
}

#[derive(Default)]
struct State {
    tables: HashMap<(String, String), Table>,
    created: Vec<String>,
    queries: Vec<String>,
}

/// Answers `select <columns|*> from <table>` and nothing else.
#[derive(Default)]
pub struct MemoryEngine {
    state: Mutex<State>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn live_tables(&self) -> usize {
        self.state.lock().unwrap().tables.len()
    }
}

impl SqlEngine for MemoryEngine {
    fn create_table(&self, db: &str, table: &TableDef) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        let key = (db.to_string(), table.name.clone());
        if state.tables.contains_key(&key) {
            return Err(EngineError::new(format!("table {} already exists", table.name)));
        }
        state.tables.insert(
            key,
            Table {
                columns: table.columns.clone(),
                rows: Vec::new(),
            },
        );
        state.created.push(table.name.clone());
        Ok(())
    }

    fn insert(&self, db: &str, table: &str, rows: &[Vec<Datum>]) -> Result<usize, EngineError> {
        let mut state = self.state.lock().unwrap();
        let target = state
            .tables
            .get_mut(&(db.to_string(), table.to_string()))
            .ok_or_else(|| EngineError::new(format!("no such table {}", table)))?;
        if let Some(bad) = rows.iter().find(|r| r.len() != target.columns.len()) {
            return Err(EngineError::new(format!("row width {} does not fit", bad.len())));
        }
        target.rows.extend_from_slice(rows);
        Ok(rows.len())
    }

    fn query(&self, db: &str, sql: &str) -> Result<ResultSet, EngineError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(sql.to_string());
        let caps = SELECT
            .captures(sql)
            .ok_or_else(|| EngineError::new(format!("unsupported statement: {}", sql)))?;
        let table = state
            .tables
            .get(&(db.to_string(), caps[2].to_string()))
            .ok_or_else(|| EngineError::new(format!("no such table {}", &caps[2])))?;

        let projection: Vec<usize> = if caps[1].trim() == "*" {
            (0..table.columns.len()).collect()
        } else {
            caps[1]
                .split(',')
                .map(str::trim)
                .map(|name| {
                    table
                        .columns
                        .iter()
                        .position(|c| c.name == name)
                        .ok_or_else(|| EngineError::new(format!("unknown column {}", name)))
                })
                .collect::<Result<_, _>>()?
        };

        Ok(ResultSet::new(
            projection.iter().map(|&i| table.columns[i].clone()).collect(),
            table
                .rows
                .iter()
                .map(|row| projection.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        ))
    }

    fn drop_table(&self, db: &str, table: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state
            .tables
            .remove(&(db.to_string(), table.to_string()))
            .map(|_| ())
            .ok_or_else(|| EngineError::new(format!("no such table {}", table)))
    }
}

/// Wraps the stock factory and records every build: case name and the
/// address of the context it was bound to.
#[derive(Default)]
pub struct CountingFactory {
    inner: EngineExecutorFactory,
    builds: RefCell<Vec<(String, usize)>>,
}

impl CountingFactory {
    pub fn builds(&self) -> Vec<(String, usize)> {
        self.builds.borrow().clone()
    }
}

impl ExecutorFactory for CountingFactory {
    fn build<'a>(&self, ctx: &'a dyn SqlEngine, case: &'a SqlCase) -> Box<dyn Executor + 'a> {
        let addr = std::ptr::from_ref(ctx).cast::<()>() as usize;
        self.builds.borrow_mut().push((case.name(), addr));
        self.inner.build(ctx, case)
    }
}

/// A fixture loader that remembers which paths were requested.
pub struct RecordingLoader {
    inner: FixtureLoader,
    requested: RefCell<Vec<String>>,
}

impl RecordingLoader {
    pub fn new(inner: FixtureLoader) -> Self {
        Self {
            inner,
            requested: RefCell::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl CaseLoader for RecordingLoader {
    fn load(&self, path: &str) -> Result<Vec<SqlCase>, HarnessError> {
        self.requested.borrow_mut().push(path.to_string());
        self.inner.load(path)
    }
}

pub fn address_of<T>(value: &T) -> usize {
    value as *const T as usize
}
