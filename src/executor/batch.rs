use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, warn};

use super::{check, CaseFailure, Executor, Stage};
use crate::case::SqlCase;
use crate::engine::{SqlEngine, DEFAULT_DB};

const GENERATED_NAME_LEN: usize = 8;

/// Runs a case against the engine: prepare inputs, query, check, tear down.
pub struct EngineExecutor<'a> {
    engine: &'a dyn SqlEngine,
    case: &'a SqlCase,
    db: String,
    table_prefix: String,
    created: Vec<String>,
}

impl<'a> EngineExecutor<'a> {
    pub fn new(engine: &'a dyn SqlEngine, case: &'a SqlCase, table_prefix: &str) -> Self {
        Self {
            engine,
            case,
            db: case.db.clone().unwrap_or_else(|| DEFAULT_DB.to_string()),
            table_prefix: table_prefix.to_string(),
            created: Vec::new(),
        }
    }

    fn table_name(&self, declared: Option<&str>) -> String {
        match declared {
            Some(name) => name.to_string(),
            None => {
                let suffix: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(GENERATED_NAME_LEN)
                    .map(|b| char::from(b).to_ascii_lowercase())
                    .collect();
                format!("{}{}", self.table_prefix, suffix)
            }
        }
    }

    /// Creates and fills every input table, returning names in input order.
    fn prepare(&mut self) -> Result<Vec<String>, CaseFailure> {
        let case = self.case;
        let mut names = Vec::with_capacity(case.inputs.len());
        for input in &case.inputs {
            let name = self.table_name(input.name.as_deref());
            let table = input
                .table_def(name.clone())
                .map_err(|e| CaseFailure::Definition(e.to_string()))?;
            self.engine
                .create_table(&self.db, &table)
                .map_err(|source| CaseFailure::Engine {
                    stage: Stage::Prepare,
                    source,
                })?;
            self.created.push(name.clone());
            if !input.rows.is_empty() {
                let written = self
                    .engine
                    .insert(&self.db, &name, &input.rows)
                    .map_err(|source| CaseFailure::Engine {
                        stage: Stage::Prepare,
                        source,
                    })?;
                debug!(table = %name, rows = written, "input table ready");
            }
            names.push(name);
        }
        Ok(names)
    }

    fn execute_and_check(&mut self) -> Result<(), CaseFailure> {
        let tables = self.prepare()?;
        let sql = self.case.render_sql(&tables);
        debug!(db = %self.db, sql = %sql, "executing");
        let outcome = self.engine.query(&self.db, &sql);
        check::verify(&self.case.expect, outcome)
    }

    /// Drops every table this executor created, reporting the first failure.
    fn tear_down(&mut self) -> Result<(), CaseFailure> {
        let mut first_err = None;
        for table in self.created.drain(..) {
            if let Err(source) = self.engine.drop_table(&self.db, &table) {
                warn!(table = %table, error = %source, "failed to drop input table");
                first_err.get_or_insert(CaseFailure::Engine {
                    stage: Stage::TearDown,
                    source,
                });
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Executor for EngineExecutor<'_> {
    fn run(&mut self) -> Result<(), CaseFailure> {
        let result = self.execute_and_check();
        let teardown = self.tear_down();
        result.and(teardown)
    }
}
