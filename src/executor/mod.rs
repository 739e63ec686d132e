//! Executors run one case against the shared engine.
//!
//! [`ExecutorFactory::build`] binds a case to the execution context and
//! returns something [`Executor::run`] can drive. The factory picks the
//! executor from the case's declared modes.

pub mod batch;
pub mod check;

use std::fmt;

use thiserror::Error;
use tracing::info;

pub use batch::EngineExecutor;

use crate::case::SqlCase;
use crate::engine::{EngineError, SqlEngine};

/// Mode tag marking a case the batch engine is not expected to support.
pub const BATCH_UNSUPPORTED: &str = "batch-unsupport";

/// Prefix for tables created from inputs that do not name themselves.
pub const DEFAULT_TABLE_PREFIX: &str = "auto_";

/// Where in a case's lifecycle an engine call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Execute,
    TearDown,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Prepare => "prepare",
            Stage::Execute => "execute",
            Stage::TearDown => "tear down",
        })
    }
}

/// Why a single case failed.
#[derive(Debug, Error)]
pub enum CaseFailure {
    #[error("invalid case definition: {0}")]
    Definition(String),

    #[error("engine error during {stage}: {source}")]
    Engine {
        stage: Stage,
        #[source]
        source: EngineError,
    },

    #[error("expected the query to fail, but it returned {rows} row(s)")]
    UnexpectedSuccess { rows: usize },

    #[error("result columns did not match expected")]
    ColumnMismatch { expected: String, actual: String },

    #[error("expected {expected} row(s), got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("result rows did not match expected (first difference at row {index})")]
    RowMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

impl CaseFailure {
    /// Expected and actual renderings, for failures that have both sides.
    pub fn sides(&self) -> Option<(&str, &str)> {
        match self {
            CaseFailure::ColumnMismatch { expected, actual }
            | CaseFailure::RowMismatch {
                expected, actual, ..
            } => Some((expected, actual)),
            _ => None,
        }
    }
}

/// A case bound to its execution context, ready to run once.
pub trait Executor {
    fn run(&mut self) -> Result<(), CaseFailure>;
}

/// Builds an executor for a case against the shared engine.
pub trait ExecutorFactory {
    fn build<'a>(&self, ctx: &'a dyn SqlEngine, case: &'a SqlCase) -> Box<dyn Executor + 'a>;
}

/// The stock factory: an [`EngineExecutor`] unless the case opts out.
#[derive(Debug, Clone)]
pub struct EngineExecutorFactory {
    table_prefix: String,
}

impl EngineExecutorFactory {
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
        }
    }
}

impl Default for EngineExecutorFactory {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_PREFIX)
    }
}

impl ExecutorFactory for EngineExecutorFactory {
    fn build<'a>(&self, ctx: &'a dyn SqlEngine, case: &'a SqlCase) -> Box<dyn Executor + 'a> {
        if case.has_mode(BATCH_UNSUPPORTED) {
            return Box::new(NullExecutor::new(case));
        }
        Box::new(EngineExecutor::new(ctx, case, &self.table_prefix))
    }
}

/// Runs nothing. Used for cases the engine is declared not to support.
pub struct NullExecutor<'a> {
    case: &'a SqlCase,
}

impl<'a> NullExecutor<'a> {
    pub fn new(case: &'a SqlCase) -> Self {
        Self { case }
    }
}

impl Executor for NullExecutor<'_> {
    fn run(&mut self) -> Result<(), CaseFailure> {
        info!(case = %self.case.name(), "case marked {}, not executed", BATCH_UNSUPPORTED);
        Ok(())
    }
}
