//! sqlcase: load YAML SQL case fixtures and dispatch them against an engine.
//!
//! ```rust,no_run
//! use sqlcase::{Dispatcher, FixtureLoader, HarnessConfig, Suite};
//! # fn engine() -> Box<dyn sqlcase::SqlEngine> { unimplemented!() }
//!
//! let config = HarnessConfig::default();
//! let engine = engine();
//! let loader = FixtureLoader::new(&config.case_root);
//! let dispatcher = Dispatcher::from_config(engine.as_ref(), &config);
//! let report = Suite::select().run(&loader, &dispatcher);
//! sqlcase::report::print_report(&report, &config).unwrap();
//! if report.summary().has_failures() {
//!     std::process::exit(1);
//! }
//! ```

pub use crate::case::{Datum, SqlCase};
pub use crate::config::HarnessConfig;
pub use crate::diagnostics::{ErrorType, HarnessError};
pub use crate::dispatch::{Dispatcher, TestResult};
pub use crate::engine::{EngineError, ResultSet, SqlEngine};
pub use crate::executor::{CaseFailure, EngineExecutorFactory, Executor, ExecutorFactory};
pub use crate::loader::{CaseLoader, FixtureLoader};
pub use crate::suite::{FixtureGroup, Suite, SuiteReport};

pub mod case;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod engine;
pub mod executor;
pub mod loader;
pub mod logging;
pub mod report;
pub mod suite;
