//! Runs loaded cases, one executor per case, and records the outcome of each.

use tracing::{debug, info_span, warn};

use crate::case::SqlCase;
use crate::config::HarnessConfig;
use crate::engine::SqlEngine;
use crate::executor::{EngineExecutorFactory, ExecutorFactory};

/// Outcome of a single case.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Pass {
        group: String,
        name: String,
    },
    Fail {
        group: String,
        name: String,
        error: String,
        /// Expected and actual renderings when the failure is a mismatch.
        diff: Option<(String, String)>,
    },
    Skipped {
        group: String,
        name: String,
        reason: String,
    },
}

impl TestResult {
    pub fn name(&self) -> &str {
        match self {
            TestResult::Pass { name, .. }
            | TestResult::Fail { name, .. }
            | TestResult::Skipped { name, .. } => name,
        }
    }

    pub fn group(&self) -> &str {
        match self {
            TestResult::Pass { group, .. }
            | TestResult::Fail { group, .. }
            | TestResult::Skipped { group, .. } => group,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestResult::Skipped { .. })
    }
}

/// Why a case should not run, if it should not.
pub fn skip_reason(case_name: &str, filter: Option<&str>) -> Option<String> {
    let filter = filter?;
    if case_name.to_lowercase().contains(&filter.to_lowercase()) {
        return None;
    }
    Some(format!("Filtered out by substring: {}", filter))
}

/// Binds cases to the shared engine through an executor factory.
pub struct Dispatcher<'a, F> {
    ctx: &'a dyn SqlEngine,
    factory: F,
    filter: Option<String>,
}

impl<'a> Dispatcher<'a, EngineExecutorFactory> {
    /// The stock dispatcher, using the configured table prefix and filter.
    pub fn from_config(ctx: &'a dyn SqlEngine, config: &HarnessConfig) -> Self {
        Self::new(ctx, EngineExecutorFactory::new(config.table_prefix.clone()))
            .with_filter(config.filter.clone())
    }
}

impl<'a, F: ExecutorFactory> Dispatcher<'a, F> {
    pub fn new(ctx: &'a dyn SqlEngine, factory: F) -> Self {
        Self {
            ctx,
            factory,
            filter: None,
        }
    }

    /// Only cases whose lowercased name contains `filter` will run.
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter.map(|f| f.to_lowercase());
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Runs every case in order. A failing case never stops its siblings.
    pub fn dispatch(&self, group: &str, cases: &[SqlCase]) -> Vec<TestResult> {
        cases.iter().map(|case| self.dispatch_one(group, case)).collect()
    }

    pub fn dispatch_one(&self, group: &str, case: &SqlCase) -> TestResult {
        let name = case.name();
        if let Some(reason) = skip_reason(&name, self.filter.as_deref()) {
            return TestResult::Skipped {
                group: group.to_string(),
                name,
                reason,
            };
        }

        let span = info_span!("case", group, name = %name);
        let _entered = span.enter();
        let mut executor = self.factory.build(self.ctx, case);
        match executor.run() {
            Ok(()) => {
                debug!("passed");
                TestResult::Pass {
                    group: group.to_string(),
                    name,
                }
            }
            Err(failure) => {
                warn!(error = %failure, "failed");
                TestResult::Fail {
                    group: group.to_string(),
                    name,
                    error: failure.to_string(),
                    diff: failure
                        .sides()
                        .map(|(e, a)| (e.to_string(), a.to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_a_substring_match() {
        assert_eq!(skip_reason("0_select all", None), None);
        assert_eq!(skip_reason("0_Select all", Some("select")), None);
        assert_eq!(skip_reason("0_select all", Some("SELECT")), None);
        assert_eq!(skip_reason("0_Select", Some("Select")), None);
        assert_eq!(
            skip_reason("1_count", Some("select")),
            Some("Filtered out by substring: select".to_string())
        );
    }

    #[test]
    fn config_filter_is_lowercased() {
        struct Unused;
        impl SqlEngine for Unused {
            fn create_table(
                &self,
                _db: &str,
                _table: &crate::case::TableDef,
            ) -> Result<(), crate::engine::EngineError> {
                unreachable!()
            }
            fn insert(
                &self,
                _db: &str,
                _table: &str,
                _rows: &[Vec<crate::case::Datum>],
            ) -> Result<usize, crate::engine::EngineError> {
                unreachable!()
            }
            fn query(
                &self,
                _db: &str,
                _sql: &str,
            ) -> Result<crate::engine::ResultSet, crate::engine::EngineError> {
                unreachable!()
            }
            fn drop_table(&self, _db: &str, _table: &str) -> Result<(), crate::engine::EngineError> {
                unreachable!()
            }
        }
        let config = HarnessConfig::default().with_filter(Some("Subset"));
        let dispatcher = Dispatcher::from_config(&Unused, &config);
        assert_eq!(dispatcher.filter.as_deref(), Some("subset"));
    }
}
