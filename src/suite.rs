//! Suite inventory: named fixture groups and whether each one runs.
//!
//! Disabled groups stay in the inventory so they show up in listings and
//! reports, but they are neither loaded nor executed.

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::diagnostics::HarnessError;
use crate::dispatch::{Dispatcher, TestResult};
use crate::executor::ExecutorFactory;
use crate::loader::CaseLoader;

pub const SELECT_SAMPLE_FIXTURE: &str = "/integration/v1/test_select_sample.yaml";
pub const EXPRESSION_FIXTURE: &str = "/integration/v1/test_expression.yaml";
pub const UDAF_FUNCTION_FIXTURE: &str = "/integration/v1/test_udaf_function.yaml";
pub const SUB_SELECT_FIXTURE: &str = "/integration/v1/test_sub_select.yaml";

const DISABLED_REASON: &str = "group disabled in suite inventory";

/// One fixture and the switch that decides whether its cases run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureGroup {
    pub name: String,
    pub fixture: String,
    pub enabled: bool,
}

impl FixtureGroup {
    pub fn enabled(name: impl Into<String>, fixture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fixture: fixture.into(),
            enabled: true,
        }
    }

    pub fn disabled(name: impl Into<String>, fixture: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::enabled(name, fixture)
        }
    }
}

/// An ordered collection of fixture groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suite {
    pub name: String,
    pub groups: Vec<FixtureGroup>,
}

impl Suite {
    pub fn new(name: impl Into<String>, groups: Vec<FixtureGroup>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }

    /// The select suite. Only the sample group is switched on.
    pub fn select() -> Self {
        Self::new(
            "select",
            vec![
                FixtureGroup::enabled("sample_select", SELECT_SAMPLE_FIXTURE),
                FixtureGroup::disabled("expression", EXPRESSION_FIXTURE),
                FixtureGroup::disabled("udaf_function", UDAF_FUNCTION_FIXTURE),
                FixtureGroup::disabled("sub_select", SUB_SELECT_FIXTURE),
            ],
        )
    }

    pub fn group(&self, name: &str) -> Option<&FixtureGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Loads and dispatches every enabled group, in order.
    pub fn run<L, F>(&self, loader: &L, dispatcher: &Dispatcher<'_, F>) -> SuiteReport
    where
        L: CaseLoader + ?Sized,
        F: ExecutorFactory,
    {
        let groups = self
            .groups
            .iter()
            .map(|group| GroupReport {
                group: group.clone(),
                outcome: run_group(group, loader, dispatcher),
            })
            .collect();
        SuiteReport {
            suite: self.name.clone(),
            groups,
        }
    }
}

fn run_group<L, F>(group: &FixtureGroup, loader: &L, dispatcher: &Dispatcher<'_, F>) -> GroupOutcome
where
    L: CaseLoader + ?Sized,
    F: ExecutorFactory,
{
    let span = info_span!("group", name = %group.name, fixture = %group.fixture);
    let _entered = span.enter();
    if !group.enabled {
        info!("skipped: {}", DISABLED_REASON);
        return GroupOutcome::Disabled;
    }
    match loader.load(&group.fixture) {
        Ok(cases) => {
            info!(cases = cases.len(), "dispatching");
            GroupOutcome::Dispatched(dispatcher.dispatch(&group.name, &cases))
        }
        Err(err) => {
            warn!(error = %err, "fixture setup failed");
            GroupOutcome::SetupFailed(err)
        }
    }
}

/// What happened to a group as a whole.
#[derive(Debug)]
pub enum GroupOutcome {
    /// Not loaded, not executed.
    Disabled,
    /// The fixture could not be loaded; no case of the group ran.
    SetupFailed(HarnessError),
    Dispatched(Vec<TestResult>),
}

#[derive(Debug)]
pub struct GroupReport {
    pub group: FixtureGroup,
    pub outcome: GroupOutcome,
}

impl GroupReport {
    /// Per-case results; a disabled group contributes one skipped entry.
    pub fn results(&self) -> Vec<TestResult> {
        match &self.outcome {
            GroupOutcome::Disabled => vec![TestResult::Skipped {
                group: self.group.name.clone(),
                name: self.group.name.clone(),
                reason: DISABLED_REASON.to_string(),
            }],
            GroupOutcome::SetupFailed(_) => Vec::new(),
            GroupOutcome::Dispatched(results) => results.clone(),
        }
    }
}

/// Counts across a whole suite run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub setup_failures: usize,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.setup_failures > 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

#[derive(Debug)]
pub struct SuiteReport {
    pub suite: String,
    pub groups: Vec<GroupReport>,
}

impl SuiteReport {
    pub fn group(&self, name: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.group.name == name)
    }

    pub fn results(&self) -> Vec<TestResult> {
        self.groups.iter().flat_map(GroupReport::results).collect()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for group in &self.groups {
            if let GroupOutcome::SetupFailed(_) = group.outcome {
                summary.setup_failures += 1;
            }
            for result in group.results() {
                match result {
                    TestResult::Pass { .. } => summary.passed += 1,
                    TestResult::Fail { .. } => summary.failed += 1,
                    TestResult::Skipped { .. } => summary.skipped += 1,
                }
            }
        }
        summary
    }
}
