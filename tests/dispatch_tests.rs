mod common;

use sqlcase::suite::{GroupOutcome, SELECT_SAMPLE_FIXTURE};
use sqlcase::{
    CaseLoader, Dispatcher, ErrorType, FixtureGroup, FixtureLoader, Suite, TestResult,
};

use common::{address_of, fixtures_root, CountingFactory, MemoryEngine, RecordingLoader};

fn loader() -> FixtureLoader {
    FixtureLoader::new(fixtures_root())
}

#[test]
fn sample_fixture_dispatches_once_per_case_against_the_shared_engine() {
    let engine = MemoryEngine::new();
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());

    let cases = loader().load(SELECT_SAMPLE_FIXTURE).unwrap();
    assert_eq!(cases.len(), 3);
    let results = dispatcher.dispatch("sample_select", &cases);

    let builds = dispatcher.factory().builds();
    assert_eq!(builds.len(), 3);
    assert!(builds.iter().all(|(_, ctx)| *ctx == address_of(&engine)));
    assert!(results.iter().all(TestResult::is_pass), "{:?}", results);
    assert_eq!(engine.live_tables(), 0);
}

#[test]
fn select_suite_runs_only_the_enabled_group() {
    let engine = MemoryEngine::new();
    let loader = RecordingLoader::new(loader());
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());

    let report = Suite::select().run(&loader, &dispatcher);

    assert_eq!(loader.requested(), vec![SELECT_SAMPLE_FIXTURE.to_string()]);
    assert_eq!(dispatcher.factory().builds().len(), 3);
    for name in ["expression", "udaf_function", "sub_select"] {
        let group = report.group(name).unwrap();
        assert!(matches!(group.outcome, GroupOutcome::Disabled));
    }
    let summary = report.summary();
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 3);
    assert!(!summary.has_failures());
}

#[test]
fn disabled_group_is_never_loaded_even_when_missing() {
    let engine = MemoryEngine::new();
    let loader = RecordingLoader::new(loader());
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());
    let suite = Suite::new(
        "parked",
        vec![FixtureGroup::disabled(
            "missing",
            "/integration/v1/missing.yaml",
        )],
    );

    let report = suite.run(&loader, &dispatcher);

    assert!(loader.requested().is_empty());
    assert!(dispatcher.factory().builds().is_empty());
    assert!(engine.queries().is_empty());
    assert_eq!(report.summary().skipped, 1);
}

#[test]
fn missing_fixture_fails_setup_with_zero_dispatches() {
    let engine = MemoryEngine::new();
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());
    let suite = Suite::new(
        "broken",
        vec![FixtureGroup::enabled(
            "missing",
            "/integration/v1/missing.yaml",
        )],
    );

    let report = suite.run(&loader(), &dispatcher);

    let GroupOutcome::SetupFailed(err) = &report.group("missing").unwrap().outcome else {
        panic!("expected a setup failure");
    };
    assert_eq!(err.error_type(), ErrorType::NotFound);
    assert!(dispatcher.factory().builds().is_empty());
    let summary = report.summary();
    assert_eq!(summary.setup_failures, 1);
    assert_eq!(summary.total(), 0);
    assert!(summary.has_failures());
}

#[test]
fn malformed_fixture_fails_setup_without_partial_cases() {
    let engine = MemoryEngine::new();
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());
    let suite = Suite::new(
        "broken",
        vec![
            FixtureGroup::enabled("malformed", "/broken/malformed.yaml"),
            FixtureGroup::enabled("invalid", "/broken/invalid_case.yaml"),
            FixtureGroup::enabled("typo", "/broken/unknown_key.yaml"),
        ],
    );

    let report = suite.run(&loader(), &dispatcher);

    let kinds: Vec<_> = report
        .groups
        .iter()
        .map(|g| match &g.outcome {
            GroupOutcome::SetupFailed(err) => Some(err.error_type()),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(ErrorType::Malformed),
            Some(ErrorType::InvalidCase),
            Some(ErrorType::Malformed),
        ]
    );
    assert!(dispatcher.factory().builds().is_empty());
    assert_eq!(report.summary().setup_failures, 3);
}

#[test]
fn a_failing_case_is_reported_alone() {
    let engine = MemoryEngine::new();
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());
    let cases = loader()
        .load("/integration/v1/test_select_failing.yaml")
        .unwrap();

    let results = dispatcher.dispatch("failing", &cases);

    assert_eq!(results.len(), 3);
    let failed: Vec<_> = results.iter().filter(|r| r.is_fail()).collect();
    assert_eq!(failed.len(), 1);
    let TestResult::Fail { name, diff, .. } = failed[0] else {
        unreachable!();
    };
    assert_eq!(name, "1_wrong expected row");
    assert_eq!(
        diff.as_ref().map(|(e, a)| (e.as_str(), a.as_str())),
        Some(("aa, 2", "aa, 1"))
    );
    assert!(results[0].is_pass());
    assert!(results[2].is_pass());
    assert_eq!(engine.created(), vec!["t_first", "t_second", "t_third"]);
    assert_eq!(engine.live_tables(), 0);
}

#[test]
fn filter_skips_non_matching_cases() {
    let engine = MemoryEngine::new();
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default())
        .with_filter(Some("SUBSET".to_string()));
    let cases = loader().load(SELECT_SAMPLE_FIXTURE).unwrap();

    let results = dispatcher.dispatch("sample_select", &cases);

    let ran: Vec<_> = results
        .iter()
        .filter(|r| r.is_pass())
        .map(TestResult::name)
        .collect();
    assert_eq!(ran, vec!["1_project a subset of columns"]);
    assert_eq!(results.iter().filter(|r| r.is_skipped()).count(), 2);
    assert_eq!(dispatcher.factory().builds().len(), 1);
}

#[test]
fn batch_unsupported_cases_do_not_touch_the_engine() {
    let engine = MemoryEngine::new();
    let dispatcher = Dispatcher::new(&engine, CountingFactory::default());
    let mut cases = loader().load(SELECT_SAMPLE_FIXTURE).unwrap();
    for case in &mut cases {
        case.mode = Some("batch-unsupport".to_string());
    }

    let results = dispatcher.dispatch("sample_select", &cases);

    assert!(results.iter().all(TestResult::is_pass));
    assert_eq!(dispatcher.factory().builds().len(), 3);
    assert!(engine.queries().is_empty());
    assert!(engine.created().is_empty());
}
