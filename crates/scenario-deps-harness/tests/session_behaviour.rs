//! Behavioural tests for sessions, hooks and nested scenario invocation.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rstest::{fixture, rstest};
use scenario_deps_harness::{
    GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError, ScenarioHook,
    ScenarioHost, ScenarioStatus, TestSession, config, find_registered_group, register_group,
};
use serial_test::serial;

static SETUP_RUNS: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Total(i64);

fn setup(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
    SETUP_RUNS.fetch_add(1, Ordering::SeqCst);
    ctx.get_or_default::<Total>().0 = 5;
    Ok(())
}

fn uses_total(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
    let total = ctx.get::<Total>().map_or(0, |total| total.0);
    assert_eq!(total, 0, "callers start with fresh state");
    Ok(())
}

fn fails(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
    assert_eq!(2 + 3, 99, "the sum should be 99");
    Ok(())
}

static SCENARIOS: [ScenarioDefinition; 3] = [
    ScenarioDefinition::new("Setup", setup).with_title("Set up the total"),
    ScenarioDefinition::new("UsesTotal", uses_total).with_tags(&["@runs-setup"]),
    ScenarioDefinition::new("Fails", fails),
];
static GROUP: GroupDefinition = GroupDefinition::new("BehaviourFeature", &SCENARIOS)
    .with_title("Behaviour")
    .with_tags(&["@behaviour"]);

register_group!(GROUP);

/// Runs `Setup` in front of every scenario tagged `@runs-setup`.
struct RunsSetup {
    nested: Arc<Mutex<Vec<String>>>,
}

impl ScenarioHook for RunsSetup {
    fn order(&self) -> i32 {
        -1
    }

    fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
        let Some(ctx) = host.current_scenario() else {
            return Ok(());
        };
        if !ctx.metadata().has_tag("runs-setup") {
            return Ok(());
        }
        let group = ctx.group();
        let Some(target) = group.scenario("Setup") else {
            return Err(ScenarioError::skip("no setup scenario"));
        };
        let Some(suspended) = host.suspend_scenario() else {
            return Ok(());
        };
        let outcome = host.invoke_scenario(group, target);
        host.resume_scenario(suspended);
        self.nested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{}:{}", target.name, outcome.is_passed()));
        Ok(())
    }
}

#[fixture]
fn nested() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[rstest]
#[serial]
fn hooks_can_run_sibling_scenarios(nested: Arc<Mutex<Vec<String>>>) {
    SETUP_RUNS.store(0, Ordering::SeqCst);
    let session = TestSession::builder()
        .hook(RunsSetup {
            nested: Arc::clone(&nested),
        })
        .workers(NonZeroUsize::MIN)
        .build();
    let report = session.run(&[&GROUP]);

    assert_eq!(SETUP_RUNS.load(Ordering::SeqCst), 2);
    assert_eq!(
        *nested.lock().unwrap_or_else(PoisonError::into_inner),
        ["Setup:true"]
    );
    assert!(matches!(
        report.find("Behaviour", "UsesTotal").map(|r| r.status()),
        Some(ScenarioStatus::Passed)
    ));
}

#[rstest]
#[serial]
fn assertion_failures_are_reported_with_their_message() {
    let report = TestSession::builder()
        .workers(NonZeroUsize::MIN)
        .build()
        .run(&[&GROUP]);
    let Some(record) = report.find("Behaviour", "Fails") else {
        panic!("failing scenario should be reported");
    };
    let chain = record.status().failure_chain();
    assert!(chain.iter().any(|line| line.contains("the sum should be 99")));
    assert_eq!(record.metadata().tags(), ["@behaviour"]);
    assert!(!report.is_success());
}

#[rstest]
#[serial]
fn registered_groups_run_without_listing_them() {
    assert!(find_registered_group("BehaviourFeature").is_some());
    let report = TestSession::builder()
        .workers(NonZeroUsize::MIN)
        .build()
        .run_registered();
    assert!(report.find("Behaviour", "Set up the total").is_some());
}

#[rstest]
#[case(1)]
#[case(4)]
#[serial]
fn worker_override_sets_session_default(#[case] workers: usize) {
    let Some(workers) = NonZeroUsize::new(workers) else {
        panic!("case values are non-zero");
    };
    config::set_worker_count(workers);
    let session = TestSession::builder().build();
    config::clear_worker_count_override();
    assert_eq!(session.worker_count(), workers);
}

/// Panics in `before_scenario` for the scenario with the given name.
struct ExplodesOn(&'static str);

impl ScenarioHook for ExplodesOn {
    fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
        let explodes = host
            .current_scenario()
            .is_some_and(|ctx| ctx.scenario().name == self.0);
        assert!(!explodes, "hook exploded on {}", self.0);
        Ok(())
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[serial]
fn panicking_hook_fails_only_its_scenario(#[case] workers: usize) {
    let Some(workers) = NonZeroUsize::new(workers) else {
        panic!("case values are non-zero");
    };
    let report = TestSession::builder()
        .hook(ExplodesOn("Setup"))
        .workers(workers)
        .build()
        .run(&[&GROUP]);

    assert_eq!(report.records().len(), 3);
    let Some(setup) = report.find("Behaviour", "Set up the total") else {
        panic!("the scenario whose hook panicked should be reported");
    };
    assert_eq!(setup.status().failure_chain(), ["hook exploded on Setup"]);
    assert!(matches!(
        report.find("Behaviour", "UsesTotal").map(|r| r.status()),
        Some(ScenarioStatus::Passed)
    ));
    assert_eq!(report.failed(), 2);
    assert!(!report.is_success());
}
