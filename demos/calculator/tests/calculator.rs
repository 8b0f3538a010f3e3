//! End-to-end calculator runs through the dependency plugin.

use std::num::NonZeroUsize;
use std::sync::Arc;

use calculator_demo::{CALCULATOR_FEATURE, FAILING_CALCULATOR_FEATURE, SampleHooks};
use rstest::{fixture, rstest};
use scenario_deps::{DependencyError, DependencyId, DependencyPlugin, DependencyRegistry, Outcome};
use scenario_deps_harness::{ScenarioStatus, TestSession};

#[fixture]
fn registry() -> Arc<DependencyRegistry> {
    Arc::new(DependencyRegistry::new())
}

fn session(registry: &Arc<DependencyRegistry>, workers: usize) -> TestSession {
    let workers = NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN);
    DependencyPlugin::new(Arc::clone(registry))
        .install(TestSession::builder())
        .hook(SampleHooks)
        .workers(workers)
        .build()
}

#[rstest]
#[case(1)]
#[case(4)]
fn sum_is_used_without_rerunning_the_dependency(
    registry: Arc<DependencyRegistry>,
    #[case] workers: usize,
) {
    let report = session(&registry, workers).run(&[&CALCULATOR_FEATURE]);

    assert_eq!(report.failed(), 0, "{report:?}");
    assert!(matches!(
        report.find("Calculator", "Use the sum").map(|r| r.status()),
        Some(ScenarioStatus::Passed)
    ));
    assert!(matches!(
        registry.get(&DependencyId::new("Calculator", "Add two numbers")),
        Some(Outcome::Succeeded)
    ));
    assert_eq!(registry.len(), 1);
}

#[rstest]
fn failing_sum_fails_its_dependent_only(registry: Arc<DependencyRegistry>) {
    let report = session(&registry, 2).run(&[&FAILING_CALCULATOR_FEATURE]);

    let Some(dependent) = report.find("Failing calculator", "Use the sum") else {
        panic!("dependent should be reported");
    };
    let error = dependent
        .status()
        .error()
        .and_then(|error| error.downcast_ref::<DependencyError>());
    assert!(matches!(error, Some(DependencyError::Failed { .. })));
    assert!(
        error
            .and_then(DependencyError::cause)
            .is_some_and(|cause| cause.to_string().contains("the result should be 99"))
    );
    assert!(matches!(
        report.find("Failing calculator", "Independent sum").map(|r| r.status()),
        Some(ScenarioStatus::Passed)
    ));
}
