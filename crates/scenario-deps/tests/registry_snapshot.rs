//! Registry dumps taken after a session run.

use std::num::NonZeroUsize;
use std::sync::Arc;

use scenario_deps::{DependencyPlugin, DependencyRegistry, diagnostics};
use scenario_deps_harness::{
    GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError, TestSession,
};

fn passes(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
    Ok(())
}

fn fails(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
    assert_eq!(1 + 1, 3, "arithmetic is broken");
    Ok(())
}

fn ignored(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
    Err(ScenarioError::skip("not ready"))
}

static SCENARIOS: [ScenarioDefinition; 3] = [
    ScenarioDefinition::new("Passes", passes),
    ScenarioDefinition::new("Fails", fails),
    ScenarioDefinition::new("Ignored", ignored),
];
static GROUP: GroupDefinition =
    GroupDefinition::new("SnapshotFeature", &SCENARIOS).with_tags(&["@dependency"]);

#[test]
fn dump_lists_terminal_slots_only() {
    let registry = Arc::new(DependencyRegistry::new());
    let session = DependencyPlugin::new(Arc::clone(&registry))
        .install(TestSession::builder())
        .workers(NonZeroUsize::MIN)
        .build();
    let report = session.run(&[&GROUP]);
    assert_eq!(report.skipped(), 1);

    let Ok(json) = diagnostics::dump_registry(&registry) else {
        panic!("registry should serialize");
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
        panic!("dump should be valid JSON: {json}");
    };
    let Some(entries) = value.as_array() else {
        panic!("dump should be an array: {json}");
    };
    let summary: Vec<(&str, &str)> = entries
        .iter()
        .filter_map(|entry| Some((entry.get("id")?.as_str()?, entry.get("status")?.as_str()?)))
        .collect();
    assert_eq!(
        summary,
        [
            ("SnapshotFeature.Fails", "failed"),
            ("SnapshotFeature.Passes", "succeeded"),
        ]
    );
    assert!(json.contains("arithmetic is broken"));
}

#[test]
fn pretty_writer_produces_the_same_entries() {
    let registry = DependencyRegistry::new();
    let mut buffer = Vec::new();
    assert!(diagnostics::write_registry(&mut buffer, &registry).is_ok());
    assert_eq!(String::from_utf8_lossy(&buffer), "[]");
}
