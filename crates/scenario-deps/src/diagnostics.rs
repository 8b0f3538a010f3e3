//! JSON dump of the dependency registry.
//!
//! The dump lists every slot sorted by identity with a lowercase status.
//! Failed slots include the recorded error and its sources.

use std::error::Error;
use std::io::Write;

use serde::Serialize;

use crate::id::DependencyId;
use crate::registry::{DependencyRegistry, Outcome};

#[derive(Serialize)]
struct SlotDump {
    id: DependencyId,
    status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    error: Vec<String>,
}

impl SlotDump {
    fn new(id: DependencyId, outcome: &Outcome) -> Self {
        let mut error = Vec::new();
        if let Outcome::Failed(failure) = outcome {
            error.push(failure.to_string());
            let mut source = failure.source();
            while let Some(cause) = source {
                error.push(cause.to_string());
                source = cause.source();
            }
        }
        Self {
            id,
            status: outcome.label(),
            error,
        }
    }
}

fn dump(registry: &DependencyRegistry) -> Vec<SlotDump> {
    registry
        .snapshot()
        .into_iter()
        .map(|(id, outcome)| SlotDump::new(id, &outcome))
        .collect()
}

/// Serialize the registry into a JSON array.
///
/// # Examples
///
/// ```
/// use scenario_deps::{DependencyId, DependencyRegistry, diagnostics};
///
/// let registry = DependencyRegistry::new();
/// let id = DependencyId::new("Calculator", "Add two numbers");
/// registry.try_claim(&id);
/// let json = diagnostics::dump_registry(&registry).unwrap();
/// assert_eq!(json, r#"[{"id":"Calculator.Add two numbers","status":"pending"}]"#);
/// ```
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn dump_registry(registry: &DependencyRegistry) -> serde_json::Result<String> {
    serde_json::to_string(&dump(registry))
}

/// Write the registry as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error when serialization or writing fails.
pub fn write_registry<W: Write>(writer: &mut W, registry: &DependencyRegistry) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &dump(registry))
}
