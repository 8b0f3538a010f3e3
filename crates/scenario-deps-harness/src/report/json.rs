//! JSON writer for session reports.
//!
//! Status labels stay lowercase so downstream tools can rely on consistent
//! casing. Failures carry their full cause chain.

use std::io::Write;

use serde::Serialize;

use super::{ScenarioRecord, ScenarioStatus, SessionReport};

#[derive(Serialize)]
struct JsonReport<'a> {
    passed: usize,
    skipped: usize,
    failed: usize,
    scenarios: Vec<JsonScenario<'a>>,
}

#[derive(Serialize)]
struct JsonScenario<'a> {
    group: &'a str,
    scenario: &'a str,
    status: &'static str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    arguments: &'a [(String, String)],
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failure: Vec<String>,
}

impl<'a> From<&'a SessionReport> for JsonReport<'a> {
    fn from(report: &'a SessionReport) -> Self {
        Self {
            passed: report.passed(),
            skipped: report.skipped(),
            failed: report.failed(),
            scenarios: report.records().iter().map(JsonScenario::from).collect(),
        }
    }
}

impl<'a> From<&'a ScenarioRecord> for JsonScenario<'a> {
    fn from(record: &'a ScenarioRecord) -> Self {
        let message = match record.status() {
            ScenarioStatus::Skipped { message } => message.as_deref(),
            ScenarioStatus::Passed | ScenarioStatus::Failed(_) => None,
        };
        Self {
            group: record.group_title(),
            scenario: record.scenario_title(),
            status: record.status().label(),
            tags: record.metadata().tags(),
            arguments: record.metadata().arguments(),
            message,
            failure: record.status().failure_chain(),
        }
    }
}

/// Serialize `report` into the supplied writer.
///
/// # Errors
/// Returns an error when serialization or writing fails.
pub fn write<W: Write>(writer: &mut W, report: &SessionReport) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &JsonReport::from(report))
}

/// Produce a JSON string representation of `report`.
///
/// # Examples
/// ```rust
/// use scenario_deps_harness::report::json;
/// use scenario_deps_harness::{ScenarioMetadata, ScenarioRecord, ScenarioStatus, SessionReport};
///
/// let report = SessionReport::new(vec![ScenarioRecord::new(
///     ScenarioMetadata::new("Calculator", "Add", Vec::new(), Vec::new()),
///     ScenarioStatus::Passed,
/// )]);
/// let json = json::to_string(&report).unwrap();
/// assert!(json.contains("\"status\":\"passed\""));
/// ```
///
/// # Errors
/// Returns an error when serialization fails.
pub fn to_string(report: &SessionReport) -> serde_json::Result<String> {
    serde_json::to_string(&JsonReport::from(report))
}
