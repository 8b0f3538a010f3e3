//! Scenario outcomes collected by a session run.

use std::error::Error;

use crate::error::{ScenarioError, ScenarioOutcome};
use crate::metadata::ScenarioMetadata;

/// JSON writer for session reports.
#[cfg(feature = "diagnostics")]
pub mod json;

/// Outcome recorded for a single scheduled scenario run.
#[derive(Clone, Debug)]
pub struct ScenarioRecord {
    metadata: ScenarioMetadata,
    status: ScenarioStatus,
}

impl ScenarioRecord {
    /// Construct a record for the provided metadata.
    ///
    /// # Examples
    /// ```
    /// use scenario_deps_harness::{ScenarioMetadata, ScenarioRecord, ScenarioStatus};
    ///
    /// let record = ScenarioRecord::new(
    ///     ScenarioMetadata::new("Calculator", "Add", Vec::new(), Vec::new()),
    ///     ScenarioStatus::Passed,
    /// );
    /// assert_eq!(record.group_title(), "Calculator");
    /// assert_eq!(record.status().label(), "passed");
    /// ```
    #[must_use]
    pub fn new(metadata: ScenarioMetadata, status: ScenarioStatus) -> Self {
        Self { metadata, status }
    }

    /// Title of the group the scenario belongs to.
    #[must_use]
    pub fn group_title(&self) -> &str {
        self.metadata.group_title()
    }

    /// Title of the scenario.
    #[must_use]
    pub fn scenario_title(&self) -> &str {
        self.metadata.scenario_title()
    }

    /// Full metadata of the run, including outline arguments.
    #[must_use]
    pub fn metadata(&self) -> &ScenarioMetadata {
        &self.metadata
    }

    /// Recorded status.
    #[must_use]
    pub fn status(&self) -> &ScenarioStatus {
        &self.status
    }
}

/// Status of a scenario run.
#[derive(Clone, Debug)]
pub enum ScenarioStatus {
    /// The scenario ran to completion.
    Passed,
    /// The scenario was skipped.
    Skipped {
        /// Optional skip reason.
        message: Option<String>,
    },
    /// The scenario failed.
    Failed(ScenarioError),
}

impl ScenarioStatus {
    /// Lowercase label for the status.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Skipped { .. } => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// The failure, when the scenario failed.
    #[must_use]
    pub fn error(&self) -> Option<&ScenarioError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Messages of the failure followed by each of its sources.
    ///
    /// # Examples
    /// ```
    /// use scenario_deps_harness::{HostError, ScenarioError, ScenarioStatus};
    ///
    /// let status = ScenarioStatus::Failed(ScenarioError::failed(HostError::NoActiveScenario));
    /// assert_eq!(status.failure_chain(), ["no scenario context is active on this worker"]);
    /// assert!(ScenarioStatus::Passed.failure_chain().is_empty());
    /// ```
    #[must_use]
    pub fn failure_chain(&self) -> Vec<String> {
        let Some(error) = self.error() else {
            return Vec::new();
        };
        let mut chain = vec![error.to_string()];
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        chain
    }
}

impl From<ScenarioOutcome> for ScenarioStatus {
    fn from(outcome: ScenarioOutcome) -> Self {
        match outcome {
            ScenarioOutcome::Passed => Self::Passed,
            ScenarioOutcome::Skipped { message } => Self::Skipped { message },
            ScenarioOutcome::Failed(error) => Self::Failed(error),
        }
    }
}

/// Records of every scheduled scenario run, in scheduling order.
#[derive(Clone, Debug, Default)]
pub struct SessionReport {
    records: Vec<ScenarioRecord>,
}

impl SessionReport {
    /// Build a report from records.
    #[must_use]
    pub fn new(records: Vec<ScenarioRecord>) -> Self {
        Self { records }
    }

    /// All records.
    #[must_use]
    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    /// First record matching the group and scenario titles.
    #[must_use]
    pub fn find(&self, group_title: &str, scenario_title: &str) -> Option<&ScenarioRecord> {
        self.records.iter().find(|record| {
            record.group_title() == group_title && record.scenario_title() == scenario_title
        })
    }

    /// Number of passed runs.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|status| matches!(status, ScenarioStatus::Passed))
    }

    /// Number of skipped runs.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, ScenarioStatus::Skipped { .. }))
    }

    /// Number of failed runs.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, ScenarioStatus::Failed(_)))
    }

    /// Returns `true` when no run failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, predicate: impl Fn(&ScenarioStatus) -> bool) -> usize {
        self.records
            .iter()
            .filter(|record| predicate(record.status()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scenario: &str, status: ScenarioStatus) -> ScenarioRecord {
        ScenarioRecord::new(
            ScenarioMetadata::new("Calculator", scenario, Vec::new(), Vec::new()),
            status,
        )
    }

    #[test]
    fn report_counts_statuses() {
        let report = SessionReport::new(vec![
            record("a", ScenarioStatus::Passed),
            record("b", ScenarioStatus::Skipped { message: None }),
            record(
                "c",
                ScenarioStatus::Failed(ScenarioError::Panicked {
                    message: "boom".into(),
                }),
            ),
        ]);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(
            report.find("Calculator", "c").map(|r| r.status().label()),
            Some("failed")
        );
        assert!(report.find("Calculator", "missing").is_none());
    }

    #[test]
    fn outcome_converts_to_status() {
        let status = ScenarioStatus::from(ScenarioOutcome::Skipped {
            message: Some("later".into()),
        });
        assert!(matches!(status, ScenarioStatus::Skipped { message: Some(ref m) } if m == "later"));
    }
}
