//! Stable identities of dependency scenarios.

use std::fmt;

use scenario_deps_harness::{GroupDefinition, ScenarioDefinition, ScenarioMetadata};

/// Key identifying a dependency-eligible scenario within a session:
/// `<group-title>.<scenario-title>`.
///
/// Titles fall back to structural names, so the identity computed from a
/// definition matches the one computed from a running scenario's metadata.
///
/// # Examples
///
/// ```
/// use scenario_deps::DependencyId;
///
/// let id = DependencyId::new("Calculator", "Add two numbers");
/// assert_eq!(id.as_str(), "Calculator.Add two numbers");
/// assert_eq!(id.to_string(), "Calculator.Add two numbers");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "diagnostics", derive(serde::Serialize))]
#[cfg_attr(feature = "diagnostics", serde(transparent))]
pub struct DependencyId(String);

impl DependencyId {
    /// Build an identity from a group title and a scenario title.
    #[must_use]
    pub fn new(group_title: &str, scenario_title: &str) -> Self {
        Self(format!("{group_title}.{scenario_title}"))
    }

    /// Identity of `scenario` declared in `group`.
    #[must_use]
    pub fn of(group: &GroupDefinition, scenario: &ScenarioDefinition) -> Self {
        Self::new(group.title(), scenario.title())
    }

    /// Identity of a running scenario.
    #[must_use]
    pub fn from_metadata(metadata: &ScenarioMetadata) -> Self {
        Self::new(metadata.group_title(), metadata.scenario_title())
    }

    /// The identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DependencyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
