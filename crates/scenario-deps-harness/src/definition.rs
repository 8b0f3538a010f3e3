//! Scenario and group definitions plus their compile-time registration.
//!
//! Groups are plain `static` values built with `const` constructors. A group
//! becomes discoverable by the session through [`register_group!`], which
//! submits a [`GroupRegistration`] to the `inventory` collection. Dependency
//! lookups never need reflection: a scenario is found by its structural name
//! on the group that encloses the running scenario.

use inventory::iter;

use crate::context::ScenarioContext;
use crate::error::ScenarioError;
use crate::metadata::normalise_tag;

/// Function pointer executed as a scenario body.
pub type ScenarioFn = fn(&mut ScenarioContext) -> Result<(), ScenarioError>;

/// One example row of an outline, as `(column, value)` pairs.
pub type ExampleRow = &'static [(&'static str, &'static str)];

/// A single executable scenario within a group.
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::{ScenarioContext, ScenarioDefinition, ScenarioError};
///
/// fn body(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
///     Ok(())
/// }
///
/// static ADD: ScenarioDefinition = ScenarioDefinition::new("AddTwoNumbers", body)
///     .with_title("Add two numbers")
///     .with_tags(&["dependency"]);
///
/// assert_eq!(ADD.title(), "Add two numbers");
/// assert!(ADD.has_tag("@dependency"));
/// assert!(!ADD.is_parameterized());
/// ```
#[derive(Debug)]
pub struct ScenarioDefinition {
    /// Structural name used to reference the scenario, e.g. from a
    /// `dependsOn:` tag.
    pub name: &'static str,
    /// Human-readable title; falls back to [`Self::name`].
    pub title: Option<&'static str>,
    /// Tags declared on the scenario.
    pub tags: &'static [&'static str],
    /// Example rows; non-empty for outlines.
    pub examples: &'static [ExampleRow],
    /// Scenario body.
    pub run: ScenarioFn,
}

impl ScenarioDefinition {
    /// Define a scenario with no title, tags or examples.
    #[must_use]
    pub const fn new(name: &'static str, run: ScenarioFn) -> Self {
        Self {
            name,
            title: None,
            tags: &[],
            examples: &[],
            run,
        }
    }

    /// Attach a display title.
    #[must_use]
    pub const fn with_title(self, title: &'static str) -> Self {
        Self {
            title: Some(title),
            ..self
        }
    }

    /// Attach tags.
    #[must_use]
    pub const fn with_tags(self, tags: &'static [&'static str]) -> Self {
        Self { tags, ..self }
    }

    /// Turn the scenario into an outline expanded once per example row.
    #[must_use]
    pub const fn with_examples(self, examples: &'static [ExampleRow]) -> Self {
        Self { examples, ..self }
    }

    /// Display title, falling back to the structural name.
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title.unwrap_or(self.name)
    }

    /// Returns `true` for outlines.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        !self.examples.is_empty()
    }

    /// Returns `true` when the scenario declares `tag`, ignoring a leading `@`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        has_tag(self.tags, tag)
    }
}

/// A named collection of related scenarios.
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::{GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError};
///
/// fn body(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
///     Ok(())
/// }
///
/// static SCENARIOS: [ScenarioDefinition; 1] = [ScenarioDefinition::new("Adds", body)];
/// static GROUP: GroupDefinition = GroupDefinition::new("CalculatorFeature", &SCENARIOS)
///     .with_title("Calculator");
///
/// assert_eq!(GROUP.title(), "Calculator");
/// assert!(GROUP.scenario("Adds").is_some());
/// assert!(GROUP.scenario("Subtracts").is_none());
/// ```
#[derive(Debug)]
pub struct GroupDefinition {
    /// Structural name of the group.
    pub name: &'static str,
    /// Human-readable title; falls back to [`Self::name`].
    pub title: Option<&'static str>,
    /// Tags applied to every scenario in the group.
    pub tags: &'static [&'static str],
    /// Scenarios in declaration order.
    pub scenarios: &'static [ScenarioDefinition],
}

impl GroupDefinition {
    /// Define a group with no title or tags.
    #[must_use]
    pub const fn new(name: &'static str, scenarios: &'static [ScenarioDefinition]) -> Self {
        Self {
            name,
            title: None,
            tags: &[],
            scenarios,
        }
    }

    /// Attach a display title.
    #[must_use]
    pub const fn with_title(self, title: &'static str) -> Self {
        Self {
            title: Some(title),
            ..self
        }
    }

    /// Attach group-level tags.
    #[must_use]
    pub const fn with_tags(self, tags: &'static [&'static str]) -> Self {
        Self { tags, ..self }
    }

    /// Display title, falling back to the structural name.
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title.unwrap_or(self.name)
    }

    /// Find a scenario by structural name.
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&'static ScenarioDefinition> {
        self.scenarios.iter().find(|scenario| scenario.name == name)
    }

    /// Returns `true` when the group declares `tag`, ignoring a leading `@`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        has_tag(self.tags, tag)
    }
}

fn has_tag(tags: &[&str], tag: &str) -> bool {
    let wanted = normalise_tag(tag);
    tags.iter().any(|candidate| normalise_tag(candidate) == wanted)
}

/// Inventory record announcing a group to the session.
#[derive(Debug)]
pub struct GroupRegistration {
    /// The registered group.
    pub group: &'static GroupDefinition,
    /// Source file containing the registration.
    pub file: &'static str,
    /// Line of the registration.
    pub line: u32,
}

impl GroupRegistration {
    /// Build a registration record; used by [`register_group!`].
    #[must_use]
    pub const fn new(group: &'static GroupDefinition, file: &'static str, line: u32) -> Self {
        Self { group, file, line }
    }
}

inventory::collect!(GroupRegistration);

/// Register a `static` [`GroupDefinition`] so [`registered_groups`] and
/// [`TestSession::run_registered`](crate::TestSession::run_registered) can
/// find it.
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::{
///     GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError,
///     find_registered_group, register_group,
/// };
///
/// fn body(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
///     Ok(())
/// }
///
/// static SCENARIOS: [ScenarioDefinition; 1] = [ScenarioDefinition::new("Adds", body)];
/// static DOC_GROUP: GroupDefinition = GroupDefinition::new("DocFeature", &SCENARIOS);
/// register_group!(DOC_GROUP);
///
/// assert!(find_registered_group("DocFeature").is_some());
/// ```
#[macro_export]
macro_rules! register_group {
    ($group:path) => {
        $crate::submit! {
            $crate::GroupRegistration::new(&$group, file!(), line!())
        }
    };
}

/// All groups registered through [`register_group!`], ordered by source
/// location so runs are deterministic.
#[must_use]
pub fn registered_groups() -> Vec<&'static GroupDefinition> {
    let mut registrations: Vec<&'static GroupRegistration> =
        iter::<GroupRegistration>.into_iter().collect();
    registrations.sort_by_key(|registration| (registration.file, registration.line));
    registrations
        .into_iter()
        .map(|registration| registration.group)
        .collect()
}

/// Find a registered group by structural name.
#[must_use]
pub fn find_registered_group(name: &str) -> Option<&'static GroupDefinition> {
    iter::<GroupRegistration>
        .into_iter()
        .find(|registration| registration.group.name == name)
        .map(|registration| registration.group)
}
