//! Resolution of declared dependencies to scenario definitions.
//!
//! Lookups are structural: the declared name is matched against the
//! scenarios of the group enclosing the caller, which the host records in
//! every scenario context.

use scenario_deps_harness::{GroupDefinition, ScenarioDefinition};

use crate::declaration::{DEPENDENCY_TAG, DependencyDeclaration};
use crate::error::DependencyError;
use crate::id::DependencyId;

/// A dependency target validated as invocable.
#[derive(Clone, Debug)]
pub struct LocatedDependency {
    group: &'static GroupDefinition,
    scenario: &'static ScenarioDefinition,
    id: DependencyId,
}

impl LocatedDependency {
    fn new(group: &'static GroupDefinition, scenario: &'static ScenarioDefinition) -> Self {
        Self {
            group,
            scenario,
            id: DependencyId::of(group, scenario),
        }
    }

    /// Group declaring the dependency.
    #[must_use]
    pub fn group(&self) -> &'static GroupDefinition {
        self.group
    }

    /// The dependency's definition.
    #[must_use]
    pub fn scenario(&self) -> &'static ScenarioDefinition {
        self.scenario
    }

    /// The dependency's identity.
    #[must_use]
    pub fn id(&self) -> &DependencyId {
        &self.id
    }
}

/// Returns `true` when `scenario`, or its group, carries the dependency
/// marker.
#[must_use]
pub fn is_marked(group: &GroupDefinition, scenario: &ScenarioDefinition) -> bool {
    scenario.has_tag(DEPENDENCY_TAG) || group.has_tag(DEPENDENCY_TAG)
}

/// Resolve `declaration` against the scenarios of `group`.
///
/// # Errors
///
/// - [`DependencyError::NotFound`] when no scenario has the declared name;
/// - [`DependencyError::NotMarkedAsDependency`] when it lacks the marker;
/// - [`DependencyError::InvalidTarget`] when it is an outline.
///
/// # Examples
///
/// ```
/// use scenario_deps::{DependencyDeclaration, DependencyError, locate};
/// use scenario_deps_harness::{GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError};
///
/// fn body(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
///     Ok(())
/// }
///
/// static SCENARIOS: [ScenarioDefinition; 1] =
///     [ScenarioDefinition::new("AddTwoNumbers", body).with_tags(&["@dependency"])];
/// static GROUP: GroupDefinition = GroupDefinition::new("CalculatorFeature", &SCENARIOS);
///
/// let found = DependencyDeclaration::parse("@dependsOn:AddTwoNumbers")
///     .map(|declaration| locate(&declaration, &GROUP));
/// assert!(matches!(found, Some(Ok(_))));
///
/// let missing = DependencyDeclaration::parse("@dependsOn:Subtract")
///     .map(|declaration| locate(&declaration, &GROUP));
/// assert!(matches!(missing, Some(Err(DependencyError::NotFound { .. }))));
/// ```
pub fn locate(
    declaration: &DependencyDeclaration,
    group: &'static GroupDefinition,
) -> Result<LocatedDependency, DependencyError> {
    let name = declaration.target();
    let scenario = group
        .scenario(name)
        .ok_or_else(|| DependencyError::NotFound {
            name: name.to_owned(),
            group: group.title().to_owned(),
        })?;
    if !is_marked(group, scenario) {
        return Err(DependencyError::NotMarkedAsDependency {
            name: name.to_owned(),
        });
    }
    if scenario.is_parameterized() {
        return Err(DependencyError::InvalidTarget {
            name: name.to_owned(),
        });
    }
    Ok(LocatedDependency::new(group, scenario))
}

/// Dependency targets a group offers: marked scenarios that are not
/// outlines, in declaration order.
#[must_use]
pub fn eligible_dependencies(group: &'static GroupDefinition) -> Vec<LocatedDependency> {
    group
        .scenarios
        .iter()
        .filter(|scenario| is_marked(group, scenario) && !scenario.is_parameterized())
        .map(|scenario| LocatedDependency::new(group, scenario))
        .collect()
}

/// Find the eligible dependency of `group` with the given identity.
#[must_use]
pub fn locate_by_id(group: &'static GroupDefinition, id: &DependencyId) -> Option<LocatedDependency> {
    eligible_dependencies(group)
        .into_iter()
        .find(|located| located.id() == id)
}
