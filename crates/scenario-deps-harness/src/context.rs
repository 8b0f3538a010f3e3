//! Per-run scenario context.
//!
//! A `ScenarioContext` is created when a scenario starts and dropped when it
//! ends. It records which group the scenario belongs to, so hooks can look up
//! sibling scenarios without inspecting the call stack, and it keeps a
//! type-indexed map of extension values shared between hooks and the body.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::definition::{GroupDefinition, ScenarioDefinition};
use crate::error::ScenarioError;
use crate::metadata::ScenarioMetadata;

/// Execution state for one scenario run.
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
/// static SCENARIOS: [ScenarioDefinition; 1] =
///     [ScenarioDefinition::new("Adds", body).with_tags(&["@fast"])];
/// static GROUP: GroupDefinition =
///     GroupDefinition::new("CalculatorFeature", &SCENARIOS).with_tags(&["@calc"]);
///
/// let mut ctx = ScenarioContext::new(&GROUP, &SCENARIOS[0], Vec::new());
/// assert_eq!(ctx.metadata().tags(), ["@fast", "@calc"]);
///
/// ctx.insert(41_u32);
/// if let Some(value) = ctx.get_mut::<u32>() {
///     *value += 1;
/// }
/// assert_eq!(ctx.get::<u32>(), Some(&42));
/// ```
pub struct ScenarioContext {
    metadata: ScenarioMetadata,
    group: &'static GroupDefinition,
    scenario: &'static ScenarioDefinition,
    error: Option<ScenarioError>,
    extensions: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl ScenarioContext {
    /// Start a context for `scenario` inside `group`, bound to one example
    /// row (empty for plain scenarios).
    #[must_use]
    pub fn new(
        group: &'static GroupDefinition,
        scenario: &'static ScenarioDefinition,
        arguments: Vec<(String, String)>,
    ) -> Self {
        Self {
            metadata: describe(group, scenario, arguments),
            group,
            scenario,
            error: None,
            extensions: HashMap::new(),
        }
    }

    /// Identity, tags and arguments of this run.
    #[must_use]
    pub fn metadata(&self) -> &ScenarioMetadata {
        &self.metadata
    }

    /// The group enclosing the running scenario.
    #[must_use]
    pub fn group(&self) -> &'static GroupDefinition {
        self.group
    }

    /// The definition of the running scenario.
    #[must_use]
    pub fn scenario(&self) -> &'static ScenarioDefinition {
        self.scenario
    }

    /// Example argument by column name.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.metadata.argument(name)
    }

    /// Error recorded for the run so far; visible to after-scenario hooks.
    #[must_use]
    pub fn error(&self) -> Option<&ScenarioError> {
        self.error.as_ref()
    }

    pub(crate) fn record_error(&mut self, error: Option<ScenarioError>) {
        self.error = error;
    }

    pub(crate) fn take_error(&mut self) -> Option<ScenarioError> {
        self.error.take()
    }

    /// Store an extension value, returning the previous value of that type.
    pub fn insert<T: Any + Send>(&mut self, value: T) -> Option<T> {
        self.extensions
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Borrow an extension value by type.
    #[must_use]
    pub fn get<T: Any + Send>(&self) -> Option<&T> {
        self.extensions.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    /// Borrow an extension value mutably by type.
    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.extensions.get_mut(&TypeId::of::<T>())?.downcast_mut::<T>()
    }

    /// Borrow an extension value, inserting `T::default()` when absent.
    pub fn get_or_default<T: Any + Send + Default>(&mut self) -> &mut T {
        let slot = self
            .extensions
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::default()));
        match slot.downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("extension keyed by its own TypeId"),
        }
    }

    /// Remove an extension value by type.
    pub fn remove<T: Any + Send>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }
}

/// Metadata of one run: titles, scenario tags followed by group tags, and the
/// example row.
pub(crate) fn describe(
    group: &GroupDefinition,
    scenario: &ScenarioDefinition,
    arguments: Vec<(String, String)>,
) -> ScenarioMetadata {
    let tags = scenario
        .tags
        .iter()
        .chain(group.tags.iter())
        .map(|tag| (*tag).to_string())
        .collect();
    ScenarioMetadata::new(group.title(), scenario.title(), tags, arguments)
}

impl fmt::Debug for ScenarioContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("metadata", &self.metadata)
            .field("error", &self.error)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}
