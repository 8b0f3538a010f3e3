//! Errors raised while resolving and replaying dependencies.

use scenario_deps_harness::{HostError, ScenarioError};
use thiserror::Error;

use crate::id::DependencyId;

/// Failure to satisfy a scenario's declared dependency.
///
/// Every variant except [`DependencyError::Skipped`] fails the calling
/// scenario. Variants wrapping a dependency's own failure keep it as their
/// `source`, so the root error stays observable.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum DependencyError {
    /// The declared name matches no scenario of the enclosing group.
    #[error("dependency scenario '{name}' cannot be found in group '{group}'")]
    NotFound {
        /// Declared dependency name.
        name: String,
        /// Title of the searched group.
        group: String,
    },
    /// The scenario exists but is not marked as a dependency.
    #[error("dependency '{name}' does not have the @dependency tag")]
    NotMarkedAsDependency {
        /// Declared dependency name.
        name: String,
    },
    /// The scenario is an outline and cannot be a dependency.
    #[error("scenario outline '{name}' cannot be used as a dependency")]
    InvalidTarget {
        /// Name of the outline.
        name: String,
    },
    /// The host could not run the dependency.
    #[error("failed to invoke dependency '{id}'")]
    Invocation {
        /// Identity of the dependency.
        id: DependencyId,
        /// Host failure.
        source: HostError,
    },
    /// The dependency ran and failed.
    #[error("the dependency '{id}' failed")]
    Failed {
        /// Identity of the dependency.
        id: DependencyId,
        /// The dependency's own error.
        #[source]
        cause: ScenarioError,
    },
    /// A dependency scenario was reached again after failing.
    #[error("the dependency '{id}' was already executed and failed")]
    PreviouslyFailed {
        /// Identity of the dependency.
        id: DependencyId,
        /// The error recorded by the first run.
        #[source]
        cause: ScenarioError,
    },
    /// Resolving the dependency would wait on the caller itself.
    #[error("circular dependency on '{id}'")]
    Cycle {
        /// Identity at which the cycle closed.
        id: DependencyId,
    },
    /// The dependency did not produce an outcome for this caller.
    #[error("the dependency '{id}' did not run to completion")]
    Skipped {
        /// Identity of the dependency.
        id: DependencyId,
    },
}

impl DependencyError {
    /// Returns `true` when the error wraps the dependency's own failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenario_deps::{DependencyError, DependencyId};
    ///
    /// let cycle = DependencyError::Cycle { id: DependencyId::new("Calculator", "Add") };
    /// assert!(!cycle.is_dependency_failure());
    /// ```
    #[must_use]
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::PreviouslyFailed { .. })
    }

    /// The dependency's own error, for failure-wrapping variants.
    #[must_use]
    pub fn cause(&self) -> Option<&ScenarioError> {
        match self {
            Self::Failed { cause, .. } | Self::PreviouslyFailed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

impl From<DependencyError> for ScenarioError {
    fn from(error: DependencyError) -> Self {
        match error {
            DependencyError::Skipped { .. } => Self::skip(error.to_string()),
            other => Self::failed(other),
        }
    }
}
