//! Error and outcome types produced by scenario runs.

use std::error::Error;
use std::sync::Arc;

use thiserror::Error;

/// Error returned by scenario bodies and lifecycle hooks.
///
/// The enum distinguishes control flow signals (skip requests) from real
/// failures. Failures are reference counted so an outcome can be cached and
/// replayed to several callers while keeping its `source` chain intact.
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::ScenarioError;
///
/// let skip = ScenarioError::skip("not today");
/// assert!(skip.is_skip());
/// assert_eq!(skip.skip_message(), Some("not today"));
/// assert_eq!(skip.to_string(), "not today");
/// ```
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum ScenarioError {
    /// The scenario asked to be skipped; not treated as a failure.
    #[error("{}", .message.as_deref().unwrap_or("scenario skipped"))]
    Skip {
        /// Optional reason for the skip.
        message: Option<String>,
    },
    /// The scenario body panicked, usually through a failed assertion.
    #[error("{message}")]
    Panicked {
        /// Rendered panic payload.
        message: String,
    },
    /// The scenario or one of its hooks returned an error.
    #[error(transparent)]
    Failed(Arc<dyn Error + Send + Sync + 'static>),
}

impl ScenarioError {
    /// Build a skip signal carrying `message`.
    #[must_use]
    pub fn skip(message: impl Into<String>) -> Self {
        Self::Skip {
            message: Some(message.into()),
        }
    }

    /// Wrap an arbitrary error as a scenario failure.
    #[must_use]
    pub fn failed<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::Failed(Arc::new(error))
    }

    /// Returns `true` if this error represents a skip request.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }

    /// Returns the skip message if this is a skip carrying one.
    #[must_use]
    pub fn skip_message(&self) -> Option<&str> {
        match self {
            Self::Skip { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Downcast the wrapped failure to a concrete error type.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenario_deps_harness::{HostError, ScenarioError};
    ///
    /// let error = ScenarioError::failed(HostError::NoActiveScenario);
    /// assert!(matches!(
    ///     error.downcast_ref::<HostError>(),
    ///     Some(HostError::NoActiveScenario)
    /// ));
    /// ```
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        match self {
            Self::Failed(inner) => inner.as_ref().downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Failures raised by the host itself rather than by a scenario.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostError {
    /// An operation needed the active scenario context but none was pushed.
    #[error("no scenario context is active on this worker")]
    NoActiveScenario,
}

/// Terminal result of one scenario run.
#[derive(Clone, Debug)]
pub enum ScenarioOutcome {
    /// Every hook and the body completed without error.
    Passed,
    /// A hook or the body requested a skip.
    Skipped {
        /// Optional reason for the skip.
        message: Option<String>,
    },
    /// A hook or the body failed.
    Failed(ScenarioError),
}

impl ScenarioOutcome {
    /// Classify the error recorded for a finished run.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenario_deps_harness::{ScenarioError, ScenarioOutcome};
    ///
    /// assert!(ScenarioOutcome::from_error(None).is_passed());
    /// assert!(ScenarioOutcome::from_error(Some(ScenarioError::skip("x"))).is_skipped());
    /// ```
    #[must_use]
    pub fn from_error(error: Option<ScenarioError>) -> Self {
        match error {
            None => Self::Passed,
            Some(ScenarioError::Skip { message }) => Self::Skipped { message },
            Some(other) => Self::Failed(other),
        }
    }

    /// Returns `true` for [`ScenarioOutcome::Passed`].
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns `true` for [`ScenarioOutcome::Skipped`].
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Returns `true` for [`ScenarioOutcome::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ScenarioError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer {
        #[source]
        inner: HostError,
    }

    #[test]
    fn skip_without_message_has_default_display() {
        let error = ScenarioError::Skip { message: None };
        assert_eq!(error.to_string(), "scenario skipped");
        assert_eq!(error.skip_message(), None);
    }

    #[test]
    fn failed_is_transparent_for_display_and_source() {
        let error = ScenarioError::failed(Outer {
            inner: HostError::NoActiveScenario,
        });
        assert_eq!(error.to_string(), "outer");
        let source = error.source().map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("no scenario context is active on this worker")
        );
        assert!(!error.is_skip());
    }

    #[test]
    fn clones_share_the_wrapped_failure() {
        let error = ScenarioError::failed(HostError::NoActiveScenario);
        let copy = error.clone();
        match (&error, &copy) {
            (ScenarioError::Failed(a), ScenarioError::Failed(b)) => {
                assert!(Arc::ptr_eq(a, b));
            }
            _ => panic!("expected failures"),
        }
    }

    #[test]
    fn outcome_classifies_panics_as_failures() {
        let outcome = ScenarioOutcome::from_error(Some(ScenarioError::Panicked {
            message: "boom".into(),
        }));
        assert!(outcome.is_failed());
        assert_eq!(outcome.error().map(ToString::to_string).as_deref(), Some("boom"));
    }
}
