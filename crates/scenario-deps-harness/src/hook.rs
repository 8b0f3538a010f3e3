//! Lifecycle hook and host contracts.
//!
//! [`ScenarioHost`] is the surface a running scenario's hooks see of the
//! harness: the active context, suspend/resume of that context, and direct
//! invocation of another scenario with its full lifecycle. [`ScenarioHook`]
//! plugs behaviour in before and after every scenario.

use crate::context::ScenarioContext;
use crate::definition::{GroupDefinition, ScenarioDefinition};
use crate::error::{ScenarioError, ScenarioOutcome};

/// Harness operations available to lifecycle hooks.
pub trait ScenarioHost {
    /// The context of the scenario currently executing on this worker.
    fn current_scenario(&self) -> Option<&ScenarioContext>;

    /// Mutable access to the current scenario context.
    fn current_scenario_mut(&mut self) -> Option<&mut ScenarioContext>;

    /// Detach the current scenario context so another scenario can run
    /// without sharing its state.
    fn suspend_scenario(&mut self) -> Option<ScenarioContext>;

    /// Reattach a context previously returned by
    /// [`suspend_scenario`](Self::suspend_scenario).
    fn resume_scenario(&mut self, context: ScenarioContext);

    /// Run `scenario` immediately, bypassing the scheduler, including its own
    /// before and after hooks.
    fn invoke_scenario(
        &mut self,
        group: &'static GroupDefinition,
        scenario: &'static ScenarioDefinition,
    ) -> ScenarioOutcome;
}

/// Behaviour executed around every scenario.
///
/// Hooks run in ascending [`order`](Self::order). Before hooks stop at the
/// first error, which becomes the scenario's error; the body only runs when
/// every before hook succeeded. After hooks always run and can inspect the
/// recorded error through [`ScenarioContext::error`].
///
/// # Examples
///
/// ```
/// use scenario_deps_harness::{ScenarioError, ScenarioHook, ScenarioHost};
///
/// struct RejectSlow;
///
/// impl ScenarioHook for RejectSlow {
///     fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
///         match host.current_scenario() {
///             Some(ctx) if ctx.metadata().has_tag("slow") => Err(ScenarioError::skip("slow")),
///             _ => Ok(()),
///         }
///     }
/// }
/// ```
pub trait ScenarioHook: Send + Sync {
    /// Position of the hook; lower values run first.
    fn order(&self) -> i32 {
        0
    }

    /// Called after the scenario context is initialised and before the body.
    ///
    /// # Errors
    ///
    /// Returning an error stops the remaining before hooks and the body; the
    /// error is recorded as the scenario's outcome.
    fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
        let _ = host;
        Ok(())
    }

    /// Called after the body (or the failing before hook) finished.
    fn after_scenario(&self, host: &mut dyn ScenarioHost) {
        let _ = host;
    }
}
