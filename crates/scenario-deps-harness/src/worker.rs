//! Single-threaded scenario executor.
//!
//! A [`Worker`] owns a stack of scenario contexts. Running a scenario pushes
//! its context, runs the before hooks, the body and the after hooks, then pops
//! the context and classifies the outcome. Panics in the body or in a hook
//! fail the run instead of unwinding the worker. Hooks may suspend the current
//! context and invoke another scenario on the same worker; the nested run gets
//! its own context and lifecycle.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::ScenarioContext;
use crate::definition::{GroupDefinition, ScenarioDefinition};
use crate::error::{HostError, ScenarioError, ScenarioOutcome};
use crate::hook::{ScenarioHook, ScenarioHost};
use crate::panic::panic_message;

/// Shared, ordered hook list.
pub type HookList = Arc<[Arc<dyn ScenarioHook>]>;

/// Executes scenarios sequentially on the calling thread.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scenario_deps_harness::{GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError, Worker};
///
/// fn fails(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
///     assert_eq!(2 + 3, 99, "the result should be 99");
///     Ok(())
/// }
///
/// static SCENARIOS: [ScenarioDefinition; 1] = [ScenarioDefinition::new("Fails", fails)];
/// static GROUP: GroupDefinition = GroupDefinition::new("WorkerDoc", &SCENARIOS);
///
/// let mut worker = Worker::new(Arc::from(Vec::new()));
/// let outcome = worker.run_scenario(&GROUP, &SCENARIOS[0], Vec::new());
/// assert!(outcome.is_failed());
/// ```
pub struct Worker {
    hooks: HookList,
    contexts: Vec<ScenarioContext>,
}

impl Worker {
    /// Create a worker running `hooks` around every scenario. The hooks must
    /// already be sorted by [`ScenarioHook::order`].
    #[must_use]
    pub fn new(hooks: HookList) -> Self {
        Self {
            hooks,
            contexts: Vec::new(),
        }
    }

    /// Run one scenario through its full lifecycle.
    pub fn run_scenario(
        &mut self,
        group: &'static GroupDefinition,
        scenario: &'static ScenarioDefinition,
        arguments: Vec<(String, String)>,
    ) -> ScenarioOutcome {
        self.contexts
            .push(ScenarioContext::new(group, scenario, arguments));
        let depth = self.contexts.len();
        log::debug!(
            "scenario started: {}.{} (depth {depth})",
            group.title(),
            scenario.title()
        );

        let hooks = Arc::clone(&self.hooks);
        let mut error = hooks
            .iter()
            .try_for_each(|hook| catch_panic(|| hook.before_scenario(&mut *self)))
            .err();
        if !self.owns_context(depth) {
            log::error!(
                "scenario context lost by a before hook: {}.{}",
                group.title(),
                scenario.title()
            );
            let error = error.unwrap_or_else(|| ScenarioError::failed(HostError::NoActiveScenario));
            return ScenarioOutcome::Failed(error);
        }
        if error.is_none() {
            error = self.execute_body().err();
        }
        if let Some(ctx) = self.contexts.last_mut() {
            ctx.record_error(error);
        }

        for hook in hooks.iter() {
            let result = catch_panic(|| {
                hook.after_scenario(&mut *self);
                Ok(())
            });
            if let Err(panicked) = result {
                self.record_after_hook_failure(depth, panicked);
            }
        }
        let error = if self.owns_context(depth) {
            self.contexts.pop().and_then(|mut ctx| ctx.take_error())
        } else {
            Some(ScenarioError::failed(HostError::NoActiveScenario))
        };
        let outcome = ScenarioOutcome::from_error(error);
        log::debug!(
            "scenario finished: {}.{} -> {}",
            group.title(),
            scenario.title(),
            outcome_label(&outcome)
        );
        outcome
    }

    fn execute_body(&mut self) -> Result<(), ScenarioError> {
        let Some(ctx) = self.contexts.last_mut() else {
            return Err(ScenarioError::failed(HostError::NoActiveScenario));
        };
        let run = ctx.scenario().run;
        catch_panic(|| run(ctx))
    }

    // A panicking after hook fails a run that would otherwise pass or skip.
    // The remaining after hooks still run so claims are settled.
    fn record_after_hook_failure(&mut self, depth: usize, panicked: ScenarioError) {
        log::error!("after hook panicked: {panicked}");
        let Some(ctx) = depth
            .checked_sub(1)
            .and_then(|top| self.contexts.get_mut(top))
        else {
            return;
        };
        if ctx.error().is_none_or(ScenarioError::is_skip) {
            ctx.record_error(Some(panicked));
        }
    }

    // Contexts above `depth` were pushed by hooks that never cleaned up; a
    // shorter stack means a hook suspended our context without resuming it.
    fn owns_context(&mut self, depth: usize) -> bool {
        if self.contexts.len() > depth {
            log::warn!(
                "discarding {} leaked scenario contexts",
                self.contexts.len() - depth
            );
            self.contexts.truncate(depth);
        }
        self.contexts.len() == depth
    }
}

fn catch_panic<F>(call: F) -> Result<(), ScenarioError>
where
    F: FnOnce() -> Result<(), ScenarioError>,
{
    panic::catch_unwind(AssertUnwindSafe(call)).unwrap_or_else(|payload| {
        Err(ScenarioError::Panicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

fn outcome_label(outcome: &ScenarioOutcome) -> &'static str {
    match outcome {
        ScenarioOutcome::Passed => "passed",
        ScenarioOutcome::Skipped { .. } => "skipped",
        ScenarioOutcome::Failed(_) => "failed",
    }
}

impl ScenarioHost for Worker {
    fn current_scenario(&self) -> Option<&ScenarioContext> {
        self.contexts.last()
    }

    fn current_scenario_mut(&mut self) -> Option<&mut ScenarioContext> {
        self.contexts.last_mut()
    }

    fn suspend_scenario(&mut self) -> Option<ScenarioContext> {
        let suspended = self.contexts.pop();
        if let Some(ctx) = &suspended {
            log::debug!(
                "scenario suspended: {}.{}",
                ctx.metadata().group_title(),
                ctx.metadata().scenario_title()
            );
        }
        suspended
    }

    fn resume_scenario(&mut self, context: ScenarioContext) {
        log::debug!(
            "scenario resumed: {}.{}",
            context.metadata().group_title(),
            context.metadata().scenario_title()
        );
        self.contexts.push(context);
    }

    fn invoke_scenario(
        &mut self,
        group: &'static GroupDefinition,
        scenario: &'static ScenarioDefinition,
    ) -> ScenarioOutcome {
        self.run_scenario(group, scenario, Vec::new())
    }
}
