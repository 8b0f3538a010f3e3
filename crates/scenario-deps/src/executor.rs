//! Exactly-once execution of dependencies on behalf of a calling scenario.
//!
//! The executor consults the registry first and replays recorded outcomes.
//! When the dependency has not run yet it suspends the caller's context,
//! runs the dependency through the host with its full hook lifecycle and
//! resumes the caller. The dependency's own double-execution guard claims and
//! commits its slot, so the executor only reads the registry.

use std::sync::Arc;

use scenario_deps_harness::{HostError, ScenarioHost, ScenarioOutcome};

use crate::config::RacePolicy;
use crate::error::DependencyError;
use crate::id::DependencyId;
use crate::locator::LocatedDependency;
use crate::registry::{DependencyRegistry, Outcome};

/// Runs or replays dependencies.
#[derive(Clone, Debug)]
pub struct DependencyExecutor {
    registry: Arc<DependencyRegistry>,
    race: RacePolicy,
}

impl DependencyExecutor {
    /// Create an executor reading `registry`.
    #[must_use]
    pub fn new(registry: Arc<DependencyRegistry>, race: RacePolicy) -> Self {
        Self { registry, race }
    }

    /// Ensure `target` has run, then report its outcome to the caller.
    ///
    /// # Errors
    ///
    /// - [`DependencyError::Failed`] when the dependency failed now or earlier;
    /// - [`DependencyError::Cycle`] when the dependency is being resolved by
    ///   the calling worker itself;
    /// - [`DependencyError::Skipped`] when it is running elsewhere under
    ///   [`RacePolicy::Skip`], or when its run was skipped;
    /// - [`DependencyError::Invocation`] when no caller context is active.
    pub fn invoke(
        &self,
        host: &mut dyn ScenarioHost,
        target: &LocatedDependency,
    ) -> Result<(), DependencyError> {
        let id = target.id();
        log::info!("invoking dependency: {} ({id})", target.scenario().name);
        if let Some(recorded) = self.recorded(id)? {
            return recorded;
        }

        let caller = host
            .suspend_scenario()
            .ok_or_else(|| DependencyError::Invocation {
                id: id.clone(),
                source: HostError::NoActiveScenario,
            })?;
        let outcome = host.invoke_scenario(target.group(), target.scenario());
        host.resume_scenario(caller);
        log::info!("invoking dependency done: {id}");

        self.resolve(id, outcome)
    }

    // Replay of an outcome recorded before this call, or `None` when the
    // dependency has not been claimed.
    fn recorded(
        &self,
        id: &DependencyId,
    ) -> Result<Option<Result<(), DependencyError>>, DependencyError> {
        loop {
            match self.registry.get(id) {
                None => return Ok(None),
                Some(Outcome::Pending) => {
                    if self.registry.is_claimed_by_current_thread(id) {
                        return Err(DependencyError::Cycle { id: id.clone() });
                    }
                    if self.race == RacePolicy::Skip {
                        log::info!("{id}: already running on another worker; skipping");
                        return Err(DependencyError::Skipped { id: id.clone() });
                    }
                    self.registry.wait_settled(id)?;
                }
                Some(terminal) => return Ok(Some(replay(id, terminal))),
            }
        }
    }

    // The registry's terminal outcome wins; the nested outcome only decides
    // when the run committed nothing.
    fn resolve(&self, id: &DependencyId, outcome: ScenarioOutcome) -> Result<(), DependencyError> {
        match self.registry.get(id) {
            Some(terminal @ (Outcome::Succeeded | Outcome::Failed(_))) => replay(id, terminal),
            Some(Outcome::Pending) | None => match outcome {
                ScenarioOutcome::Passed => Ok(()),
                ScenarioOutcome::Skipped { .. } => {
                    Err(DependencyError::Skipped { id: id.clone() })
                }
                ScenarioOutcome::Failed(cause) => {
                    log::info!("dependency failed with an error: {id}");
                    Err(DependencyError::Failed {
                        id: id.clone(),
                        cause,
                    })
                }
            },
        }
    }
}

fn replay(id: &DependencyId, outcome: Outcome) -> Result<(), DependencyError> {
    match outcome {
        Outcome::Failed(cause) => {
            log::info!("{id}: the dependency was executed and failed");
            Err(DependencyError::Failed {
                id: id.clone(),
                cause,
            })
        }
        Outcome::Succeeded | Outcome::Pending => {
            log::info!("{id}: the dependency was executed and succeeded");
            Ok(())
        }
    }
}
