//! Claim and replay rules for dependency-eligible scenarios.

use std::sync::Arc;

use scenario_deps_harness::ScenarioError;

use crate::config::RacePolicy;
use crate::error::DependencyError;
use crate::id::DependencyId;
use crate::registry::{DependencyRegistry, Outcome};

/// Message of the skip replayed for a dependency that already succeeded.
pub const ALREADY_SUCCEEDED: &str = "the dependency was already executed and succeeded";

/// Proof that the current run claimed its dependency slot. Stored in the
/// scenario context by the claimant and consumed when committing.
#[derive(Debug, PartialEq, Eq)]
pub struct ClaimTicket {
    id: DependencyId,
}

impl ClaimTicket {
    /// Identity the ticket was issued for.
    #[must_use]
    pub fn id(&self) -> &DependencyId {
        &self.id
    }
}

/// Decides whether a dependency-eligible scenario may run and replays the
/// recorded outcome when it may not.
#[derive(Clone, Debug)]
pub struct ReplayPolicy {
    registry: Arc<DependencyRegistry>,
    race: RacePolicy,
}

impl ReplayPolicy {
    /// Create a policy over `registry`.
    #[must_use]
    pub fn new(registry: Arc<DependencyRegistry>, race: RacePolicy) -> Self {
        Self { registry, race }
    }

    /// The shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<DependencyRegistry> {
        &self.registry
    }

    /// Policy applied when the slot is claimed by another worker.
    #[must_use]
    pub fn race_policy(&self) -> RacePolicy {
        self.race
    }

    /// Claim `id` for the current run.
    ///
    /// # Errors
    ///
    /// When the dependency is already claimed the recorded outcome is
    /// replayed instead: a skip for a success, [`DependencyError::PreviouslyFailed`]
    /// for a failure. A slot still running elsewhere is awaited under
    /// [`RacePolicy::Wait`] and skipped under [`RacePolicy::Skip`]; a slot held
    /// by the current worker fails with [`DependencyError::Cycle`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use scenario_deps::{DependencyId, DependencyRegistry, RacePolicy, ReplayPolicy};
    ///
    /// let policy = ReplayPolicy::new(Arc::new(DependencyRegistry::new()), RacePolicy::Wait);
    /// let id = DependencyId::new("Calculator", "Add two numbers");
    ///
    /// let ticket = policy.on_claim(&id).unwrap();
    /// policy.on_commit(ticket, None);
    ///
    /// let replay = policy.on_claim(&id).unwrap_err();
    /// assert!(replay.is_skip());
    /// ```
    pub fn on_claim(&self, id: &DependencyId) -> Result<ClaimTicket, ScenarioError> {
        loop {
            if self.registry.try_claim(id) {
                return Ok(ClaimTicket { id: id.clone() });
            }
            match self.registry.get(id) {
                // Released between the claim attempt and the read.
                None => {}
                Some(Outcome::Succeeded) => {
                    log::info!("{id}: {ALREADY_SUCCEEDED}");
                    return Err(ScenarioError::skip(ALREADY_SUCCEEDED));
                }
                Some(Outcome::Failed(cause)) => {
                    log::info!("{id}: the dependency was already executed and failed");
                    return Err(DependencyError::PreviouslyFailed {
                        id: id.clone(),
                        cause,
                    }
                    .into());
                }
                Some(Outcome::Pending) => {
                    if self.registry.is_claimed_by_current_thread(id) {
                        return Err(DependencyError::Cycle { id: id.clone() }.into());
                    }
                    match self.race {
                        RacePolicy::Skip => {
                            log::info!("{id}: already running on another worker; skipping");
                            return Err(DependencyError::Skipped { id: id.clone() }.into());
                        }
                        RacePolicy::Wait => {
                            self.registry.wait_settled(id)?;
                        }
                    }
                }
            }
        }
    }

    /// Record the outcome of the run that holds `ticket`.
    ///
    /// A skipped run releases the slot so the dependency is never recorded
    /// as failed for being ignored. Terminal slots are never overwritten.
    pub fn on_commit(&self, ticket: ClaimTicket, error: Option<&ScenarioError>) {
        let ClaimTicket { id } = ticket;
        if error.is_some_and(ScenarioError::is_skip) {
            self.registry.release(&id);
            return;
        }
        if !self.registry.commit(&id, error.cloned()) {
            log::warn!("dependency {id} was already settled; outcome not recorded");
        }
    }
}
