//! Lifecycle hooks wiring the engine into a session.

use std::ptr;

use scenario_deps_harness::{ScenarioError, ScenarioHook, ScenarioHost};

use crate::declaration::{DependencyDeclaration, carries_marker};
use crate::error::DependencyError;
use crate::executor::DependencyExecutor;
use crate::id::DependencyId;
use crate::locator::locate;
use crate::policy::{ClaimTicket, ReplayPolicy};

/// Hook order of [`DoubleExecutionGuard`].
pub const GUARD_ORDER: i32 = -2;

/// Hook order of [`DependencyCheck`].
pub const CHECK_ORDER: i32 = -1;

/// Claims every dependency-eligible scenario before it runs and commits its
/// outcome afterwards, whether the scenario was scheduled directly or
/// invoked as a dependency.
#[derive(Clone, Debug)]
pub struct DoubleExecutionGuard {
    policy: ReplayPolicy,
}

impl DoubleExecutionGuard {
    /// Guard claims through `policy`.
    #[must_use]
    pub fn new(policy: ReplayPolicy) -> Self {
        Self { policy }
    }
}

impl ScenarioHook for DoubleExecutionGuard {
    fn order(&self) -> i32 {
        GUARD_ORDER
    }

    fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
        let Some(ctx) = host.current_scenario_mut() else {
            return Ok(());
        };
        let metadata = ctx.metadata();
        if !carries_marker(metadata.tags()) {
            return Ok(());
        }
        if metadata.is_parameterized() {
            return Err(DependencyError::InvalidTarget {
                name: ctx.scenario().name.to_owned(),
            }
            .into());
        }
        let ticket = self.policy.on_claim(&DependencyId::from_metadata(metadata))?;
        ctx.insert(ticket);
        Ok(())
    }

    fn after_scenario(&self, host: &mut dyn ScenarioHost) {
        let Some(ctx) = host.current_scenario_mut() else {
            return;
        };
        if let Some(ticket) = ctx.remove::<ClaimTicket>() {
            self.policy.on_commit(ticket, ctx.error());
        }
    }
}

/// Resolves a scenario's `dependsOn:` declaration before its body runs.
#[derive(Clone, Debug)]
pub struct DependencyCheck {
    executor: DependencyExecutor,
}

impl DependencyCheck {
    /// Run dependencies through `executor`.
    #[must_use]
    pub fn new(executor: DependencyExecutor) -> Self {
        Self { executor }
    }
}

impl ScenarioHook for DependencyCheck {
    fn order(&self) -> i32 {
        CHECK_ORDER
    }

    fn before_scenario(&self, host: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
        let Some(ctx) = host.current_scenario() else {
            return Ok(());
        };
        let Some(declaration) = DependencyDeclaration::find(ctx.metadata().tags()) else {
            return Ok(());
        };
        let target = locate(&declaration, ctx.group())?;
        if ptr::eq(target.scenario(), ctx.scenario()) {
            // A group-level declaration also lands on its own target.
            log::debug!("{} does not depend on itself", target.id());
            return Ok(());
        }
        self.executor.invoke(host, &target)?;
        Ok(())
    }
}
