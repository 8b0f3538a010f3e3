//! Installation of the dependency hooks into a session.

use std::sync::Arc;

use scenario_deps_harness::TestSessionBuilder;

use crate::config::{self, RacePolicy};
use crate::executor::DependencyExecutor;
use crate::hooks::{DependencyCheck, DoubleExecutionGuard};
use crate::policy::ReplayPolicy;
use crate::registry::DependencyRegistry;

/// Builds the guard and check hooks around one shared registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use scenario_deps::{DependencyPlugin, DependencyRegistry, RacePolicy};
/// use scenario_deps_harness::TestSession;
///
/// let registry = Arc::new(DependencyRegistry::new());
/// let plugin = DependencyPlugin::new(Arc::clone(&registry)).with_race_policy(RacePolicy::Skip);
/// let session = plugin.install(TestSession::builder()).build();
/// assert!(session.run(&[]).is_success());
/// assert!(registry.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct DependencyPlugin {
    registry: Arc<DependencyRegistry>,
    race: RacePolicy,
}

impl DependencyPlugin {
    /// Plugin over `registry` using the configured [`config::race_policy`].
    #[must_use]
    pub fn new(registry: Arc<DependencyRegistry>) -> Self {
        Self {
            registry,
            race: config::race_policy(),
        }
    }

    /// Replace the race policy.
    #[must_use]
    pub fn with_race_policy(mut self, race: RacePolicy) -> Self {
        self.race = race;
        self
    }

    /// The shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<DependencyRegistry> {
        &self.registry
    }

    /// The race policy the hooks apply.
    #[must_use]
    pub fn race_policy(&self) -> RacePolicy {
        self.race
    }

    /// The double-execution guard hook.
    #[must_use]
    pub fn guard(&self) -> DoubleExecutionGuard {
        DoubleExecutionGuard::new(ReplayPolicy::new(Arc::clone(&self.registry), self.race))
    }

    /// The dependency check hook.
    #[must_use]
    pub fn check(&self) -> DependencyCheck {
        DependencyCheck::new(DependencyExecutor::new(
            Arc::clone(&self.registry),
            self.race,
        ))
    }

    /// Add both hooks to `builder`.
    #[must_use]
    pub fn install(&self, builder: TestSessionBuilder) -> TestSessionBuilder {
        log::debug!("installing dependency hooks (race policy: {})", self.race);
        builder.hook(self.guard()).hook(self.check())
    }
}
