//! Inter-scenario dependencies with exactly-once execution and replay.
//!
//! A scenario tagged `dependsOn:<name>` needs the sibling scenario `<name>`
//! of its group to have run first. The sibling must carry the `dependency`
//! tag. It runs at most once per session; every later caller observes the
//! recorded outcome instead: success lets the caller proceed, failure fails
//! the caller with the original error as its cause.
//!
//! The engine plugs into `scenario-deps-harness` through two lifecycle hooks
//! built by [`DependencyPlugin`]:
//!
//! - [`DoubleExecutionGuard`] claims each dependency-eligible scenario in the
//!   session's [`DependencyRegistry`] and commits its outcome afterwards;
//! - [`DependencyCheck`] resolves the declaration, then runs or replays the
//!   dependency through the [`DependencyExecutor`].

pub mod config;
mod declaration;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
mod error;
mod executor;
mod hooks;
mod id;
mod locator;
mod plugin;
mod policy;
mod registry;

pub use config::RacePolicy;
pub use declaration::{DEPENDENCY_TAG, DEPENDS_ON_PREFIX, DependencyDeclaration, carries_marker};
pub use error::DependencyError;
pub use executor::DependencyExecutor;
pub use hooks::{CHECK_ORDER, DependencyCheck, DoubleExecutionGuard, GUARD_ORDER};
pub use id::DependencyId;
pub use locator::{LocatedDependency, eligible_dependencies, is_marked, locate, locate_by_id};
pub use plugin::DependencyPlugin;
pub use policy::{ALREADY_SUCCEEDED, ClaimTicket, ReplayPolicy};
pub use registry::{DependencyRegistry, Outcome};
