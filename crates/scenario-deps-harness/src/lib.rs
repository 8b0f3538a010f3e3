//! Reference host harness for scenario dependency resolution.
//!
//! The harness groups scenarios into statically defined groups, runs them on
//! a pool of worker threads and reports their outcomes. It exposes the host
//! surface dependency plugins need: per-scenario contexts that know their
//! enclosing group, ordered lifecycle hooks, suspension and resumption of the
//! current context, and direct invocation of another scenario with its full
//! lifecycle.

pub mod config;
mod context;
mod definition;
mod error;
mod hook;
mod metadata;
mod panic;
pub mod report;
mod session;
mod worker;

pub use context::ScenarioContext;
pub use definition::{
    ExampleRow, GroupDefinition, GroupRegistration, ScenarioDefinition, ScenarioFn,
    find_registered_group, registered_groups,
};
pub use error::{HostError, ScenarioError, ScenarioOutcome};
pub use hook::{ScenarioHook, ScenarioHost};
#[doc(hidden)]
pub use inventory::submit;
pub use metadata::{ScenarioMetadata, normalise_tag};
pub use panic::panic_message;
pub use report::{ScenarioRecord, ScenarioStatus, SessionReport};
pub use session::{TestSession, TestSessionBuilder};
pub use worker::{HookList, Worker};
