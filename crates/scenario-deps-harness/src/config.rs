//! Runtime configuration for the harness.
//!
//! The module exposes the number of worker threads a [`TestSession`] uses
//! when the builder does not set one explicitly. The value is read from the
//! `SCENARIO_DEPS_WORKERS` environment variable unless an in-process override
//! is installed.
//!
//! [`TestSession`]: crate::TestSession

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// Environment variable holding the default worker count.
pub const WORKERS_ENV: &str = "SCENARIO_DEPS_WORKERS";

const OVERRIDE_UNSET: usize = 0;

static WORKERS_OVERRIDE: AtomicUsize = AtomicUsize::new(OVERRIDE_UNSET);

fn parse_workers(value: &str) -> Option<NonZeroUsize> {
    value.trim().parse::<NonZeroUsize>().ok()
}

fn env_workers() -> Option<NonZeroUsize> {
    std::env::var(WORKERS_ENV)
        .ok()
        .as_deref()
        .and_then(parse_workers)
}

fn override_state() -> Option<NonZeroUsize> {
    NonZeroUsize::new(WORKERS_OVERRIDE.load(Ordering::Relaxed))
}

/// Determine how many worker threads a session should start.
///
/// Falls back to the available parallelism of the machine, and to a single
/// worker when that cannot be queried.
#[must_use]
pub fn worker_count() -> NonZeroUsize {
    override_state()
        .or_else(env_workers)
        .or_else(|| thread::available_parallelism().ok())
        .unwrap_or(NonZeroUsize::MIN)
}

/// Override the worker count for the current process.
pub fn set_worker_count(workers: NonZeroUsize) {
    WORKERS_OVERRIDE.store(workers.get(), Ordering::Relaxed);
}

/// Remove any in-process override of the worker count.
pub fn clear_worker_count_override() {
    WORKERS_OVERRIDE.store(OVERRIDE_UNSET, Ordering::Relaxed);
}
