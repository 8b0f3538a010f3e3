//! Multi-threaded test session.
//!
//! A session expands every group into scheduled runs (one per plain scenario,
//! one per example row of an outline) and drains them with a pool of scoped
//! worker threads. Each worker owns its own context stack; hooks are shared.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::config;
use crate::context::describe;
use crate::definition::{GroupDefinition, ScenarioDefinition, registered_groups};
use crate::error::ScenarioError;
use crate::hook::ScenarioHook;
use crate::metadata::ScenarioMetadata;
use crate::report::{ScenarioRecord, ScenarioStatus, SessionReport};
use crate::worker::{HookList, Worker};

const WORKER_LOST: &str = "the worker thread running this scenario panicked";

struct ScheduledRun {
    index: usize,
    group: &'static GroupDefinition,
    scenario: &'static ScenarioDefinition,
    arguments: Vec<(String, String)>,
    metadata: ScenarioMetadata,
}

impl ScheduledRun {
    fn new(
        index: usize,
        group: &'static GroupDefinition,
        scenario: &'static ScenarioDefinition,
        arguments: Vec<(String, String)>,
    ) -> Self {
        let metadata = describe(group, scenario, arguments.clone());
        Self {
            index,
            group,
            scenario,
            arguments,
            metadata,
        }
    }
}

fn schedule(groups: &[&'static GroupDefinition]) -> VecDeque<ScheduledRun> {
    let mut queue = VecDeque::new();
    for group in groups {
        for scenario in group.scenarios {
            if scenario.is_parameterized() {
                for row in scenario.examples {
                    let arguments = row
                        .iter()
                        .map(|(column, value)| ((*column).to_string(), (*value).to_string()))
                        .collect();
                    queue.push_back(ScheduledRun::new(queue.len(), group, scenario, arguments));
                }
            } else {
                queue.push_back(ScheduledRun::new(queue.len(), group, scenario, Vec::new()));
            }
        }
    }
    queue
}

/// Builder for [`TestSession`].
#[derive(Default)]
pub struct TestSessionBuilder {
    hooks: Vec<Arc<dyn ScenarioHook>>,
    workers: Option<NonZeroUsize>,
}

impl TestSessionBuilder {
    /// Add a lifecycle hook.
    #[must_use]
    pub fn hook<H>(self, hook: H) -> Self
    where
        H: ScenarioHook + 'static,
    {
        self.hook_arc(Arc::new(hook))
    }

    /// Add a lifecycle hook that is already shared.
    #[must_use]
    pub fn hook_arc(mut self, hook: Arc<dyn ScenarioHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Set the number of worker threads. Defaults to
    /// [`config::worker_count`].
    #[must_use]
    pub fn workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Finish the session; hooks are ordered by [`ScenarioHook::order`],
    /// keeping insertion order among equal values.
    #[must_use]
    pub fn build(mut self) -> TestSession {
        self.hooks.sort_by_key(|hook| hook.order());
        TestSession {
            hooks: Arc::from(self.hooks),
            workers: self.workers.unwrap_or_else(config::worker_count),
        }
    }
}

/// A configured set of hooks and workers able to run scenario groups.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use scenario_deps_harness::{
///     GroupDefinition, ScenarioContext, ScenarioDefinition, ScenarioError, TestSession,
/// };
///
/// fn adds(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
///     let first: i64 = ctx.argument("first").unwrap_or("0").parse().unwrap_or(0);
///     assert!(first >= 0);
///     Ok(())
/// }
///
/// static ROWS: [&[(&str, &str)]; 2] = [&[("first", "1")], &[("first", "2")]];
/// static SCENARIOS: [ScenarioDefinition; 1] =
///     [ScenarioDefinition::new("Adds", adds).with_examples(&ROWS)];
/// static GROUP: GroupDefinition = GroupDefinition::new("SessionDoc", &SCENARIOS);
///
/// let session = TestSession::builder().workers(NonZeroUsize::MIN).build();
/// let report = session.run(&[&GROUP]);
/// assert_eq!(report.passed(), 2);
/// ```
pub struct TestSession {
    hooks: HookList,
    workers: NonZeroUsize,
}

impl TestSession {
    /// Start building a session.
    #[must_use]
    pub fn builder() -> TestSessionBuilder {
        TestSessionBuilder::default()
    }

    /// Number of worker threads the session starts.
    #[must_use]
    pub fn worker_count(&self) -> NonZeroUsize {
        self.workers
    }

    /// Run every scenario of `groups`, returning records in scheduling order.
    ///
    /// Every scheduled run gets a record. A run whose worker thread died
    /// before reporting it is recorded as failed.
    #[must_use]
    pub fn run(&self, groups: &[&'static GroupDefinition]) -> SessionReport {
        let queue = schedule(groups);
        let total = queue.len();
        let workers = self.workers.get().min(total.max(1));
        log::debug!("running {total} scenarios on {workers} workers");
        let described: Vec<ScenarioMetadata> =
            queue.iter().map(|run| run.metadata.clone()).collect();
        let queue = Mutex::new(queue);
        let statuses = Mutex::new((0..total).map(|_| None).collect::<Vec<_>>());

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| scope.spawn(|| self.drain(&queue, &statuses)))
                .collect();
            for handle in handles {
                if let Err(payload) = handle.join() {
                    log::error!(
                        "worker thread panicked: {}",
                        crate::panic::panic_message(payload.as_ref())
                    );
                }
            }
        });

        let statuses = statuses.into_inner().unwrap_or_else(PoisonError::into_inner);
        let records = described
            .into_iter()
            .zip(statuses)
            .map(|(metadata, status)| {
                let status = status.unwrap_or_else(|| {
                    ScenarioStatus::Failed(ScenarioError::Panicked {
                        message: WORKER_LOST.to_owned(),
                    })
                });
                ScenarioRecord::new(metadata, status)
            })
            .collect();
        SessionReport::new(records)
    }

    /// Run every group registered with [`register_group!`](crate::register_group).
    #[must_use]
    pub fn run_registered(&self) -> SessionReport {
        self.run(&registered_groups())
    }

    fn drain(
        &self,
        queue: &Mutex<VecDeque<ScheduledRun>>,
        statuses: &Mutex<Vec<Option<ScenarioStatus>>>,
    ) {
        let mut worker = Worker::new(Arc::clone(&self.hooks));
        loop {
            let next = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(run) = next else {
                break;
            };
            let ScheduledRun {
                index,
                group,
                scenario,
                arguments,
                ..
            } = run;
            let status = ScenarioStatus::from(worker.run_scenario(group, scenario, arguments));
            if let Some(slot) = statuses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_mut(index)
            {
                *slot = Some(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScenarioContext;
    use crate::hook::ScenarioHost;

    fn passes(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
        Ok(())
    }

    fn skips(_: &mut ScenarioContext) -> Result<(), ScenarioError> {
        Err(ScenarioError::skip("not yet"))
    }

    fn checks_row(ctx: &mut ScenarioContext) -> Result<(), ScenarioError> {
        let total: i64 = ctx
            .argument("total")
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        assert!(total > 0, "total should be positive");
        Ok(())
    }

    static ROWS: [crate::ExampleRow; 2] = [&[("total", "3")], &[("total", "-1")]];
    static SCENARIOS: [ScenarioDefinition; 3] = [
        ScenarioDefinition::new("Passes", passes),
        ScenarioDefinition::new("Skips", skips),
        ScenarioDefinition::new("Rows", checks_row).with_examples(&ROWS),
    ];
    static GROUP: GroupDefinition = GroupDefinition::new("SessionFeature", &SCENARIOS);

    struct Ordered(i32);

    impl ScenarioHook for Ordered {
        fn order(&self) -> i32 {
            self.0
        }

        fn before_scenario(&self, _: &mut dyn ScenarioHost) -> Result<(), ScenarioError> {
            Ok(())
        }
    }

    #[test]
    fn outlines_expand_per_row() {
        let session = TestSession::builder()
            .workers(NonZeroUsize::MIN.saturating_add(1))
            .build();
        let report = session.run(&[&GROUP]);
        let labels: Vec<_> = report
            .records()
            .iter()
            .map(|record| record.status().label())
            .collect();
        assert_eq!(labels, ["passed", "skipped", "passed", "failed"]);
        assert_eq!(
            report
                .records()
                .last()
                .and_then(|record| record.metadata().argument("total")),
            Some("-1")
        );
    }

    #[test]
    fn builder_sorts_hooks() {
        let session = TestSession::builder()
            .hook(Ordered(3))
            .hook(Ordered(-2))
            .hook(Ordered(0))
            .workers(NonZeroUsize::MIN)
            .build();
        let orders: Vec<_> = session.hooks.iter().map(|hook| hook.order()).collect();
        assert_eq!(orders, [-2, 0, 3]);
    }

    #[test]
    fn empty_run_reports_nothing() {
        let report = TestSession::builder()
            .workers(NonZeroUsize::MIN)
            .build()
            .run(&[]);
        assert!(report.records().is_empty());
        assert!(report.is_success());
    }
}
