//! Session-wide store of dependency outcomes.
//!
//! Each dependency identity owns one slot. A slot is created `Pending` by the
//! single caller that wins the claim, becomes terminal on commit and never
//! changes afterwards. A pending slot may instead be released when its run
//! ended in a benign skip, which lets a later caller claim it again.
//!
//! All operations touch one key under one mutex; a condition variable wakes
//! callers waiting for a pending slot to settle.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use hashbrown::HashMap;
use scenario_deps_harness::ScenarioError;

use crate::error::DependencyError;
use crate::id::DependencyId;

/// Observable state of a dependency slot.
#[derive(Clone, Debug)]
pub enum Outcome {
    /// Claimed and still running.
    Pending,
    /// Ran to completion.
    Succeeded,
    /// Ran and failed with the stored error.
    Failed(ScenarioError),
}

impl Outcome {
    /// Returns `true` once the dependency has finished.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Lowercase label of the state.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
enum Slot {
    Pending { claimant: ThreadId },
    Succeeded,
    Failed(ScenarioError),
}

impl Slot {
    fn outcome(&self) -> Outcome {
        match self {
            Self::Pending { .. } => Outcome::Pending,
            Self::Succeeded => Outcome::Succeeded,
            Self::Failed(error) => Outcome::Failed(error.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    slots: HashMap<DependencyId, Slot>,
    // Slot each blocked thread is waiting on.
    waiting: HashMap<ThreadId, DependencyId>,
}

impl State {
    // Follows claimant -> awaited slot -> claimant links from `id`; reaching
    // `me` means waiting would never end.
    fn closes_cycle(&self, me: ThreadId, id: &DependencyId) -> bool {
        let mut current = id;
        for _ in 0..=self.waiting.len() {
            let Some(Slot::Pending { claimant }) = self.slots.get(current) else {
                return false;
            };
            if *claimant == me {
                return true;
            }
            let Some(next) = self.waiting.get(claimant) else {
                return false;
            };
            current = next;
        }
        false
    }
}

/// Thread-safe map from dependency identity to outcome.
///
/// The registry is owned by a test session and shared with the hooks that
/// need it; nothing in this crate keeps a global instance.
///
/// # Examples
///
/// ```
/// use scenario_deps::{DependencyId, DependencyRegistry, Outcome};
///
/// let registry = DependencyRegistry::new();
/// let id = DependencyId::new("Calculator", "Add two numbers");
/// assert!(registry.try_claim(&id));
/// assert!(!registry.try_claim(&id));
/// assert!(registry.commit(&id, None));
/// assert!(matches!(registry.get(&id), Some(Outcome::Succeeded)));
/// ```
#[derive(Debug, Default)]
pub struct DependencyRegistry {
    state: Mutex<State>,
    settled: Condvar,
}

impl DependencyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a pending slot for `id` owned by the calling thread. Returns
    /// `true` only for the call that created the slot.
    pub fn try_claim(&self, id: &DependencyId) -> bool {
        let claimant = thread::current().id();
        let mut state = self.lock();
        match state.slots.entry(id.clone()) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(Slot::Pending { claimant });
                log::debug!("dependency claimed: {id}");
                true
            }
        }
    }

    /// Snapshot of the slot for `id`, if any.
    #[must_use]
    pub fn get(&self, id: &DependencyId) -> Option<Outcome> {
        self.lock().slots.get(id).map(Slot::outcome)
    }

    /// Settle a pending slot: succeeded without `error`, failed otherwise.
    /// Returns `false` and leaves the registry untouched when the slot is
    /// missing or already terminal.
    pub fn commit(&self, id: &DependencyId, error: Option<ScenarioError>) -> bool {
        let mut state = self.lock();
        let Some(slot) = state.slots.get_mut(id) else {
            return false;
        };
        if !matches!(slot, Slot::Pending { .. }) {
            return false;
        }
        *slot = match error {
            None => Slot::Succeeded,
            Some(error) => Slot::Failed(error),
        };
        log::debug!("dependency committed: {id}");
        drop(state);
        self.settled.notify_all();
        true
    }

    /// Remove a pending slot so the dependency can be claimed again.
    /// Terminal slots are kept; returns `true` when a slot was removed.
    pub fn release(&self, id: &DependencyId) -> bool {
        let mut state = self.lock();
        if !matches!(state.slots.get(id), Some(Slot::Pending { .. })) {
            return false;
        }
        state.slots.remove(id);
        log::debug!("dependency released: {id}");
        drop(state);
        self.settled.notify_all();
        true
    }

    /// Block while the slot for `id` is pending.
    ///
    /// Returns the terminal outcome, or `None` when the slot is absent or was
    /// released while waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DependencyError::Cycle`] instead of waiting when the slot is
    /// claimed by the calling thread or by a thread that is itself waiting,
    /// directly or transitively, on a slot held by the calling thread.
    pub fn wait_settled(&self, id: &DependencyId) -> Result<Option<Outcome>, DependencyError> {
        let me = thread::current().id();
        let mut state = self.lock();
        loop {
            match state.slots.get(id) {
                None => return Ok(None),
                Some(Slot::Pending { .. }) => {
                    if state.closes_cycle(me, id) {
                        return Err(DependencyError::Cycle { id: id.clone() });
                    }
                    log::debug!("waiting for dependency: {id}");
                    state.waiting.insert(me, id.clone());
                    state = self
                        .settled
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                    state.waiting.remove(&me);
                }
                Some(slot) => return Ok(Some(slot.outcome())),
            }
        }
    }

    /// Returns `true` when `id` is pending and was claimed by the calling
    /// thread.
    #[must_use]
    pub fn is_claimed_by_current_thread(&self, id: &DependencyId) -> bool {
        let me = thread::current().id();
        matches!(
            self.lock().slots.get(id),
            Some(Slot::Pending { claimant }) if *claimant == me
        )
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    /// Returns `true` when no dependency has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    /// All slots, sorted by identity.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(DependencyId, Outcome)> {
        let mut entries: Vec<_> = self
            .lock()
            .slots
            .iter()
            .map(|(id, slot)| (id.clone(), slot.outcome()))
            .collect();
        entries.sort_by(|(left, _), (right, _)| left.cmp(right));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;
    use std::time::Duration;

    #[fixture]
    fn registry() -> DependencyRegistry {
        DependencyRegistry::new()
    }

    fn id(name: &str) -> DependencyId {
        DependencyId::new("Calculator", name)
    }

    fn failure() -> ScenarioError {
        ScenarioError::Panicked {
            message: "the result should be 99".into(),
        }
    }

    #[rstest]
    fn commit_is_idempotent(registry: DependencyRegistry) {
        let add = id("Add");
        assert!(!registry.commit(&add, None), "missing slots are not created");
        assert!(registry.try_claim(&add));
        assert!(registry.commit(&add, Some(failure())));
        assert!(!registry.commit(&add, None));
        assert!(matches!(registry.get(&add), Some(Outcome::Failed(_))));
    }

    #[rstest]
    fn release_only_drops_pending_slots(registry: DependencyRegistry) {
        let add = id("Add");
        assert!(registry.try_claim(&add));
        assert!(registry.release(&add));
        assert!(registry.get(&add).is_none());
        assert!(registry.try_claim(&add), "released slots can be claimed again");
        assert!(registry.commit(&add, None));
        assert!(!registry.release(&add));
        assert!(matches!(registry.get(&add), Some(Outcome::Succeeded)));
    }

    #[rstest]
    fn own_claim_is_a_cycle(registry: DependencyRegistry) {
        let add = id("Add");
        assert!(registry.try_claim(&add));
        assert!(registry.is_claimed_by_current_thread(&add));
        assert!(matches!(
            registry.wait_settled(&add),
            Err(DependencyError::Cycle { .. })
        ));
    }

    #[rstest]
    fn absent_slot_settles_immediately(registry: DependencyRegistry) {
        assert!(matches!(registry.wait_settled(&id("Missing")), Ok(None)));
    }

    #[test]
    fn waiter_observes_committed_outcome() {
        let registry = Arc::new(DependencyRegistry::new());
        let add = id("Add");
        assert!(registry.try_claim(&add));
        let waiter = {
            let registry = Arc::clone(&registry);
            let add = add.clone();
            thread::spawn(move || {
                assert!(!registry.is_claimed_by_current_thread(&add));
                registry.wait_settled(&add)
            })
        };
        thread::sleep(Duration::from_millis(20));
        assert!(registry.commit(&add, Some(failure())));
        let Ok(settled) = waiter.join() else {
            panic!("waiter thread panicked");
        };
        assert!(matches!(settled, Ok(Some(Outcome::Failed(_)))));
    }

    #[test]
    fn crossed_waits_report_a_cycle() {
        let registry = Arc::new(DependencyRegistry::new());
        let first = id("First");
        let second = id("Second");
        assert!(registry.try_claim(&first));
        let other = {
            let registry = Arc::clone(&registry);
            let first = first.clone();
            let second = second.clone();
            thread::spawn(move || {
                assert!(registry.try_claim(&second));
                let result = registry.wait_settled(&first);
                registry.commit(&second, None);
                result
            })
        };
        // Wait until the other thread is blocked on `first`.
        while registry.lock().waiting.is_empty() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(
            registry.wait_settled(&second),
            Err(DependencyError::Cycle { .. })
        ));
        assert!(registry.commit(&first, None));
        let Ok(result) = other.join() else {
            panic!("claimant thread panicked");
        };
        assert!(matches!(result, Ok(Some(Outcome::Succeeded))));
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        let registry = Arc::new(DependencyRegistry::new());
        let add = id("Add");
        let winners: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| usize::from(registry.try_claim(&add))))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_default())
                .sum()
        });
        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }

    #[rstest]
    fn snapshot_is_sorted(registry: DependencyRegistry) {
        for name in ["b", "a", "c"] {
            registry.try_claim(&id(name));
        }
        let ids: Vec<_> = registry
            .snapshot()
            .into_iter()
            .map(|(id, _)| id.as_str().to_owned())
            .collect();
        assert_eq!(ids, ["Calculator.a", "Calculator.b", "Calculator.c"]);
        assert!(!registry.is_empty());
    }
}
