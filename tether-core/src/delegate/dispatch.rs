//! Delegate Implementation
//!
//! A [`Delegate`] owns one ordered listener list per [`Priority`] partition
//! and dispatches an argument through them.
//!
//! # Dispatch Rules
//!
//! 1. Partitions run in the fixed order of [`Priority::ALL`].
//!
//! 2. Inside a partition, listeners run in attachment order.
//!
//! 3. A listener returning [`Flow::Stop`] ends the dispatch; the raw outcome
//!    is `false`. If every listener continues, the raw outcome is `true`.
//!
//! 4. The delegate reports `policy.convert(raw_outcome)`.
//!
//! # Re-entrancy
//!
//! The listener lists are never locked while a listener runs. Listeners may
//! attach, detach, or fire the same delegate again. The dispatch cursor
//! remembers the id of the last visited listener rather than an index, so
//! removals never cause a skip or a second visit, and listeners appended to
//! a partition that has not finished yet are reached in the same dispatch.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::listener::{FnListener, Flow, Listener, ListenerId};
use super::priority::{Priority, ReturnPolicy};
use crate::error::Result;

struct Entry<A> {
    id: ListenerId,
    listener: Arc<dyn Listener<A>>,
}

impl<A> Clone for Entry<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: Arc::clone(&self.listener),
        }
    }
}

struct DelegateState<A> {
    /// One list per partition, each sorted by id (= attachment order).
    partitions: [Vec<Entry<A>>; Priority::COUNT],
    policy: ReturnPolicy,
}

/// An ordered, priority-partitioned, short-circuiting listener collection.
///
/// Cloning a delegate yields another handle to the same listener lists.
/// A delegate is itself a [`Listener`], so delegates compose.
///
/// # Example
///
/// ```rust,ignore
/// let clicked: Delegate<u32> = Delegate::new();
/// clicked.attach_fn(Priority::User, |button| {
///     println!("button {button}");
///     Ok(Flow::Continue)
/// });
/// assert!(clicked.exec(&1)?);
/// ```
pub struct Delegate<A: 'static> {
    inner: Arc<Mutex<DelegateState<A>>>,
}

impl<A: 'static> Delegate<A> {
    /// Create an empty delegate with the default [`ReturnPolicy`].
    pub fn new() -> Self {
        Self::with_policy(ReturnPolicy::default())
    }

    /// Create an empty delegate with the given return-value policy.
    pub fn with_policy(policy: ReturnPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DelegateState {
                partitions: std::array::from_fn(|_| Vec::new()),
                policy,
            })),
        }
    }

    /// Current return-value policy.
    pub fn policy(&self) -> ReturnPolicy {
        self.inner.lock().policy
    }

    /// Replace the return-value policy.
    pub fn set_policy(&self, policy: ReturnPolicy) {
        self.inner.lock().policy = policy;
    }

    /// Attach a shared listener at the end of `priority`'s partition.
    pub fn attach(&self, priority: Priority, listener: Arc<dyn Listener<A>>) -> ListenerId {
        let mut state = self.inner.lock();
        // Allocated under the lock so ids stay sorted inside each partition.
        let id = ListenerId::next();
        state.partitions[priority.index()].push(Entry { id, listener });
        id
    }

    /// Attach an owned listener.
    pub fn attach_listener<L>(&self, priority: Priority, listener: L) -> ListenerId
    where
        L: Listener<A> + 'static,
    {
        self.attach(priority, Arc::new(listener))
    }

    /// Attach a closure as a listener.
    pub fn attach_fn<F>(&self, priority: Priority, f: F) -> ListenerId
    where
        F: Fn(&A) -> Result<Flow> + Send + Sync + 'static,
    {
        self.attach_listener(priority, FnListener::new(f))
    }

    /// Remove the listener attached under `id`.
    ///
    /// Returns `false` if no such listener is attached.
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut state = self.inner.lock();
        for partition in state.partitions.iter_mut() {
            if let Some(pos) = partition.iter().position(|e| e.id == id) {
                partition.remove(pos);
                return true;
            }
        }
        false
    }

    /// Remove the first attachment of `listener`, compared by identity.
    pub fn detach_listener(&self, listener: &Arc<dyn Listener<A>>) -> bool {
        let target = Arc::as_ptr(listener).cast::<()>();
        let mut state = self.inner.lock();
        for partition in state.partitions.iter_mut() {
            if let Some(pos) = partition
                .iter()
                .position(|e| Arc::as_ptr(&e.listener).cast::<()>() == target)
            {
                partition.remove(pos);
                return true;
            }
        }
        false
    }

    /// Whether a listener is attached under `id`.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.inner
            .lock()
            .partitions
            .iter()
            .any(|p| p.iter().any(|e| e.id == id))
    }

    /// Total number of attached listeners.
    pub fn len(&self) -> usize {
        self.inner.lock().partitions.iter().map(Vec::len).sum()
    }

    /// Number of listeners in one partition.
    pub fn len_in(&self, priority: Priority) -> usize {
        self.inner.lock().partitions[priority.index()].len()
    }

    /// Whether no listener is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every listener.
    pub fn clear(&self) {
        for partition in self.inner.lock().partitions.iter_mut() {
            partition.clear();
        }
    }

    /// Find a listener in `priority`'s partition.
    ///
    /// `predicate` runs with the delegate locked and must not call back into
    /// this delegate.
    pub fn find<P>(&self, priority: Priority, predicate: P) -> Option<Arc<dyn Listener<A>>>
    where
        P: Fn(&dyn Listener<A>) -> bool,
    {
        self.inner.lock().partitions[priority.index()]
            .iter()
            .find(|e| predicate(e.listener.as_ref()))
            .map(|e| Arc::clone(&e.listener))
    }

    /// Whether both handles refer to the same delegate.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Dispatch `args` and return the policy-converted outcome.
    ///
    /// An error from a listener aborts the dispatch and is returned as-is.
    pub fn exec(&self, args: &A) -> Result<bool> {
        let completed = self.dispatch(args)?;
        Ok(self.policy().convert(completed))
    }

    /// Run every partition and report whether the dispatch completed.
    fn dispatch(&self, args: &A) -> Result<bool> {
        for priority in Priority::ALL {
            let mut cursor = None;
            while let Some(entry) = self.next_after(priority, cursor) {
                cursor = Some(entry.id);
                let flow = entry.listener.call(args)?;
                if flow.deletes_self() {
                    tracing::trace!(listener = ?entry.id, ?priority, "listener deleted itself");
                    self.detach(entry.id);
                }
                if !flow.continues() {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// The first listener of `priority` attached after `cursor`.
    fn next_after(&self, priority: Priority, cursor: Option<ListenerId>) -> Option<Entry<A>> {
        let state = self.inner.lock();
        let partition = &state.partitions[priority.index()];
        let start = match cursor {
            Some(last) => partition.partition_point(|e| e.id <= last),
            None => 0,
        };
        partition.get(start).cloned()
    }
}

impl<A: 'static> Listener<A> for Delegate<A> {
    fn call(&self, args: &A) -> Result<Flow> {
        self.exec(args).map(Flow::from)
    }
}

impl<A: 'static> Default for Delegate<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Clone for Delegate<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: 'static> fmt::Debug for Delegate<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        let counts: Vec<(Priority, usize)> = Priority::ALL
            .iter()
            .map(|p| (*p, state.partitions[p.index()].len()))
            .collect();
        f.debug_struct("Delegate")
            .field("policy", &state.policy)
            .field("listeners", &counts)
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records the order in which labelled listeners run.
    fn recorder(
        delegate: &Delegate<()>,
        log: &Arc<Mutex<Vec<&'static str>>>,
        priority: Priority,
        label: &'static str,
        flow: Flow,
    ) -> ListenerId {
        let log = Arc::clone(log);
        delegate.attach_fn(priority, move |_| {
            log.lock().push(label);
            Ok(flow)
        })
    }

    #[test]
    fn stop_short_circuits_dispatch() {
        let delegate = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&delegate, &log, Priority::User, "first", Flow::Continue);
        recorder(&delegate, &log, Priority::User, "second", Flow::Stop);
        recorder(&delegate, &log, Priority::User, "third", Flow::Continue);

        assert!(!delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["first", "second"]);
    }

    #[test]
    fn stop_also_skips_later_partitions() {
        let delegate = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&delegate, &log, Priority::Tail, "tail", Flow::Continue);
        recorder(&delegate, &log, Priority::ArgumentGuard, "guard", Flow::Stop);

        assert!(!delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["guard"]);
    }

    #[test]
    fn partitions_run_in_fixed_order() {
        let delegate = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&delegate, &log, Priority::PostUtility, "post-1", Flow::Continue);
        recorder(&delegate, &log, Priority::User, "user-1", Flow::Continue);
        recorder(&delegate, &log, Priority::ArgumentGuard, "guard-1", Flow::Continue);
        recorder(&delegate, &log, Priority::User, "user-2", Flow::Continue);
        recorder(&delegate, &log, Priority::PostUtility, "post-2", Flow::Continue);
        recorder(&delegate, &log, Priority::ArgumentGuard, "guard-2", Flow::Continue);

        assert!(delegate.exec(&()).unwrap());
        assert_eq!(
            *log.lock(),
            vec!["guard-1", "guard-2", "user-1", "user-2", "post-1", "post-2"]
        );
    }

    #[test]
    fn return_policy_applies_to_outcome() {
        let delegate: Delegate<()> = Delegate::with_policy(ReturnPolicy::InverseChild);
        assert!(!delegate.exec(&()).unwrap());

        delegate.attach_fn(Priority::User, |_| Ok(Flow::Stop));
        assert!(delegate.exec(&()).unwrap());

        delegate.set_policy(ReturnPolicy::AlwaysTrue);
        assert!(delegate.exec(&()).unwrap());
        delegate.set_policy(ReturnPolicy::AlwaysFalse);
        assert!(!delegate.exec(&()).unwrap());
    }

    #[test]
    fn delete_self_and_continue() {
        let delegate = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let once = recorder(&delegate, &log, Priority::User, "once", Flow::DeleteSelfAndContinue);
        recorder(&delegate, &log, Priority::User, "after", Flow::Continue);

        assert!(delegate.exec(&()).unwrap());
        assert!(!delegate.contains(once));
        assert_eq!(delegate.len(), 1);

        assert!(delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["once", "after", "after"]);
    }

    #[test]
    fn delete_self_and_stop() {
        let delegate = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&delegate, &log, Priority::PreUtility, "gate", Flow::DeleteSelfAndStop);
        recorder(&delegate, &log, Priority::User, "user", Flow::Continue);

        assert!(!delegate.exec(&()).unwrap());
        assert!(delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["gate", "user"]);
    }

    #[test]
    fn detaching_a_later_listener_mid_dispatch_skips_it() {
        let delegate: Delegate<()> = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let victim = Arc::new(Mutex::new(None));

        let d = delegate.clone();
        let v = Arc::clone(&victim);
        delegate.attach_fn(Priority::User, move |_| {
            if let Some(id) = *v.lock() {
                d.detach(id);
            }
            Ok(Flow::Continue)
        });
        let id = recorder(&delegate, &log, Priority::User, "victim", Flow::Continue);
        recorder(&delegate, &log, Priority::User, "survivor", Flow::Continue);
        *victim.lock() = Some(id);

        assert!(delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["survivor"]);
    }

    #[test]
    fn detaching_an_earlier_listener_does_not_revisit() {
        let delegate: Delegate<()> = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&delegate, &log, Priority::User, "first", Flow::Continue);

        let d = delegate.clone();
        let l = Arc::clone(&log);
        delegate.attach_fn(Priority::User, move |_| {
            l.lock().push("second");
            d.detach(first);
            Ok(Flow::Continue)
        });
        recorder(&delegate, &log, Priority::User, "third", Flow::Continue);

        assert!(delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn listener_attached_mid_dispatch_runs_in_unfinished_partition() {
        let delegate: Delegate<()> = Delegate::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let d = delegate.clone();
        let l = Arc::clone(&log);
        delegate.attach_fn(Priority::User, move |_| {
            let inner = Arc::clone(&l);
            d.attach_fn(Priority::Tail, move |_| {
                inner.lock().push("late");
                Ok(Flow::DeleteSelfAndContinue)
            });
            Ok(Flow::DeleteSelfAndContinue)
        });

        assert!(delegate.exec(&()).unwrap());
        assert_eq!(*log.lock(), vec!["late"]);
        assert!(delegate.is_empty());
    }

    #[test]
    fn errors_abort_and_propagate() {
        let delegate: Delegate<()> = Delegate::new();
        let calls = Arc::new(AtomicUsize::new(0));
        delegate.attach_fn(Priority::User, |_| Err(Error::invariant("broken")));
        let c = Arc::clone(&calls);
        delegate.attach_fn(Priority::User, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Continue)
        });

        let err = delegate.exec(&()).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn delegates_compose_as_listeners() {
        let parent: Delegate<i32> = Delegate::new();
        let child: Delegate<i32> = Delegate::with_policy(ReturnPolicy::UseChild);
        let after = Arc::new(AtomicUsize::new(0));

        child.attach_fn(Priority::User, |n| Ok(Flow::from(*n >= 0)));
        parent.attach_listener(Priority::User, child.clone());
        let a = Arc::clone(&after);
        parent.attach_fn(Priority::User, move |_| {
            a.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Continue)
        });

        assert!(parent.exec(&1).unwrap());
        assert!(!parent.exec(&-1).unwrap());
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detach_by_identity() {
        let delegate: Delegate<()> = Delegate::new();
        let shared: Arc<dyn Listener<()>> = Arc::new(FnListener::new(|_: &()| Ok::<_, Error>(Flow::Continue)));
        delegate.attach(Priority::PreUtility, Arc::clone(&shared));
        delegate.attach(Priority::PostUtility, Arc::clone(&shared));
        assert_eq!(delegate.len(), 2);

        assert!(delegate.detach_listener(&shared));
        assert_eq!(delegate.len_in(Priority::PreUtility), 0);
        assert_eq!(delegate.len_in(Priority::PostUtility), 1);
        assert!(delegate.detach_listener(&shared));
        assert!(!delegate.detach_listener(&shared));
    }

    #[test]
    fn recursive_dispatch_is_allowed() {
        let delegate: Delegate<u32> = Delegate::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let d = delegate.clone();
        let c = Arc::clone(&calls);
        delegate.attach_fn(Priority::User, move |depth| {
            c.fetch_add(1, Ordering::SeqCst);
            if *depth > 0 {
                d.exec(&(depth - 1))?;
            }
            Ok(Flow::Continue)
        });

        assert!(delegate.exec(&3).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(delegate.len(), 1);
    }

    #[test]
    fn find_and_clear() {
        let delegate: Delegate<()> = Delegate::new();
        delegate.attach_fn(Priority::Binder, |_| Ok(Flow::Continue));
        assert!(delegate.find(Priority::Binder, |_| true).is_some());
        assert!(delegate.find(Priority::User, |_| true).is_none());

        delegate.clear();
        assert!(delegate.is_empty());
    }
}
