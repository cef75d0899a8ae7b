//! Binding Executor
//!
//! The executor walks the binding graph. It keeps a queue of pending
//! bindings and a cache of property values for the current run.
//!
//! # Run Algorithm
//!
//! 1. A source write settles the source in the cache and enqueues every
//!    binding reading it, unless the binding's target is already settled.
//!
//! 2. The drain loop takes one binding at a time. A binding whose target is
//!    already settled is skipped: another path computed it this run.
//!
//! 3. Otherwise each source value comes from the cache, or is read live once
//!    and cached. The transform result settles the target and is written
//!    through the target's write capability.
//!
//! 4. That write fires the target's own binder listener, which enqueues the
//!    next layer onto the same queue. Nested `run()` calls are no-ops; the
//!    outer run drains everything.
//!
//! 5. When the queue is empty, or as soon as an error escapes, the queue and
//!    cache are cleared and the executor is idle again.
//!
//! # Termination
//!
//! Every target is computed at most once per run, because step 2 checks the
//! settled set before any recomputation. A cycle A -> B -> A therefore stops
//! at the second visit of whichever property was settled first, using the
//! value the other one had at that moment.
//!
//! The price is that a run can end inconsistent. When two paths of
//! different length lead to the same target, the target is computed as soon
//! as the first path reaches it, with a live read of the other path's
//! not-yet-recomputed property, and is never revisited. With `root -> left`,
//! `root -> mid -> right` and `sink(left, right)` under FIFO, a write to
//! `root` leaves `sink` built from the new `left` and the old `right`. LIFO
//! shows the same effect on other shapes. Writing the stale target again,
//! or calling `pretend_set` on a source, settles it.
//!
//! # Settled vs. Read Entries
//!
//! Cache entries written by a source mutation or a recomputation are
//! *settled*; entries filled by a live read are not. Only settled entries
//! block recomputation, so a property read early in a run can still be
//! recomputed later in the same run.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use smallvec::SmallVec;

use super::config::{DrainOrder, ExecutorConfig};
use super::rule::{same_binding, Binding, Recompute};
use super::source::{BindingSource, Value};
use crate::error::Result;
use crate::property::PropertyId;

struct CacheEntry {
    value: Value,
    settled: bool,
}

#[derive(Default)]
struct RunState {
    queue: VecDeque<Arc<dyn Recompute>>,
    cache: IndexMap<PropertyId, CacheEntry>,
}

struct ExecutorInner {
    config: ExecutorConfig,
    running: AtomicBool,
    state: Mutex<RunState>,
}

/// Returns the executor to idle when a run ends, successfully or not.
struct RunGuard<'a> {
    inner: &'a ExecutorInner,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock();
            state.queue.clear();
            state.cache.clear();
        }
        self.inner.running.store(false, Ordering::Release);
    }
}

/// Drains pending bindings, recomputing each target at most once per run.
///
/// Cloning yields another handle to the same executor.
#[derive(Clone)]
pub struct BindingExecutor {
    inner: Arc<ExecutorInner>,
}

impl BindingExecutor {
    /// Create an executor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ExecutorConfig::default())
    }

    /// Create an executor with the given configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                config,
                running: AtomicBool::new(false),
                state: Mutex::new(RunState::default()),
            }),
        }
    }

    /// The executor's configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.inner.config
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Number of queued bindings.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Number of cached property values.
    pub fn cached(&self) -> usize {
        self.inner.state.lock().cache.len()
    }

    /// Whether both handles refer to the same executor.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Connect `binding` to its sources and schedule its first computation.
    ///
    /// With `auto_run` the binding is computed before this returns; an error
    /// from that run is returned but the binding stays installed.
    pub fn install<T>(&self, binding: &Binding<T>) -> Result<()>
    where
        T: Clone + Send + Sync + 'static,
    {
        let erased = binding.as_recompute();
        for source in binding.sources() {
            source.link(self, Arc::clone(&erased));
        }
        self.enqueue_erased(erased);
        if self.config().auto_run {
            self.run()?;
        }
        Ok(())
    }

    /// Disconnect `binding` from its sources and drop it from the queue.
    pub fn uninstall<T>(&self, binding: &Binding<T>)
    where
        T: Clone + Send + Sync + 'static,
    {
        let erased = binding.as_recompute();
        for source in binding.sources() {
            source.unlink(self, &erased);
        }
        self.inner
            .state
            .lock()
            .queue
            .retain(|pending| !same_binding(pending, &erased));
    }

    /// Queue `binding` unless its target is already settled this run.
    ///
    /// Returns whether the binding was queued.
    pub fn enqueue<T>(&self, binding: &Binding<T>) -> bool
    where
        T: Clone + Send + Sync + 'static,
    {
        self.enqueue_erased(binding.as_recompute())
    }

    pub(crate) fn enqueue_erased(&self, binding: Arc<dyn Recompute>) -> bool {
        let mut state = self.inner.state.lock();
        let target = binding.target();
        if is_settled(&state, target) {
            tracing::trace!(?target, "target already settled, not queued");
            return false;
        }
        state.queue.push_back(binding);
        true
    }

    /// Record `value` as the run's value of `property`.
    ///
    /// Used for the write that triggered the run, so the triggering value is
    /// never re-read live.
    pub fn put_actor_value<T>(&self, property: PropertyId, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.settle(property, Arc::new(value));
    }

    pub(crate) fn settle(&self, property: PropertyId, value: Value) {
        self.inner.state.lock().cache.insert(
            property,
            CacheEntry {
                value,
                settled: true,
            },
        );
    }

    /// Drain the queue.
    ///
    /// Calling `run` while a run is in progress returns immediately; the
    /// work it would have done is picked up by the outer run. The first
    /// error aborts the run. Writes already made stay in place.
    pub fn run(&self) -> Result<()> {
        if self.inner.running.swap(true, Ordering::AcqRel) {
            tracing::trace!("run already in progress");
            return Ok(());
        }
        let _guard = RunGuard { inner: &self.inner };
        let _span = tracing::debug_span!("binding_run").entered();

        let mut recomputed = 0usize;
        let mut skipped = 0usize;
        while let Some(binding) = self.pop() {
            let target = binding.target();
            if !binding.is_alive() {
                tracing::trace!(?target, "binding endpoint dropped, skipped");
                skipped += 1;
                continue;
            }
            if self.is_settled(target) {
                skipped += 1;
                continue;
            }
            let result = self
                .collect(binding.sources())
                .and_then(|values| binding.recompute(&values, self));
            if let Err(err) = result {
                tracing::warn!(?target, error = %err, "binding run aborted");
                return Err(err);
            }
            recomputed += 1;
        }

        tracing::debug!(recomputed, skipped, "binding run complete");
        Ok(())
    }

    fn pop(&self) -> Option<Arc<dyn Recompute>> {
        let mut state = self.inner.state.lock();
        match self.inner.config.drain_order {
            DrainOrder::Fifo => state.queue.pop_front(),
            DrainOrder::Lifo => state.queue.pop_back(),
        }
    }

    fn is_settled(&self, property: PropertyId) -> bool {
        is_settled(&self.inner.state.lock(), property)
    }

    /// Cached-or-live value of every source, in order.
    fn collect(&self, sources: &[BindingSource]) -> Result<SmallVec<[Value; 4]>> {
        let mut values = SmallVec::with_capacity(sources.len());
        for source in sources {
            let id = source.id();
            let cached = self
                .inner
                .state
                .lock()
                .cache
                .get(&id)
                .map(|entry| Arc::clone(&entry.value));
            let value = match cached {
                Some(value) => value,
                None => {
                    // Read with the state unlocked: get-listeners may call back in.
                    let live = source.read()?;
                    let mut state = self.inner.state.lock();
                    let entry = state.cache.entry(id).or_insert(CacheEntry {
                        value: live,
                        settled: false,
                    });
                    Arc::clone(&entry.value)
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}

fn is_settled(state: &RunState, property: PropertyId) -> bool {
    state
        .cache
        .get(&property)
        .is_some_and(|entry| entry.settled)
}

impl Default for BindingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BindingExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingExecutor")
            .field("config", &self.inner.config)
            .field("running", &self.is_running())
            .field("pending", &self.pending())
            .field("cached", &self.cached())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Default executor
// ----------------------------------------------------------------------------

thread_local! {
    static DEFAULT_EXECUTOR: RefCell<Option<BindingExecutor>> = const { RefCell::new(None) };
}

/// The executor used by the free binding helpers on this thread.
///
/// Created with the default configuration on first use.
pub fn default_executor() -> BindingExecutor {
    DEFAULT_EXECUTOR.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(BindingExecutor::new)
            .clone()
    })
}

/// Replace this thread's default executor, returning the previous one.
///
/// Bindings already installed keep feeding the executor they were installed
/// on.
pub fn set_default_executor(executor: BindingExecutor) -> Option<BindingExecutor> {
    DEFAULT_EXECUTOR.with(|slot| slot.borrow_mut().replace(executor))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
