//! Binder Listener
//!
//! One binder listener sits in the [`Priority::Binder`] partition of a
//! source property's set-delegate for every executor that has bindings
//! reading that source. On each write it records the written value as the
//! run's value for the source, enqueues the dependent bindings and, when the
//! executor runs automatically, starts a run.
//!
//! Bindings whose source or target has been dropped are pruned on the next
//! write; a binder left with none removes itself from the delegate.
//!
//! Binders are found again by scanning the partition for a
//! `BinderListener<T>` whose executor is the one asked for; a miss just
//! creates and attaches a new binder.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use super::executor::BindingExecutor;
use super::rule::{same_binding, Recompute};
use crate::delegate::{Delegate, Flow, Listener, Priority};
use crate::error::Result;
use crate::property::{PropertyId, SetEvent};

/// Feeds writes of one source property into one [`BindingExecutor`].
pub struct BinderListener<T: 'static> {
    executor: BindingExecutor,
    source: PropertyId,
    bindings: Mutex<Vec<Arc<dyn Recompute>>>,
    _value: PhantomData<fn() -> T>,
}

impl<T> BinderListener<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new(executor: BindingExecutor, source: PropertyId) -> Self {
        Self {
            executor,
            source,
            bindings: Mutex::new(Vec::new()),
            _value: PhantomData,
        }
    }

    /// The binder attached to `delegate` for `executor`, if any.
    pub fn find(
        delegate: &Delegate<SetEvent<T>>,
        executor: &BindingExecutor,
    ) -> Option<Arc<dyn Listener<SetEvent<T>>>> {
        delegate.find(Priority::Binder, |listener| {
            Self::downcast(listener).is_some_and(|binder| binder.executor.ptr_eq(executor))
        })
    }

    /// Recover a binder from a listener found in a delegate.
    pub fn downcast(listener: &dyn Listener<SetEvent<T>>) -> Option<&Self> {
        listener.as_any().and_then(|any| any.downcast_ref::<Self>())
    }

    /// Register `binding` as a dependent of `source`, creating the binder if
    /// this source has none for `executor` yet.
    pub(crate) fn link(
        delegate: &Delegate<SetEvent<T>>,
        executor: &BindingExecutor,
        source: PropertyId,
        binding: Arc<dyn Recompute>,
    ) {
        let listener = match Self::find(delegate, executor) {
            Some(listener) => listener,
            None => {
                tracing::trace!(?source, "attaching binder listener");
                let listener: Arc<dyn Listener<SetEvent<T>>> =
                    Arc::new(Self::new(executor.clone(), source));
                delegate.attach(Priority::Binder, Arc::clone(&listener));
                listener
            }
        };
        if let Some(binder) = Self::downcast(listener.as_ref()) {
            binder.bindings.lock().push(binding);
        }
    }

    /// Remove `binding`; a binder left without bindings detaches itself.
    pub(crate) fn unlink(
        delegate: &Delegate<SetEvent<T>>,
        executor: &BindingExecutor,
        binding: &Arc<dyn Recompute>,
    ) {
        let Some(listener) = Self::find(delegate, executor) else {
            return;
        };
        let now_empty = match Self::downcast(listener.as_ref()) {
            Some(binder) => {
                let mut bindings = binder.bindings.lock();
                bindings.retain(|b| !same_binding(b, binding));
                bindings.is_empty()
            }
            None => false,
        };
        if now_empty {
            delegate.detach_listener(&listener);
        }
    }

    /// Id of the observed source property.
    pub fn source(&self) -> PropertyId {
        self.source
    }

    /// Executor this binder feeds.
    pub fn executor(&self) -> &BindingExecutor {
        &self.executor
    }

    /// Number of bindings depending on the source through this executor.
    pub fn binding_count(&self) -> usize {
        self.bindings.lock().len()
    }
}

impl<T> Listener<SetEvent<T>> for BinderListener<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn call(&self, event: &SetEvent<T>) -> Result<Flow> {
        let bindings = {
            let mut bindings = self.bindings.lock();
            bindings.retain(|binding| binding.is_alive());
            bindings.clone()
        };
        if bindings.is_empty() {
            tracing::trace!(source = ?self.source, "no live bindings, detaching binder");
            return Ok(Flow::DeleteSelfAndContinue);
        }

        self.executor
            .put_actor_value(self.source, event.new_value().clone());
        for binding in bindings {
            self.executor.enqueue_erased(binding);
        }
        if self.executor.config().auto_run {
            self.executor.run()?;
        }
        Ok(Flow::Continue)
    }

    fn as_any(&self) -> Option<&(dyn Any + Send + Sync)> {
        Some(self)
    }
}

impl<T: 'static> fmt::Debug for BinderListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinderListener")
            .field("source", &self.source)
            .field("bindings", &self.bindings.lock().len())
            .finish()
    }
}
