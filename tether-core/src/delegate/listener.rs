//! Listener trait and the control-flow signal it returns.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Identifier handed out when a listener is attached to a delegate.
///
/// Ids grow monotonically across the process, so within one partition they
/// also record attachment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// What a listener asks the dispatching delegate to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep dispatching.
    Continue,
    /// Stop the dispatch; no later listener runs.
    Stop,
    /// Remove this listener, then keep dispatching.
    DeleteSelfAndContinue,
    /// Remove this listener, then stop the dispatch.
    DeleteSelfAndStop,
}

impl Flow {
    /// Whether the dispatch continues after this listener.
    pub fn continues(self) -> bool {
        matches!(self, Flow::Continue | Flow::DeleteSelfAndContinue)
    }

    /// Whether the listener asked to be removed.
    pub fn deletes_self(self) -> bool {
        matches!(self, Flow::DeleteSelfAndContinue | Flow::DeleteSelfAndStop)
    }
}

impl From<bool> for Flow {
    fn from(proceed: bool) -> Self {
        if proceed {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }
}

/// A unit of behavior invoked with one argument value.
///
/// Returning an error aborts the dispatch and propagates to whoever fired
/// the delegate.
pub trait Listener<A>: Send + Sync {
    /// Handle one dispatch.
    fn call(&self, args: &A) -> Result<Flow>;

    /// Downcasting hook used to find typed listeners inside a delegate.
    fn as_any(&self) -> Option<&(dyn Any + Send + Sync)> {
        None
    }
}

/// Adapter turning a closure into a [`Listener`].
pub struct FnListener<F> {
    f: F,
}

impl<F> FnListener<F> {
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<A, F> Listener<A> for FnListener<F>
where
    F: Fn(&A) -> Result<Flow> + Send + Sync,
{
    fn call(&self, args: &A) -> Result<Flow> {
        (self.f)(args)
    }
}

impl<F> fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnListener").finish_non_exhaustive()
    }
}
