//! Binding Rules
//!
//! A [`Binding`] is the immutable triple {sources, target, transform}. It
//! is shared by the binder listeners of all its sources and by the queue of
//! any executor it is pending in.
//!
//! Sources and target are held weakly. What the transform captures is held
//! strongly, so a transform should not capture the properties it binds.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::executor::BindingExecutor;
use super::source::{BindingSource, BindingTarget, Value};
use crate::error::Result;
use crate::property::{PropertyId, Writable};

/// Executor-facing view of a binding, independent of its target type.
pub(crate) trait Recompute: Send + Sync {
    fn target(&self) -> PropertyId;

    fn sources(&self) -> &[BindingSource];

    /// Whether the target and every source still exist.
    fn is_alive(&self) -> bool;

    /// Apply the transform to `values` and write the target.
    fn recompute(&self, values: &[Value], executor: &BindingExecutor) -> Result<()>;
}

/// Whether two erased bindings are the same allocation.
pub(crate) fn same_binding(a: &Arc<dyn Recompute>, b: &Arc<dyn Recompute>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

type Transform<T> = Box<dyn Fn(&[Value]) -> Result<T> + Send + Sync>;

struct BindingInner<T: 'static> {
    sources: SmallVec<[BindingSource; 4]>,
    target: BindingTarget<T>,
    transform: Transform<T>,
}

impl<T> Recompute for BindingInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn target(&self) -> PropertyId {
        self.target.id()
    }

    fn sources(&self) -> &[BindingSource] {
        &self.sources
    }

    fn is_alive(&self) -> bool {
        self.target.is_alive() && self.sources.iter().all(BindingSource::is_alive)
    }

    fn recompute(&self, values: &[Value], executor: &BindingExecutor) -> Result<()> {
        let value = (self.transform)(values)?;
        // Settle before writing so that bindings triggered by this write
        // find the target already computed.
        executor.settle(self.target.id(), Arc::new(value.clone()));
        self.target.write(value)
    }
}

/// A rule computing one target property from a pure function of sources.
///
/// The binding keeps a write handle onto the target; by convention nothing
/// else writes the target. Dropping every handle of a source or of the
/// target retires the binding.
pub struct Binding<T: 'static> {
    inner: Arc<BindingInner<T>>,
}

impl<T> Binding<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a binding over erased source values.
    ///
    /// `transform` receives one [`Value`] per source, in order; use
    /// [`value_as`](super::value_as) to get typed references. The binding
    /// does nothing until installed on an executor.
    pub fn new<S, W, F>(sources: S, target: W, transform: F) -> Self
    where
        S: IntoIterator<Item = BindingSource>,
        W: Writable<T>,
        F: Fn(&[Value]) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(BindingInner {
                sources: sources.into_iter().collect(),
                target: target.target(),
                transform: Box::new(transform),
            }),
        }
    }

    /// Id of the property this binding writes.
    pub fn target_id(&self) -> PropertyId {
        self.inner.target.id()
    }

    /// Ids of the properties this binding reads, in order.
    pub fn source_ids(&self) -> Vec<PropertyId> {
        self.inner.sources.iter().map(BindingSource::id).collect()
    }

    /// Whether both handles refer to the same binding.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn sources(&self) -> &[BindingSource] {
        &self.inner.sources
    }

    pub(crate) fn as_recompute(&self) -> Arc<dyn Recompute> {
        Arc::clone(&self.inner) as Arc<dyn Recompute>
    }
}

impl<T: 'static> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Binding<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("target", &self.inner.target.id())
            .field("sources", &self.inner.sources)
            .finish()
    }
}
