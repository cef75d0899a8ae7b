//! Binding endpoints.
//!
//! A binding reads sources of different types, so the executor sees them
//! through [`BindingSource`] and caches their values as [`Value`]s. Typed
//! transforms get their arguments back with [`value_as`]. The result goes
//! out through a [`BindingTarget`].
//!
//! Both endpoints hold their property weakly. Once every user handle of a
//! source or target is gone, the binding is dead: the executor skips it and
//! the binder listeners drop it.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use super::binder::BinderListener;
use super::executor::BindingExecutor;
use super::rule::Recompute;
use crate::error::{Error, Result};
use crate::property::{ConstProperty, PropertyCell, PropertyId, WeakCell};

/// A property value as cached by the executor.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Borrow source value `index` as a `T`.
pub fn value_as<T: 'static>(values: &[Value], index: usize) -> Result<&T> {
    let value = values.get(index).ok_or(Error::Arity {
        expected: index + 1,
        found: values.len(),
    })?;
    value.downcast_ref::<T>().ok_or(Error::SourceType {
        index,
        expected: type_name::<T>(),
    })
}

/// Fail unless exactly `expected` values were supplied.
pub(crate) fn check_arity(values: &[Value], expected: usize) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(Error::Arity {
            expected,
            found: values.len(),
        })
    }
}

pub(crate) trait ErasedSource: Send + Sync {
    fn id(&self) -> PropertyId;

    fn is_alive(&self) -> bool;

    /// Live read, firing the get-delegate.
    fn read(&self) -> Result<Value>;

    /// Route changes of this source to `binding` through `executor`.
    fn link(&self, executor: &BindingExecutor, binding: Arc<dyn Recompute>);

    fn unlink(&self, executor: &BindingExecutor, binding: &Arc<dyn Recompute>);
}

fn dropped(id: PropertyId) -> Error {
    Error::invariant(format!("property {} was dropped", id.raw()))
}

struct CellSource<T: 'static>(WeakCell<T>);

impl<T> ErasedSource for CellSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> PropertyId {
        self.0.id()
    }

    fn is_alive(&self) -> bool {
        self.0.is_alive()
    }

    fn read(&self) -> Result<Value> {
        let cell = self.0.upgrade().ok_or_else(|| dropped(self.0.id()))?;
        Ok(Arc::new(cell.get()?))
    }

    fn link(&self, executor: &BindingExecutor, binding: Arc<dyn Recompute>) {
        if let Some(cell) = self.0.upgrade() {
            BinderListener::<T>::link(cell.on_set(), executor, cell.id(), binding);
        }
    }

    fn unlink(&self, executor: &BindingExecutor, binding: &Arc<dyn Recompute>) {
        if let Some(cell) = self.0.upgrade() {
            BinderListener::<T>::unlink(cell.on_set(), executor, binding);
        }
    }
}

struct ConstSource<T: 'static>(ConstProperty<T>);

impl<T> ErasedSource for ConstSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn id(&self) -> PropertyId {
        self.0.id()
    }

    // Constants have no delegates that could own a binding.
    fn is_alive(&self) -> bool {
        true
    }

    fn read(&self) -> Result<Value> {
        Ok(Arc::new(self.0.get()?))
    }

    // A constant never changes, so there is nothing to listen to.
    fn link(&self, _executor: &BindingExecutor, _binding: Arc<dyn Recompute>) {}

    fn unlink(&self, _executor: &BindingExecutor, _binding: &Arc<dyn Recompute>) {}
}

/// Handle through which a binding reads and observes one source property.
///
/// Obtained from [`Readable::source`](crate::property::Readable::source).
#[derive(Clone)]
pub struct BindingSource {
    inner: Arc<dyn ErasedSource>,
}

impl BindingSource {
    pub(crate) fn from_cell<T>(cell: &PropertyCell<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(CellSource(cell.downgrade())),
        }
    }

    pub(crate) fn from_const<T>(property: ConstProperty<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ConstSource(property)),
        }
    }

    /// Id of the source property.
    pub fn id(&self) -> PropertyId {
        self.inner.id()
    }

    /// Whether the source property still exists.
    pub fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }

    pub(crate) fn read(&self) -> Result<Value> {
        self.inner.read()
    }

    pub(crate) fn link(&self, executor: &BindingExecutor, binding: Arc<dyn Recompute>) {
        self.inner.link(executor, binding);
    }

    pub(crate) fn unlink(&self, executor: &BindingExecutor, binding: &Arc<dyn Recompute>) {
        self.inner.unlink(executor, binding);
    }
}

impl fmt::Debug for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSource").field("id", &self.id()).finish()
    }
}

/// Handle through which a binding writes its target property.
///
/// Obtained from [`Writable::target`](crate::property::Writable::target).
/// Only bindings can write through it.
pub struct BindingTarget<T: 'static> {
    cell: WeakCell<T>,
}

impl<T> BindingTarget<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn from_cell(cell: &PropertyCell<T>) -> Self {
        Self {
            cell: cell.downgrade(),
        }
    }

    /// Id of the target property.
    pub fn id(&self) -> PropertyId {
        self.cell.id()
    }

    /// Whether the target property still exists.
    pub fn is_alive(&self) -> bool {
        self.cell.is_alive()
    }

    /// Store `value`. A dropped target is left alone.
    pub(crate) fn write(&self, value: T) -> Result<()> {
        if let Some(cell) = self.cell.upgrade() {
            cell.set(value)?;
        }
        Ok(())
    }
}

impl<T: 'static> Clone for BindingTarget<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for BindingTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingTarget")
            .field("id", &self.cell.id())
            .finish()
    }
}
