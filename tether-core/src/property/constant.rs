//! Constant property.

use std::fmt;
use std::sync::{Arc, OnceLock};

use super::access::Readable;
use super::cell::PropertyId;
use super::event::GetEvent;
use crate::binding::BindingSource;
use crate::delegate::Delegate;
use crate::error::Result;

struct ConstInner<T: 'static> {
    id: PropertyId,
    value: T,
    on_get: OnceLock<Delegate<GetEvent<T>>>,
}

/// A property that never changes.
///
/// Only a get-delegate exists; there is nothing to observe on the write
/// side. Used as a binding source it never triggers recomputation.
///
/// There is no accessor-backed constructor: a getter may return a different
/// value on every call, which a constant must not do, and [`value`] hands
/// out a borrow of the one stored value. A value computed by a getter is a
/// [`ReadonlyProperty::from_accessors`] whose writer is dropped.
///
/// [`value`]: ConstProperty::value
/// [`ReadonlyProperty::from_accessors`]: super::ReadonlyProperty::from_accessors
pub struct ConstProperty<T: 'static> {
    inner: Arc<ConstInner<T>>,
}

impl<T> ConstProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a constant property.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ConstInner {
                id: PropertyId::next(),
                value,
                on_get: OnceLock::new(),
            }),
        }
    }

    /// Get the property's unique ID.
    pub fn id(&self) -> PropertyId {
        self.inner.id
    }

    /// Read the value, then fire the get-delegate.
    pub fn get(&self) -> Result<T> {
        let value = self.inner.value.clone();
        if let Some(delegate) = self.inner.on_get.get() {
            delegate.exec(&GetEvent::new(self.id(), value.clone()))?;
        }
        Ok(value)
    }

    /// Borrow the value without firing the get-delegate.
    pub fn value(&self) -> &T {
        &self.inner.value
    }

    /// Delegate fired after every read.
    pub fn on_get(&self) -> &Delegate<GetEvent<T>> {
        self.inner.on_get.get_or_init(Delegate::new)
    }
}

impl<T> Readable<T> for ConstProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn property_id(&self) -> PropertyId {
        self.id()
    }

    fn get(&self) -> Result<T> {
        ConstProperty::get(self)
    }

    fn peek(&self) -> T {
        self.inner.value.clone()
    }

    fn source(&self) -> BindingSource {
        BindingSource::from_const(self.clone())
    }
}

impl<T: 'static> Clone for ConstProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ConstProperty<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstProperty")
            .field("id", &self.id())
            .field("value", self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{Flow, Priority};
    use crate::property::ReadonlyProperty;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn constant_reads_and_notifies() {
        let constant = ConstProperty::new(42);
        let reads = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&reads);
        constant.on_get().attach_fn(Priority::User, move |event| {
            assert_eq!(*event.value(), 42);
            r.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Continue)
        });

        assert_eq!(constant.get().unwrap(), 42);
        assert_eq!(*constant.value(), 42);
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_identity() {
        let a = ConstProperty::new("fixed");
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), ConstProperty::new("fixed").id());
    }

    #[test]
    fn getter_backed_readonly_stands_in_for_a_computed_constant() {
        let (view, writer) = ReadonlyProperty::from_accessors(|| 6 * 7, |_: i32| {});
        drop(writer);
        assert_eq!(view.get().unwrap(), 42);
        assert_eq!(view.peek(), ConstProperty::new(42).get().unwrap());
    }
}
