//! Read-write property.

use std::fmt;

use super::access::{Readable, Writable};
use super::cell::{PropertyCell, PropertyId};
use super::event::{GetEvent, SetEvent};
use super::readonly::ReadonlyProperty;
use crate::binding::{BindingSource, BindingTarget};
use crate::delegate::Delegate;
use crate::error::Result;

/// An observable value anyone holding the handle may read and write.
///
/// Clones share the same value and delegates.
///
/// # Example
///
/// ```rust,ignore
/// let width = Property::new(10);
/// width.on_set().attach_fn(Priority::User, |event| {
///     println!("{} -> {}", event.old_value(), event.new_value());
///     Ok(Flow::Continue)
/// });
/// width.set(20)?;          // prints "10 -> 20"
/// assert_eq!(width.get()?, 20);
/// ```
pub struct Property<T: 'static> {
    cell: PropertyCell<T>,
}

impl<T> Property<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a property holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            cell: PropertyCell::new(value),
        }
    }

    /// Create a property whose value lives behind a getter/setter pair.
    pub fn from_accessors<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self {
            cell: PropertyCell::from_accessors(get, set),
        }
    }

    /// Get the property's unique ID.
    pub fn id(&self) -> PropertyId {
        self.cell.id()
    }

    /// Read the value, then fire the get-delegate.
    pub fn get(&self) -> Result<T> {
        self.cell.get()
    }

    /// Read the value without firing the get-delegate.
    pub fn peek(&self) -> T {
        self.cell.peek()
    }

    /// Store `value`, then fire the set-delegate.
    ///
    /// Returns the value held once every listener has run.
    pub fn set(&self, value: T) -> Result<T> {
        self.cell.set(value)
    }

    /// Fire the set-delegate with the current value as both old and new.
    ///
    /// Forces dependents to recompute without changing anything.
    pub fn pretend_set(&self) -> Result<T> {
        self.cell.pretend_set()
    }

    /// Set the value computed from the current one.
    pub fn update<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&T) -> T,
    {
        self.cell.update(f)
    }

    /// Delegate fired after every read.
    pub fn on_get(&self) -> &Delegate<GetEvent<T>> {
        self.cell.on_get()
    }

    /// Delegate fired after every write.
    pub fn on_set(&self) -> &Delegate<SetEvent<T>> {
        self.cell.on_set()
    }

    /// A read-only view onto the same value.
    pub fn readonly(&self) -> ReadonlyProperty<T> {
        ReadonlyProperty::from_cell(self.cell.clone())
    }
}

impl<T> Readable<T> for Property<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn property_id(&self) -> PropertyId {
        self.id()
    }

    fn get(&self) -> Result<T> {
        self.cell.get()
    }

    fn peek(&self) -> T {
        self.cell.peek()
    }

    fn source(&self) -> BindingSource {
        BindingSource::from_cell(&self.cell)
    }
}

impl<T> Writable<T> for Property<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn property_id(&self) -> PropertyId {
        self.id()
    }

    fn set(&self, value: T) -> Result<T> {
        self.cell.set(value)
    }

    fn pretend_set(&self) -> Result<T> {
        self.cell.pretend_set()
    }

    fn target(&self) -> BindingTarget<T> {
        BindingTarget::from_cell(&self.cell)
    }
}

impl<T: 'static> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> Default for Property<T>
where
    T: Clone + Send + Sync + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Property<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id())
            .field("value", &self.peek())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{Flow, Priority};
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn count_sets<T>(property: &Property<T>) -> Arc<AtomicUsize>
    where
        T: Clone + Send + Sync + 'static,
    {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        property.on_set().attach_fn(Priority::User, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Continue)
        });
        count
    }

    #[test]
    fn set_fires_once_with_old_value() {
        let property = Property::new(5);
        let old_seen = Arc::new(AtomicI32::new(0));
        let o = Arc::clone(&old_seen);
        property.on_set().attach_fn(Priority::User, move |event| {
            o.store(*event.old_value(), Ordering::SeqCst);
            assert_eq!(*event.new_value(), 10);
            Ok(Flow::Continue)
        });
        let sets = count_sets(&property);

        assert_eq!(property.set(10).unwrap(), 10);
        assert_eq!(sets.load(Ordering::SeqCst), 1);
        assert_eq!(old_seen.load(Ordering::SeqCst), 5);
        assert_eq!(property.get().unwrap(), 10);
    }

    #[test]
    fn get_fires_once_per_read() {
        let property = Property::new("x");
        let reads = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&reads);
        property.on_get().attach_fn(Priority::User, move |event| {
            assert_eq!(*event.value(), "x");
            r.fetch_add(1, Ordering::SeqCst);
            Ok(Flow::Continue)
        });

        property.get().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        property.get().unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);

        // peek stays silent
        property.peek();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn pretend_set_notifies_without_changing() {
        let property = Property::new(7);
        let sets = count_sets(&property);
        let changed = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&changed);
        property.on_set().attach_fn(Priority::User, move |event| {
            if event.changed() {
                c.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Flow::Continue)
        });

        assert_eq!(property.pretend_set().unwrap(), 7);
        assert_eq!(property.get().unwrap(), 7);
        assert_eq!(sets.load(Ordering::SeqCst), 1);
        assert_eq!(changed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn set_returns_value_after_listener_rewrite() {
        let property = Property::new(0);
        let again = property.clone();
        property.on_set().attach_fn(Priority::PostUtility, move |event| {
            if *event.new_value() > 100 {
                again.set(100)?;
            }
            Ok(Flow::Continue)
        });

        assert_eq!(property.set(500).unwrap(), 100);
        assert_eq!(property.set(50).unwrap(), 50);
    }

    #[test]
    fn update_reads_then_writes() {
        let property = Property::new(10);
        property.update(|v| v + 5).unwrap();
        assert_eq!(property.get().unwrap(), 15);
    }

    #[test]
    fn clone_and_readonly_share_state() {
        let property = Property::new(1);
        let clone = property.clone();
        let view = property.readonly();

        clone.set(2).unwrap();
        assert_eq!(property.get().unwrap(), 2);
        assert_eq!(view.get().unwrap(), 2);
        assert_eq!(view.id(), property.id());
    }

    #[test]
    fn guard_listener_error_propagates_from_set() {
        let property = Property::new(1);
        property.on_set().attach_fn(Priority::ArgumentGuard, |event| {
            if *event.new_value() < 0 {
                return Err(crate::error::Error::invariant("negative"));
            }
            Ok(Flow::Continue)
        });

        assert!(property.set(3).is_ok());
        assert!(property.set(-1).is_err());
        // the write itself has already been applied
        assert_eq!(property.peek(), -1);
    }

    #[test]
    fn property_ids_are_unique() {
        let a = Property::new(0);
        let b = Property::new(0);
        assert_ne!(a.id(), b.id());
    }
}
