//! Property Cell
//!
//! The cell is the storage shared by every property variant: a value slot
//! plus a get-delegate and a set-delegate. The variants in this module's
//! siblings decide which of these a holder may reach.
//!
//! # Notification Order
//!
//! - A read computes the value first, then fires the get-delegate with a
//!   copy of it. A listener writing through another handle does not change
//!   what the in-flight read returns.
//!
//! - A write stores the value first, then fires the set-delegate with the old
//!   and new values, then returns whatever the slot holds afterwards (a
//!   listener may have written again).
//!
//! # Laziness
//!
//! Both delegates live in a `OnceLock`: created on first access, never
//! replaced. A property nobody observes never allocates one, and firing is
//! skipped entirely while a delegate does not exist.
//!
//! # Weak Handles
//!
//! Bindings reach their sources and targets through [`WeakCell`]. A cell's
//! set-delegate owns the binder listeners that own the bindings, so a strong
//! handle there would keep the cell alive forever.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;

use super::event::{GetEvent, SetEvent};
use crate::delegate::Delegate;
use crate::error::Result;

/// Unique identifier for a property.
///
/// Every handle onto the same cell (full, read-only, write-only, capability)
/// reports the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

impl PropertyId {
    /// Generate a new unique property ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

type Getter<T> = Box<dyn Fn() -> T + Send + Sync>;
type Setter<T> = Box<dyn Fn(T) + Send + Sync>;

/// Where the value actually lives.
enum Slot<T> {
    Stored(RwLock<T>),
    Accessors { get: Getter<T>, set: Setter<T> },
}

impl<T: Clone> Slot<T> {
    fn read(&self) -> T {
        match self {
            Slot::Stored(value) => value.read().clone(),
            Slot::Accessors { get, .. } => get(),
        }
    }

    /// Store `value`, returning the previous one.
    fn replace(&self, value: T) -> T {
        match self {
            Slot::Stored(slot) => std::mem::replace(&mut *slot.write(), value),
            Slot::Accessors { get, set } => {
                let old = get();
                set(value);
                old
            }
        }
    }
}

struct CellInner<T: 'static> {
    id: PropertyId,
    slot: Slot<T>,
    on_get: OnceLock<Delegate<GetEvent<T>>>,
    on_set: OnceLock<Delegate<SetEvent<T>>>,
}

/// Shared state behind every property handle.
pub(crate) struct PropertyCell<T: 'static> {
    inner: Arc<CellInner<T>>,
}

impl<T> PropertyCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(value: T) -> Self {
        Self::with_slot(Slot::Stored(RwLock::new(value)))
    }

    pub(crate) fn from_accessors<G, S>(get: G, set: S) -> Self
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self::with_slot(Slot::Accessors {
            get: Box::new(get),
            set: Box::new(set),
        })
    }

    fn with_slot(slot: Slot<T>) -> Self {
        Self {
            inner: Arc::new(CellInner {
                id: PropertyId::next(),
                slot,
                on_get: OnceLock::new(),
                on_set: OnceLock::new(),
            }),
        }
    }

    pub(crate) fn id(&self) -> PropertyId {
        self.inner.id
    }

    /// Read without firing the get-delegate.
    pub(crate) fn peek(&self) -> T {
        self.inner.slot.read()
    }

    pub(crate) fn get(&self) -> Result<T> {
        let value = self.peek();
        if let Some(delegate) = self.inner.on_get.get() {
            delegate.exec(&GetEvent::new(self.id(), value.clone()))?;
        }
        Ok(value)
    }

    pub(crate) fn set(&self, value: T) -> Result<T> {
        let old = self.inner.slot.replace(value.clone());
        if let Some(delegate) = self.inner.on_set.get() {
            delegate.exec(&SetEvent::new(self.id(), old, value))?;
        }
        Ok(self.peek())
    }

    /// Write the current value back, notifying as for a real write.
    pub(crate) fn pretend_set(&self) -> Result<T> {
        self.set(self.peek())
    }

    pub(crate) fn update<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.peek());
        self.set(next)
    }

    pub(crate) fn on_get(&self) -> &Delegate<GetEvent<T>> {
        self.inner.on_get.get_or_init(Delegate::new)
    }

    pub(crate) fn on_set(&self) -> &Delegate<SetEvent<T>> {
        self.inner.on_set.get_or_init(Delegate::new)
    }

    pub(crate) fn downgrade(&self) -> WeakCell<T> {
        WeakCell {
            id: self.id(),
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn has_delegates(&self) -> (bool, bool) {
        (
            self.inner.on_get.get().is_some(),
            self.inner.on_set.get().is_some(),
        )
    }
}

impl<T: 'static> Clone for PropertyCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Non-owning handle onto a [`PropertyCell`].
pub(crate) struct WeakCell<T: 'static> {
    id: PropertyId,
    inner: Weak<CellInner<T>>,
}

impl<T: 'static> WeakCell<T> {
    pub(crate) fn id(&self) -> PropertyId {
        self.id
    }

    pub(crate) fn upgrade(&self) -> Option<PropertyCell<T>> {
        self.inner.upgrade().map(|inner| PropertyCell { inner })
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T: 'static> Clone for WeakCell<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for PropertyCell<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (on_get, on_set) = self.has_delegates();
        f.debug_struct("PropertyCell")
            .field("id", &self.id())
            .field("value", &self.peek())
            .field("has_get_delegate", &on_get)
            .field("has_set_delegate", &on_set)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{Flow, Priority};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delegates_are_created_lazily_and_once() {
        let cell = PropertyCell::new(1);
        assert_eq!(cell.has_delegates(), (false, false));

        cell.get().unwrap();
        cell.set(2).unwrap();
        assert_eq!(cell.has_delegates(), (false, false));

        let first = cell.on_set().clone();
        assert_eq!(cell.has_delegates(), (false, true));
        assert!(first.ptr_eq(cell.on_set()));

        cell.on_get();
        assert_eq!(cell.has_delegates(), (true, true));
    }

    #[test]
    fn accessor_slot_round_trips() {
        let backing = Arc::new(RwLock::new(String::from("a")));
        let (r, w) = (Arc::clone(&backing), Arc::clone(&backing));
        let cell = PropertyCell::from_accessors(move || r.read().clone(), move |v| *w.write() = v);

        let seen = Arc::new(RwLock::new(None));
        let s = Arc::clone(&seen);
        cell.on_set().attach_fn(Priority::User, move |event: &SetEvent<String>| {
            *s.write() = Some((event.old_value().clone(), event.new_value().clone()));
            Ok(Flow::Continue)
        });

        assert_eq!(cell.set("b".to_string()).unwrap(), "b");
        assert_eq!(*backing.read(), "b");
        assert_eq!(*seen.read(), Some(("a".to_string(), "b".to_string())));
    }

    #[test]
    fn weak_handle_does_not_keep_cell_alive() {
        let cell = PropertyCell::new(5);
        let weak = cell.downgrade();
        assert_eq!(weak.id(), cell.id());
        assert_eq!(weak.upgrade().unwrap().peek(), 5);

        drop(cell);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn write_during_get_is_not_reflected_in_that_read() {
        let cell = PropertyCell::new(1);
        let back_channel = cell.clone();
        let writes = Arc::new(AtomicUsize::new(0));
        let w = Arc::clone(&writes);
        cell.on_get().attach_fn(Priority::User, move |_| {
            if w.fetch_add(1, Ordering::SeqCst) == 0 {
                back_channel.set(99)?;
            }
            Ok(Flow::Continue)
        });

        assert_eq!(cell.get().unwrap(), 1);
        assert_eq!(cell.get().unwrap(), 99);
    }
}
