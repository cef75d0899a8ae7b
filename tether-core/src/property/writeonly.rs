//! Write-only property and its read capability.

use std::fmt;

use super::access::{Readable, Writable};
use super::cell::{PropertyCell, PropertyId};
use super::event::{GetEvent, SetEvent};
use crate::binding::{BindingSource, BindingTarget};
use crate::delegate::Delegate;
use crate::error::Result;

/// A property the public may write but not read.
///
/// The matching [`PropertyReader`] is handed out once, by
/// [`WriteonlyProperty::new`].
pub struct WriteonlyProperty<T: 'static> {
    cell: PropertyCell<T>,
}

/// The single read capability for a [`WriteonlyProperty`].
pub struct PropertyReader<T: 'static> {
    cell: PropertyCell<T>,
}

impl<T> WriteonlyProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a write-only property and its reader.
    pub fn new(value: T) -> (Self, PropertyReader<T>) {
        Self::split(PropertyCell::new(value))
    }

    /// Create a write-only property backed by a getter/setter pair.
    pub fn from_accessors<G, S>(get: G, set: S) -> (Self, PropertyReader<T>)
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self::split(PropertyCell::from_accessors(get, set))
    }

    fn split(cell: PropertyCell<T>) -> (Self, PropertyReader<T>) {
        let reader = PropertyReader { cell: cell.clone() };
        (Self { cell }, reader)
    }

    /// Get the property's unique ID.
    pub fn id(&self) -> PropertyId {
        self.cell.id()
    }

    /// Store `value`, then fire the set-delegate.
    pub fn set(&self, value: T) -> Result<T> {
        self.cell.set(value)
    }

    /// Fire the set-delegate with the current value as both old and new.
    pub fn pretend_set(&self) -> Result<T> {
        self.cell.pretend_set()
    }

    /// Delegate fired after every write.
    pub fn on_set(&self) -> &Delegate<SetEvent<T>> {
        self.cell.on_set()
    }
}

impl<T> PropertyReader<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Id of the property this reader observes.
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

    /// Delegate fired after every read.
    pub fn on_get(&self) -> &Delegate<GetEvent<T>> {
        self.cell.on_get()
    }
}

impl<T> Writable<T> for WriteonlyProperty<T>
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

impl<T> Readable<T> for PropertyReader<T>
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

impl<T: 'static> Clone for WriteonlyProperty<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> fmt::Debug for WriteonlyProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteonlyProperty")
            .field("id", &self.id())
            .finish()
    }
}

impl<T> fmt::Debug for PropertyReader<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyReader")
            .field("id", &self.id())
            .field("value", &self.peek())
            .finish()
    }
}
