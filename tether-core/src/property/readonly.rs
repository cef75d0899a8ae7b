//! Read-only property and its write capability.
//!
//! [`ReadonlyProperty::new`] returns the public view together with the only
//! [`PropertyWriter`] that can ever mutate it. The writer is not `Clone` and
//! cannot be derived from the view, so whoever receives it at construction
//! owns the write right.

use std::fmt;

use super::access::{Readable, Writable};
use super::cell::{PropertyCell, PropertyId};
use super::event::{GetEvent, SetEvent};
use crate::binding::{BindingSource, BindingTarget};
use crate::delegate::Delegate;
use crate::error::Result;

/// A property the public may read and observe but not write.
pub struct ReadonlyProperty<T: 'static> {
    cell: PropertyCell<T>,
}

/// The single write capability for a [`ReadonlyProperty`].
pub struct PropertyWriter<T: 'static> {
    cell: PropertyCell<T>,
}

impl<T> ReadonlyProperty<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a read-only property and its writer.
    pub fn new(value: T) -> (Self, PropertyWriter<T>) {
        Self::split(PropertyCell::new(value))
    }

    /// Create a read-only property backed by a getter/setter pair.
    pub fn from_accessors<G, S>(get: G, set: S) -> (Self, PropertyWriter<T>)
    where
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        Self::split(PropertyCell::from_accessors(get, set))
    }

    fn split(cell: PropertyCell<T>) -> (Self, PropertyWriter<T>) {
        let writer = PropertyWriter { cell: cell.clone() };
        (Self { cell }, writer)
    }

    /// View onto a cell whose writers live elsewhere.
    pub(crate) fn from_cell(cell: PropertyCell<T>) -> Self {
        Self { cell }
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

    /// Delegate fired after every read.
    pub fn on_get(&self) -> &Delegate<GetEvent<T>> {
        self.cell.on_get()
    }

    /// Delegate fired after every write made through the writer.
    pub fn on_set(&self) -> &Delegate<SetEvent<T>> {
        self.cell.on_set()
    }
}

impl<T> PropertyWriter<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Id of the property this writer mutates.
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

    /// Set the value computed from the current one.
    pub fn update<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&T) -> T,
    {
        self.cell.update(f)
    }
}

impl<T> Readable<T> for ReadonlyProperty<T>
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

impl<T> Writable<T> for PropertyWriter<T>
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

impl<T: 'static> Clone for ReadonlyProperty<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> fmt::Debug for ReadonlyProperty<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadonlyProperty")
            .field("id", &self.id())
            .field("value", &self.peek())
            .finish()
    }
}

impl<T> fmt::Debug for PropertyWriter<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyWriter")
            .field("id", &self.id())
            .finish()
    }
}
