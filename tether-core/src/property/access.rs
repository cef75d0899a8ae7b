//! Capability traits shared by the property variants.
//!
//! Bindings and widgets accept these instead of concrete property types, so
//! a full [`Property`](super::Property), a read-only view or a capability
//! object can all be used as a source or a target.

use super::cell::PropertyId;
use crate::binding::{BindingSource, BindingTarget};
use crate::error::Result;

/// Read access to a property value.
pub trait Readable<T>: Send + Sync {
    /// Id of the underlying property.
    fn property_id(&self) -> PropertyId;

    /// Read the value, firing the get-delegate.
    fn get(&self) -> Result<T>;

    /// Read the value without notifying anyone.
    fn peek(&self) -> T;

    /// Type-erased handle used by bindings to read and observe the property.
    fn source(&self) -> BindingSource;
}

/// Write access to a property value.
pub trait Writable<T>: Send + Sync {
    /// Id of the underlying property.
    fn property_id(&self) -> PropertyId;

    /// Store `value`, fire the set-delegate, return the resulting value.
    fn set(&self, value: T) -> Result<T>;

    /// Re-store the current value as if it were a new write.
    fn pretend_set(&self) -> Result<T>;

    /// Handle through which a binding writes the property.
    ///
    /// The handle does not keep the property alive.
    fn target(&self) -> BindingTarget<T>;
}
