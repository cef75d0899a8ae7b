//! Arguments passed to property get/set delegates.

use super::cell::PropertyId;

/// Fired after a property read.
#[derive(Debug, Clone, PartialEq)]
pub struct GetEvent<T> {
    /// The property that was read.
    pub caller: PropertyId,
    value: T,
}

impl<T> GetEvent<T> {
    pub(crate) fn new(caller: PropertyId, value: T) -> Self {
        Self { caller, value }
    }

    /// The value the read returned.
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// Fired after a property write has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEvent<T> {
    /// The property that was written.
    pub caller: PropertyId,
    old: T,
    new: T,
}

impl<T> SetEvent<T> {
    pub(crate) fn new(caller: PropertyId, old: T, new: T) -> Self {
        Self { caller, old, new }
    }

    /// The value held before the write.
    pub fn old_value(&self) -> &T {
        &self.old
    }

    /// The value the write stored.
    pub fn new_value(&self) -> &T {
        &self.new
    }
}

impl<T: PartialEq> SetEvent<T> {
    /// Whether the write actually changed the value.
    ///
    /// `false` for every `pretend_set`.
    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}
