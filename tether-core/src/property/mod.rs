//! Observable Properties
//!
//! A property is a value slot that announces every read and write through
//! a pair of [`Delegate`](crate::delegate::Delegate)s.
//!
//! # Variants
//!
//! | Type                  | Public side      | Withheld side, via        |
//! |-----------------------|------------------|---------------------------|
//! | [`Property`]          | read and write   | -                         |
//! | [`ReadonlyProperty`]  | read, observe    | write, [`PropertyWriter`] |
//! | [`WriteonlyProperty`] | write, observe   | read, [`PropertyReader`]  |
//! | [`ConstProperty`]     | read             | no write side at all      |
//!
//! Capability objects are handed out once, at construction, and cannot be
//! recovered from the public view. Holding one is the permission.
//!
//! # Invariant Maintenance
//!
//! Code that keeps several properties mutually consistent attaches one shared
//! listener to the set-delegate of every participating property instead of
//! special-casing each of them.

mod access;
mod cell;
mod constant;
mod event;
mod read_write;
mod readonly;
mod writeonly;

pub use access::{Readable, Writable};
pub use cell::PropertyId;
pub use constant::ConstProperty;
pub use event::{GetEvent, SetEvent};
pub use read_write::Property;
pub use readonly::{PropertyWriter, ReadonlyProperty};
pub use writeonly::{PropertyReader, WriteonlyProperty};

pub(crate) use cell::{PropertyCell, WeakCell};
