//! Tether Core
//!
//! This crate provides the reactive core underneath the Tether UI elements.
//! It implements:
//!
//! - Prioritised, short-circuiting listener delegates
//! - Observable properties with read/write capability splitting
//! - Declarative bindings and the executor that keeps them current
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `delegate`: listeners, priority partitions and dispatch
//! - `property`: observable value slots and their restricted views
//! - `binding`: bindings, binder listeners and the executor
//! - `error`: the crate error type
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::{bind2, Property};
//!
//! let width = Property::new(10);
//! let padding = Property::new(2);
//! let outer = Property::new(0);
//!
//! bind2(outer.clone(), |w: &i32, p: &i32| w + 2 * p, &width, &padding)?;
//! assert_eq!(outer.get()?, 14);
//!
//! width.set(20)?;
//! // the default executor ran as part of the write
//! assert_eq!(outer.get()?, 24);
//! ```

pub mod binding;
pub mod delegate;
pub mod error;
pub mod property;

pub use binding::{
    bind1, bind2, bind3, bind_all, default_executor, mirror, set_default_executor, value_as,
    Binding, BindingExecutor, BindingSource, BindingTarget, DrainOrder, ExecutorConfig, Value,
};
pub use delegate::{Delegate, Flow, Listener, ListenerId, Priority, ReturnPolicy};
pub use error::{Error, Result};
pub use property::{
    ConstProperty, GetEvent, Property, PropertyId, PropertyReader, PropertyWriter, Readable,
    ReadonlyProperty, SetEvent, Writable, WriteonlyProperty,
};
