//! Listener Dispatch
//!
//! This module implements the event-dispatch mechanism everything else in
//! the crate is built on.
//!
//! # Concepts
//!
//! ## Listeners
//!
//! A [`Listener`] is invoked with one argument and answers with a [`Flow`]:
//! continue, stop, or remove itself and then continue or stop.
//!
//! ## Delegates
//!
//! A [`Delegate`] is an ordered collection of listeners split into fixed
//! [`Priority`] partitions. Library code can wrap user listeners with
//! argument guards and bookkeeping that users cannot reorder. A delegate is
//! a listener itself; its [`ReturnPolicy`] decides what it reports to a
//! parent delegate.

mod dispatch;
mod listener;
mod priority;

pub use dispatch::Delegate;
pub use listener::{FnListener, Flow, Listener, ListenerId};
pub use priority::{Priority, ReturnPolicy};
