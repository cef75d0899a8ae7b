//! Declarative Bindings
//!
//! A [`Binding`] keeps one target property equal to a pure function of some
//! source properties. A [`BindingExecutor`] recomputes bindings when their
//! sources change.
//!
//! # How Changes Flow
//!
//! ```text
//! source.set(v)
//!   -> set-delegate, Binder partition
//!     -> BinderListener: cache v, enqueue dependent bindings, run()
//!       -> executor drains queue
//!         -> transform -> target.set(..) -> next BinderListener ...
//! ```
//!
//! Within one run each target is computed at most once, so cyclic and
//! diamond-shaped graphs terminate.

mod binder;
mod config;
mod executor;
mod helpers;
mod rule;
mod source;

pub use binder::BinderListener;
pub use config::{DrainOrder, ExecutorConfig};
pub use executor::{default_executor, set_default_executor, BindingExecutor};
pub use helpers::{bind1, bind2, bind3, bind_all, mirror};
pub use rule::Binding;
pub use source::{value_as, BindingSource, BindingTarget, Value};
