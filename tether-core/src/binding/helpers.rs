//! Typed binding helpers.
//!
//! These wrap [`Binding::new`] for the common shapes: one, two or three
//! sources of possibly different types, N sources of one type, and two
//! properties mirroring each other. Each helper installs the binding it
//! builds and returns it so it can later be uninstalled.
//!
//! The free functions install on [`default_executor`].

use super::executor::{default_executor, BindingExecutor};
use super::rule::Binding;
use super::source::{check_arity, value_as, BindingSource};
use crate::error::Result;
use crate::property::{Property, Readable, Writable};

impl BindingExecutor {
    /// Bind `target` to `f(a)`.
    pub fn bind1<T, A, W, F>(&self, target: W, f: F, a: &impl Readable<A>) -> Result<Binding<T>>
    where
        T: Clone + Send + Sync + 'static,
        A: 'static,
        W: Writable<T> + 'static,
        F: Fn(&A) -> T + Send + Sync + 'static,
    {
        let binding = Binding::new([a.source()], target, move |values| {
            check_arity(values, 1)?;
            Ok(f(value_as(values, 0)?))
        });
        self.install(&binding)?;
        Ok(binding)
    }

    /// Bind `target` to `f(a, b)`.
    pub fn bind2<T, A, B, W, F>(
        &self,
        target: W,
        f: F,
        a: &impl Readable<A>,
        b: &impl Readable<B>,
    ) -> Result<Binding<T>>
    where
        T: Clone + Send + Sync + 'static,
        A: 'static,
        B: 'static,
        W: Writable<T> + 'static,
        F: Fn(&A, &B) -> T + Send + Sync + 'static,
    {
        let binding = Binding::new([a.source(), b.source()], target, move |values| {
            check_arity(values, 2)?;
            Ok(f(value_as(values, 0)?, value_as(values, 1)?))
        });
        self.install(&binding)?;
        Ok(binding)
    }

    /// Bind `target` to `f(a, b, c)`.
    pub fn bind3<T, A, B, C, W, F>(
        &self,
        target: W,
        f: F,
        a: &impl Readable<A>,
        b: &impl Readable<B>,
        c: &impl Readable<C>,
    ) -> Result<Binding<T>>
    where
        T: Clone + Send + Sync + 'static,
        A: 'static,
        B: 'static,
        C: 'static,
        W: Writable<T> + 'static,
        F: Fn(&A, &B, &C) -> T + Send + Sync + 'static,
    {
        let sources = [a.source(), b.source(), c.source()];
        let binding = Binding::new(sources, target, move |values| {
            check_arity(values, 3)?;
            Ok(f(
                value_as(values, 0)?,
                value_as(values, 1)?,
                value_as(values, 2)?,
            ))
        });
        self.install(&binding)?;
        Ok(binding)
    }

    /// Bind `target` to `f` over any number of sources of one type.
    ///
    /// `f` receives the source values in the order given.
    pub fn bind_all<T, S, R, W, F>(&self, target: W, f: F, sources: &[R]) -> Result<Binding<T>>
    where
        T: Clone + Send + Sync + 'static,
        S: Clone + 'static,
        R: Readable<S>,
        W: Writable<T> + 'static,
        F: Fn(&[S]) -> T + Send + Sync + 'static,
    {
        let arity = sources.len();
        let erased: Vec<BindingSource> = sources.iter().map(|s| s.source()).collect();
        let binding = Binding::new(erased, target, move |values| {
            check_arity(values, arity)?;
            let args = (0..arity)
                .map(|i| value_as::<S>(values, i).cloned())
                .collect::<Result<Vec<_>>>()?;
            Ok(f(&args))
        });
        self.install(&binding)?;
        Ok(binding)
    }

    /// Keep `a` and `b` equal, whichever is written.
    ///
    /// `b` takes `a`'s value first. Returns the `a -> b` and `b -> a`
    /// bindings, in that order.
    pub fn mirror<T>(&self, a: &Property<T>, b: &Property<T>) -> Result<(Binding<T>, Binding<T>)>
    where
        T: Clone + Send + Sync + 'static,
    {
        let forward = self.bind1(b.clone(), T::clone, a)?;
        let backward = self.bind1(a.clone(), T::clone, b)?;
        Ok((forward, backward))
    }
}

/// [`BindingExecutor::bind1`] on the default executor.
pub fn bind1<T, A, W, F>(target: W, f: F, a: &impl Readable<A>) -> Result<Binding<T>>
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
    W: Writable<T> + 'static,
    F: Fn(&A) -> T + Send + Sync + 'static,
{
    default_executor().bind1(target, f, a)
}

/// [`BindingExecutor::bind2`] on the default executor.
pub fn bind2<T, A, B, W, F>(
    target: W,
    f: F,
    a: &impl Readable<A>,
    b: &impl Readable<B>,
) -> Result<Binding<T>>
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
    B: 'static,
    W: Writable<T> + 'static,
    F: Fn(&A, &B) -> T + Send + Sync + 'static,
{
    default_executor().bind2(target, f, a, b)
}

/// [`BindingExecutor::bind3`] on the default executor.
pub fn bind3<T, A, B, C, W, F>(
    target: W,
    f: F,
    a: &impl Readable<A>,
    b: &impl Readable<B>,
    c: &impl Readable<C>,
) -> Result<Binding<T>>
where
    T: Clone + Send + Sync + 'static,
    A: 'static,
    B: 'static,
    C: 'static,
    W: Writable<T> + 'static,
    F: Fn(&A, &B, &C) -> T + Send + Sync + 'static,
{
    default_executor().bind3(target, f, a, b, c)
}

/// [`BindingExecutor::bind_all`] on the default executor.
pub fn bind_all<T, S, R, W, F>(target: W, f: F, sources: &[R]) -> Result<Binding<T>>
where
    T: Clone + Send + Sync + 'static,
    S: Clone + 'static,
    R: Readable<S>,
    W: Writable<T> + 'static,
    F: Fn(&[S]) -> T + Send + Sync + 'static,
{
    default_executor().bind_all(target, f, sources)
}

/// [`BindingExecutor::mirror`] on the default executor.
pub fn mirror<T>(a: &Property<T>, b: &Property<T>) -> Result<(Binding<T>, Binding<T>)>
where
    T: Clone + Send + Sync + 'static,
{
    default_executor().mirror(a, b)
}
