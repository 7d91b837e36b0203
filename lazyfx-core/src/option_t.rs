//! The optional-result wrapper over any effect kind.
//!
//! `OptionT<F, A>` is an `F` effect producing `Option<A>`. `OptionTKind<F>`
//! implements each capability `F` implements by forwarding to `F` and
//! re-wrapping the result; it never runs the inner effect itself.

use std::fmt;
use std::marker::PhantomData;
use std::ops::ControlFlow;
use std::time::Duration;

use crate::clock::Clock;
use crate::defer::Defer;
use crate::error::MonadError;
use crate::failure::Failure;
use crate::hint::Hint;
use crate::kind::{Effect, Value};
use crate::monad::Monad;
use crate::sync::SyncEffect;

/// An `F` effect whose result may be absent.
///
/// Absence only ever comes from the values flowing through the chain
/// ([`OptionT::none`], a `flat_map` returning none, a failed `filter`).
/// Failures of the inner effect stay failures.
pub struct OptionT<F: Effect, A: Value> {
    inner: F::Of<Option<A>>,
}

impl<F: Effect, A: Value> Clone for OptionT<F, A> {
    fn clone(&self) -> Self {
        OptionT {
            inner: self.inner.clone(),
        }
    }
}

impl<F: Effect, A: Value> fmt::Debug for OptionT<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionT").finish_non_exhaustive()
    }
}

impl<F: Effect, A: Value> OptionT<F, A> {
    /// Wraps an `F` effect that already produces an `Option`.
    pub fn new(inner: F::Of<Option<A>>) -> Self {
        OptionT { inner }
    }

    /// Unwraps into the underlying `F` effect.
    pub fn value(self) -> F::Of<Option<A>> {
        self.inner
    }

    /// Borrows the underlying `F` effect.
    pub fn as_inner(&self) -> &F::Of<Option<A>> {
        &self.inner
    }
}

impl<F: Monad, A: Value> OptionT<F, A> {
    /// A present value.
    pub fn some(a: A) -> Self {
        OptionT::new(F::pure(Some(a)))
    }

    /// An absent value.
    pub fn none() -> Self {
        OptionT::new(F::pure::<Option<A>>(None))
    }

    /// Lifts a plain `Option` without running anything.
    pub fn from_option(option: Option<A>) -> Self {
        OptionT::new(F::pure(option))
    }

    /// Lifts an `F` effect, marking its result as present.
    pub fn lift(fa: F::Of<A>) -> Self {
        OptionT::new(F::map::<A, Option<A>, _>(fa, Some))
    }

    /// Transforms the present value; absence passes through.
    pub fn map<B: Value>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> OptionT<F, B> {
        OptionT::new(F::map::<Option<A>, Option<B>, _>(self.inner, move |option| {
            option.map(&f)
        }))
    }

    /// Chains a computation on the present value; absence short-circuits.
    pub fn flat_map<B: Value>(
        self,
        f: impl Fn(A) -> OptionT<F, B> + Send + Sync + 'static,
    ) -> OptionT<F, B> {
        OptionT::new(F::flat_map::<Option<A>, Option<B>, _>(self.inner, move |option| {
            match option {
                Some(a) => f(a).inner,
                None => F::pure::<Option<B>>(None),
            }
        }))
    }

    /// Falls back to `other` when this result is absent.
    pub fn or_else(self, other: OptionT<F, A>) -> Self {
        OptionT::new(F::flat_map::<Option<A>, Option<A>, _>(self.inner, move |option| {
            match option {
                Some(a) => F::pure(Some(a)),
                None => other.inner.clone(),
            }
        }))
    }

    /// Turns a present value failing `predicate` into absence.
    pub fn filter(self, predicate: impl Fn(&A) -> bool + Send + Sync + 'static) -> Self {
        OptionT::new(F::map::<Option<A>, Option<A>, _>(self.inner, move |option| {
            option.filter(|a| predicate(a))
        }))
    }

    /// Drops the option layer, substituting `default` for absence.
    pub fn get_or_else(self, default: A) -> F::Of<A> {
        F::map::<Option<A>, A, _>(self.inner, move |option| {
            option.unwrap_or_else(|| default.clone())
        })
    }

    /// Whether the result is present.
    pub fn is_defined(self) -> F::Of<bool> {
        F::map::<Option<A>, bool, _>(self.inner, |option| option.is_some())
    }
}

/// Kind marker for [`OptionT`] over the effect kind `F`.
pub struct OptionTKind<F>(PhantomData<fn() -> F>);

impl<F: Effect> Effect for OptionTKind<F> {
    type Of<A: Value> = OptionT<F, A>;
}

impl<F: Monad> Monad for OptionTKind<F> {
    fn pure<A: Value>(a: A) -> Self::Of<A> {
        OptionT::some(a)
    }

    fn flat_map<A, B, K>(fa: Self::Of<A>, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<B> + Send + Sync + 'static,
    {
        fa.flat_map(f)
    }

    fn tail_rec_m<A, B, K>(seed: A, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<ControlFlow<B, A>> + Send + Sync + 'static,
    {
        let looped = F::tail_rec_m::<A, Option<B>, _>(seed, move |a| {
            F::map::<Option<ControlFlow<B, A>>, ControlFlow<Option<B>, A>, _>(f(a).inner, |step| {
                match step {
                    None => ControlFlow::Break(None),
                    Some(ControlFlow::Continue(next)) => ControlFlow::Continue(next),
                    Some(ControlFlow::Break(b)) => ControlFlow::Break(Some(b)),
                }
            })
        });
        OptionT::new(looped)
    }

    fn map<A, B, K>(fa: Self::Of<A>, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> B + Send + Sync + 'static,
    {
        fa.map(f)
    }
}

impl<F: MonadError> MonadError for OptionTKind<F> {
    type Error = F::Error;

    fn raise_error<A: Value>(e: Self::Error) -> Self::Of<A> {
        OptionT::new(F::raise_error::<Option<A>>(e))
    }

    fn handle_error_with<A, K>(fa: Self::Of<A>, f: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn(Self::Error) -> Self::Of<A> + Send + Sync + 'static,
    {
        OptionT::new(F::handle_error_with::<Option<A>, _>(fa.inner, move |e| f(e).inner))
    }
}

impl<F: Clock> Clock for OptionTKind<F> {
    fn monotonic() -> Self::Of<Duration> {
        OptionT::lift(F::monotonic())
    }

    fn real_time() -> Self::Of<Duration> {
        OptionT::lift(F::real_time())
    }
}

impl<F: Defer> Defer for OptionTKind<F> {
    fn defer<A, K>(thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Self::Of<A> + Send + Sync + 'static,
    {
        OptionT::new(F::defer::<Option<A>, _>(move || thunk().inner))
    }
}

impl<F: SyncEffect> SyncEffect for OptionTKind<F> {
    fn suspend<A, K>(hint: Hint, thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static,
    {
        OptionT::lift(F::suspend::<A, K>(hint, thunk))
    }
}
