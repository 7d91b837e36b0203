//! The suspension contract.
//!
//! [`SyncEffect::suspend`] is the one primitive an effect type provides; every
//! other constructor here is derived from it and from the capabilities
//! `SyncEffect` requires.

use crate::clock::Clock;
use crate::defer::Defer;
use crate::error::MonadError;
use crate::failure::Failure;
use crate::hint::Hint;
use crate::kind::Value;

/// Effects that can suspend a side-effecting thunk, tagged with a scheduling [`Hint`].
///
/// Running the returned effect evaluates the thunk once per run. Results are
/// never cached: a thunk that increments a counter increments it on every
/// run. An `Err` returned by the thunk is raised through
/// [`MonadError::raise_error`]'s channel unchanged.
pub trait SyncEffect: MonadError<Error = Failure> + Clock + Defer {
    /// Suspends `thunk` under `hint`; the only constructor an effect type must provide.
    fn suspend<A, K>(hint: Hint, thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static;

    /// Suspends cheap synchronous work.
    fn delay<A, K>(thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static,
    {
        Self::suspend::<A, K>(Hint::Delay, thunk)
    }

    /// Suspends an infallible thunk with [`Hint::Delay`].
    fn delay_value<A, K>(thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> A + Send + Sync + 'static,
    {
        Self::delay::<A, _>(move || Ok(thunk()))
    }

    /// Suspends work that may block the calling thread.
    fn blocking<A, K>(thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static,
    {
        Self::suspend::<A, K>(Hint::Blocking, thunk)
    }

    /// Suspends blocking work the runtime may interrupt, once or repeatedly
    /// depending on `many` (see [`Hint::INTERRUPTIBLE_TABLE`]).
    fn interruptible<A, K>(many: bool, thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static,
    {
        Self::suspend::<A, K>(Hint::interruptible(many), thunk)
    }

    /// Suspends blocking work the runtime may interrupt repeatedly.
    fn interruptible_many<A, K>(thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static,
    {
        Self::interruptible::<A, K>(true, thunk)
    }
}

/// Deferred construction derived from [`SyncEffect::delay`] and `flat_map`.
///
/// Observably the same as [`Defer::defer`]: the effect returned by `thunk` is
/// built and run afresh on every run.
pub fn defer<F, A, K>(thunk: K) -> F::Of<A>
where
    F: SyncEffect,
    A: Value,
    K: Fn() -> F::Of<A> + Send + Sync + 'static,
{
    let delayed = F::delay::<F::Of<A>, _>(move || Ok(thunk()));
    F::flat_map::<F::Of<A>, A, _>(delayed, |fa| fa)
}
