use std::ops::ControlFlow;

use crate::kind::{Effect, Value};

/// Sequencing capability: inject a value, bind, and loop without growing the stack.
pub trait Monad: Effect {
    /// Lifts a value into the effect.
    fn pure<A: Value>(a: A) -> Self::Of<A>;

    /// Runs `fa`, then the effect `f` builds from its value.
    fn flat_map<A, B, K>(fa: Self::Of<A>, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<B> + Send + Sync + 'static;

    /// Repeats `f` from `seed` until it yields `ControlFlow::Break`.
    ///
    /// Implementations must loop rather than recurse.
    fn tail_rec_m<A, B, K>(seed: A, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<ControlFlow<B, A>> + Send + Sync + 'static;

    /// Transforms the value of `fa` with a pure function.
    fn map<A, B, K>(fa: Self::Of<A>, f: K) -> Self::Of<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> B + Send + Sync + 'static,
    {
        Self::flat_map::<A, B, _>(fa, move |a| Self::pure(f(a)))
    }

    /// Runs `fa` then `fb`, pairing their values.
    fn product<A: Value, B: Value>(fa: Self::Of<A>, fb: Self::Of<B>) -> Self::Of<(A, B)> {
        Self::flat_map::<A, (A, B), _>(fa, move |a| {
            Self::map::<B, (A, B), _>(fb.clone(), move |b| (a.clone(), b))
        })
    }
}
