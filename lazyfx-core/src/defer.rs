use crate::kind::{Effect, Value};

/// Deferred construction: build the effect only when it runs.
///
/// `thunk` is called again on every run of the returned effect.
pub trait Defer: Effect {
    /// An effect that calls `thunk` and runs what it returns, on every run.
    fn defer<A, K>(thunk: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn() -> Self::Of<A> + Send + Sync + 'static;
}
