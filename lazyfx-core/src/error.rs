use crate::kind::Value;
use crate::monad::Monad;

/// Error capability: raise an error into the effect and recover from it.
pub trait MonadError: Monad {
    type Error: Value;

    /// An effect that fails with `e` every time it runs.
    fn raise_error<A: Value>(e: Self::Error) -> Self::Of<A>;

    /// Recovers from a failure of `fa` with the effect `f` builds from the error.
    fn handle_error_with<A, K>(fa: Self::Of<A>, f: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn(Self::Error) -> Self::Of<A> + Send + Sync + 'static;

    /// Recovers from a failure of `fa` with a plain value.
    fn handle_error<A, K>(fa: Self::Of<A>, f: K) -> Self::Of<A>
    where
        A: Value,
        K: Fn(Self::Error) -> A + Send + Sync + 'static,
    {
        Self::handle_error_with::<A, _>(fa, move |e| Self::pure(f(e)))
    }

    /// Moves the error into the value, making the effect infallible.
    fn attempt<A: Value>(fa: Self::Of<A>) -> Self::Of<Result<A, Self::Error>> {
        let values = Self::map::<A, Result<A, Self::Error>, _>(fa, Ok);
        Self::handle_error_with::<Result<A, Self::Error>, _>(values, |e| {
            Self::pure::<Result<A, Self::Error>>(Err(e))
        })
    }

    /// Inverse of [`attempt`](MonadError::attempt): fails with the error held in the value.
    fn rethrow<A: Value>(fa: Self::Of<Result<A, Self::Error>>) -> Self::Of<A> {
        Self::flat_map::<Result<A, Self::Error>, A, _>(fa, |result| match result {
            Ok(a) => Self::pure(a),
            Err(e) => Self::raise_error::<A>(e),
        })
    }
}
