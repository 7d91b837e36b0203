/// Anything an effect may carry: cloneable and shareable across threads.
///
/// Effect values can be run many times, so whatever they hold or produce must
/// be reproducible on every run.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}

/// A type constructor `F<_>`, encoded as a marker type with a generic associated type.
///
/// `F::Of<A>` is the effect value producing an `A`. Capability traits
/// ([`Monad`](crate::monad::Monad), [`Defer`](crate::defer::Defer), ...) are
/// implemented on the marker, not on the effect values.
///
/// # Examples
/// ```
/// use lazyfx_core::kind::{Effect, Value};
///
/// enum VecKind {}
///
/// impl Effect for VecKind {
///     type Of<A: Value> = Vec<A>;
/// }
///
/// let xs: <VecKind as Effect>::Of<i32> = vec![1, 2, 3];
/// assert_eq!(xs.len(), 3);
/// ```
pub trait Effect: 'static {
    type Of<A: Value>: Value;
}
