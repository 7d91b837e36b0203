use std::fmt;
use std::sync::Arc;

use crate::panic::Panicked;

/// Outcome recorded when a runtime cancels a suspended thunk before it produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("computation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// The universal error channel of every `SyncEffect`.
///
/// A shared handle around an `anyhow::Error`. Effect values may be run many
/// times and must fail the same way on each run, so the error is reference
/// counted instead of moved out.
///
/// # Examples
/// ```
/// use lazyfx_core::failure::Failure;
///
/// let failure = Failure::msg("disk full");
/// let copy = failure.clone();
/// assert!(failure.ptr_eq(&copy));
/// assert_eq!(copy.to_string(), "disk full");
/// ```
#[derive(Clone)]
pub struct Failure {
    inner: Arc<anyhow::Error>,
}

impl Failure {
    /// Wraps any error convertible into `anyhow::Error`.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Failure {
            inner: Arc::new(error.into()),
        }
    }

    /// Creates a failure from a printable message.
    pub fn msg<M>(message: M) -> Self
    where
        M: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Failure::new(anyhow::Error::msg(message))
    }

    /// The failure a runtime reports after cancelling an interruptible thunk.
    pub fn cancelled() -> Self {
        Failure::new(Cancelled)
    }

    /// Returns `true` if this failure records a cancelled thunk.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is::<Cancelled>()
    }

    /// Returns the panic captured from a thunk, if that is what this failure holds.
    pub fn panic(&self) -> Option<&Panicked> {
        self.downcast_ref::<Panicked>()
    }

    /// Returns the underlying error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Returns `true` if both handles point at the same underlying error.
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Borrows the wrapped `anyhow::Error`.
    pub fn as_anyhow(&self) -> &anyhow::Error {
        &self.inner
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(error: anyhow::Error) -> Self {
        Failure {
            inner: Arc::new(error),
        }
    }
}

impl From<Panicked> for Failure {
    fn from(panicked: Panicked) -> Self {
        Failure::new(panicked)
    }
}

impl From<Cancelled> for Failure {
    fn from(cancelled: Cancelled) -> Self {
        Failure::new(cancelled)
    }
}
