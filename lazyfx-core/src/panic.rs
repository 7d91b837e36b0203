use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Error produced when a suspended thunk panics instead of returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panicked {
    message: String,
}

impl Panicked {
    /// Extracts the panic message from a payload returned by `catch_unwind`.
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Panicked { message }
    }

    /// Returns the panic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panicked: {}", self.message)
    }
}

impl std::error::Error for Panicked {}

/// Runs `f`, converting an unwinding panic into [`Panicked`].
///
/// Thunks are arbitrary user closures, so unwind safety is asserted rather
/// than required.
///
/// # Examples
/// ```
/// use lazyfx_core::panic::catch_panic;
///
/// assert_eq!(catch_panic(|| 42).unwrap(), 42);
///
/// let err = catch_panic(|| -> i32 { panic!("oops") }).unwrap_err();
/// assert_eq!(err.message(), "oops");
/// ```
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, Panicked> {
    catch_unwind(AssertUnwindSafe(f)).map_err(Panicked::from_payload)
}
