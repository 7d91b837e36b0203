use std::sync::Arc;

use lazyfx_core::hint::Hint;

/// The scheduler seam: decides where, and whether, a suspended thunk runs.
///
/// [`IO`](crate::IO) hands every suspended thunk to a dispatcher together
/// with its [`Hint`]. The job is `Send`: the dispatcher may run it on another
/// thread, as long as it has finished when `dispatch` returns. If it returns
/// without calling it, the suspension fails with a cancellation outcome.
/// Calls after the first are ignored.
///
/// # Examples
/// ```
/// use lazyfx_io::{Dispatch, IO};
/// use lazyfx_core::hint::Hint;
///
/// /// Refuses to run blocking work.
/// struct NoBlocking;
///
/// impl Dispatch for NoBlocking {
///     fn dispatch(&self, hint: Hint, job: &mut (dyn FnMut() + Send)) {
///         if !hint.is_blocking() {
///             job();
///         }
///     }
/// }
///
/// assert_eq!(IO::effect(|| 1).run_with(&NoBlocking).unwrap(), 1);
/// let err = IO::suspend(Hint::Blocking, || Ok(2)).run_with(&NoBlocking).unwrap_err();
/// assert!(err.is_cancelled());
/// ```
pub trait Dispatch {
    /// Runs `job` for a thunk tagged `hint`, or declines by returning without calling it.
    fn dispatch(&self, hint: Hint, job: &mut (dyn FnMut() + Send));
}

/// Runs every job immediately on the calling thread, whatever its hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inline;

impl Dispatch for Inline {
    fn dispatch(&self, _hint: Hint, job: &mut (dyn FnMut() + Send)) {
        job()
    }
}

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn dispatch(&self, hint: Hint, job: &mut (dyn FnMut() + Send)) {
        (**self).dispatch(hint, job)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn dispatch(&self, hint: Hint, job: &mut (dyn FnMut() + Send)) {
        (**self).dispatch(hint, job)
    }
}
