use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use lazyfx_core::failure::Failure;
use lazyfx_core::hint::Hint;
use lazyfx_core::panic::catch_panic;

use crate::dispatch::{Dispatch, Inline};

type Thunk<A> = dyn Fn(&dyn Dispatch) -> Result<A, Failure> + Send + Sync;

/// Runs a user closure, turning a panic into a [`Failure`] holding
/// [`Panicked`](lazyfx_core::panic::Panicked).
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, Failure> {
    catch_panic(f).map_err(Failure::from)
}

/// A lazy, composable, re-runnable IO effect type.
///
/// `IO<A>` describes a computation that, when run, performs side effects and
/// produces an `A` or fails with a [`Failure`].
///
/// Nothing executes until `.run()` is called, and every call runs the whole
/// description again. Results are never cached, so the same value can be run,
/// retried or shared between threads freely.
///
/// # Design
///
/// - **One type parameter**: errors use the universal [`Failure`] channel. For
///   typed errors, use `IO<Result<A, E>>`.
/// - **`Fn`, not `FnOnce`**: each run re-invokes the stored closure.
/// - **`Clone + Send + Sync`**: cloning shares the description, not a result.
/// - **Hint-aware**: suspended thunks reach a [`Dispatch`] with their [`Hint`].
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use lazyfx_io::IO;
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let c = counter.clone();
/// let io = IO::effect(move || c.fetch_add(1, Ordering::SeqCst) + 1);
///
/// assert_eq!(io.run().unwrap(), 1);
/// assert_eq!(io.run().unwrap(), 2);
/// ```
pub struct IO<A> {
    thunk: Arc<Thunk<A>>,
}

impl<A> Clone for IO<A> {
    fn clone(&self) -> Self {
        IO {
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<A> fmt::Debug for IO<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IO").finish_non_exhaustive()
    }
}

/// Alias for familiarity (ZIO convention).
pub type Task<A> = IO<A>;

// ============================================================
// Constructors
// ============================================================

impl<A: 'static> IO<A> {
    pub(crate) fn from_fn(f: impl Fn(&dyn Dispatch) -> Result<A, Failure> + Send + Sync + 'static) -> IO<A> {
        IO { thunk: Arc::new(f) }
    }

    /// Suspends a fallible thunk (primary constructor).
    ///
    /// On every run the thunk is handed to the dispatcher with `hint`. A panic
    /// inside the thunk becomes a [`Failure`] holding
    /// [`Panicked`](lazyfx_core::panic::Panicked); a dispatcher that declines
    /// the job produces [`Failure::cancelled`]. The thunk runs at most once per
    /// run, even if the dispatcher calls the job again.
    pub fn suspend(hint: Hint, thunk: impl Fn() -> Result<A, Failure> + Send + Sync + 'static) -> IO<A>
    where
        A: Send,
    {
        IO::from_fn(move |dispatcher| {
            tracing::trace!(%hint, "dispatching suspended thunk");
            let mut outcome = None;
            dispatcher.dispatch(hint, &mut || {
                if outcome.is_some() {
                    tracing::warn!(%hint, "dispatcher ran a suspended job twice");
                    return;
                }
                outcome = Some(guarded(&thunk).and_then(|result| result));
            });
            outcome.unwrap_or_else(|| {
                tracing::debug!(%hint, "dispatcher declined suspended thunk");
                Err(Failure::cancelled())
            })
        })
    }

    /// Creates an IO from an infallible side effect.
    pub fn effect(f: impl Fn() -> A + Send + Sync + 'static) -> IO<A>
    where
        A: Send,
    {
        IO::suspend(Hint::Delay, move || Ok(f()))
    }

    /// Creates an IO from a fallible side effect.
    pub fn effect_result(f: impl Fn() -> anyhow::Result<A> + Send + Sync + 'static) -> IO<A>
    where
        A: Send,
    {
        IO::suspend(Hint::Delay, move || f().map_err(Failure::from))
    }

    /// Builds the IO to run only when this one runs, rebuilding it on every run.
    ///
    /// A panic while building fails the run, as it would inside [`IO::suspend`].
    pub fn defer(f: impl Fn() -> IO<A> + Send + Sync + 'static) -> IO<A> {
        IO::from_fn(move |dispatcher| guarded(&f)?.run_with(dispatcher))
    }

    /// Creates an IO that fails with the given error on every run.
    pub fn fail(e: impl Into<Failure>) -> IO<A> {
        let failure = e.into();
        IO::from_fn(move |_| Err(failure.clone()))
    }
}

impl<A: Clone + Send + Sync + 'static> IO<A> {
    /// Creates an IO that succeeds with the given value.
    pub fn succeed(a: A) -> IO<A> {
        IO::from_fn(move |_| Ok(a.clone()))
    }

    /// Lifts a `Result` into an `IO`.
    pub fn from_result(result: Result<A, impl Into<Failure>>) -> IO<A> {
        let result = result.map_err(Into::into);
        IO::from_fn(move |_| result.clone())
    }

    /// Lifts an `Option` into an `IO`, using the provided closure for the `None` case.
    pub fn from_option(option: Option<A>, on_none: impl Fn() -> anyhow::Error + Send + Sync + 'static) -> IO<A> {
        IO::from_fn(move |_| option.clone().ok_or_else(|| Failure::from(on_none())))
    }
}

// ============================================================
// Execution
// ============================================================

impl<A> IO<A> {
    /// Runs this IO on the calling thread, returning the result.
    pub fn run(&self) -> Result<A, Failure> {
        self.run_with(&Inline)
    }

    /// Runs this IO, handing every suspended thunk to `dispatcher`.
    pub fn run_with(&self, dispatcher: &dyn Dispatch) -> Result<A, Failure> {
        (self.thunk)(dispatcher)
    }

    /// Runs this IO, panicking on error.
    pub fn run_or_panic(&self) -> A {
        self.run().expect("IO::run_or_panic failed")
    }
}

// ============================================================
// Monadic combinators
// ============================================================

impl<A: 'static> IO<A> {
    /// Transforms the success value.
    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> IO<B> {
        IO::from_fn(move |dispatcher| {
            let a = self.run_with(dispatcher)?;
            guarded(|| f(a))
        })
    }

    /// Chains a computation that depends on the success value.
    pub fn flat_map<B: 'static>(self, f: impl Fn(A) -> IO<B> + Send + Sync + 'static) -> IO<B> {
        IO::from_fn(move |dispatcher| {
            let a = self.run_with(dispatcher)?;
            guarded(|| f(a))?.run_with(dispatcher)
        })
    }

    /// Alias for `flat_map`.
    pub fn and_then<B: 'static>(self, f: impl Fn(A) -> IO<B> + Send + Sync + 'static) -> IO<B> {
        self.flat_map(f)
    }

    /// Combines two IOs into a tuple, running `self` first.
    pub fn zip<B: 'static>(self, other: IO<B>) -> IO<(A, B)> {
        IO::from_fn(move |dispatcher| {
            let a = self.run_with(dispatcher)?;
            let b = other.run_with(dispatcher)?;
            Ok((a, b))
        })
    }

    /// Combines two IOs with a function.
    pub fn zip_with<B: 'static, C: 'static>(
        self,
        other: IO<B>,
        f: impl Fn(A, B) -> C + Send + Sync + 'static,
    ) -> IO<C> {
        IO::from_fn(move |dispatcher| {
            let a = self.run_with(dispatcher)?;
            let b = other.run_with(dispatcher)?;
            guarded(|| f(a, b))
        })
    }

    /// Sequences two IOs, discarding the first result (ZIO's `*>`).
    pub fn then<B: 'static>(self, other: IO<B>) -> IO<B> {
        IO::from_fn(move |dispatcher| {
            let _a = self.run_with(dispatcher)?;
            other.run_with(dispatcher)
        })
    }

    /// Runs a side effect on the success value, returning the original value.
    pub fn tap(self, f: impl Fn(&A) + Send + Sync + 'static) -> IO<A> {
        IO::from_fn(move |dispatcher| {
            let a = self.run_with(dispatcher)?;
            guarded(|| f(&a))?;
            Ok(a)
        })
    }
}

impl<A: Clone + Send + Sync + 'static> IO<A> {
    /// Runs `f` from `seed` until it breaks, in a loop rather than by recursion.
    pub fn tail_rec_m<B: 'static>(
        seed: A,
        f: impl Fn(A) -> IO<ControlFlow<B, A>> + Send + Sync + 'static,
    ) -> IO<B> {
        IO::from_fn(move |dispatcher| {
            let mut current = seed.clone();
            loop {
                match guarded(|| f(current))?.run_with(dispatcher)? {
                    ControlFlow::Continue(next) => current = next,
                    ControlFlow::Break(b) => return Ok(b),
                }
            }
        })
    }
}

// ============================================================
// Error handling
// ============================================================

impl<A: 'static> IO<A> {
    /// Transforms the error.
    pub fn map_error(self, f: impl Fn(Failure) -> Failure + Send + Sync + 'static) -> IO<A> {
        IO::from_fn(move |dispatcher| self.run_with(dispatcher).or_else(|e| Err(guarded(|| f(e))?)))
    }

    /// Recovers from an error by producing a new IO.
    pub fn catch(self, f: impl Fn(Failure) -> IO<A> + Send + Sync + 'static) -> IO<A> {
        IO::from_fn(move |dispatcher| match self.run_with(dispatcher) {
            Ok(a) => Ok(a),
            Err(e) => guarded(|| f(e))?.run_with(dispatcher),
        })
    }

    /// Falls back to another IO on error.
    pub fn or_else(self, other: IO<A>) -> IO<A> {
        IO::from_fn(move |dispatcher| match self.run_with(dispatcher) {
            Ok(a) => Ok(a),
            Err(_) => other.run_with(dispatcher),
        })
    }

    /// Makes this IO infallible by moving the error into the value.
    pub fn attempt(self) -> IO<Result<A, Failure>> {
        IO::from_fn(move |dispatcher| Ok(self.run_with(dispatcher)))
    }

    /// Runs this IO again on failure, up to `n` extra times.
    ///
    /// Cancellation is not retried.
    pub fn retry(self, n: usize) -> IO<A> {
        IO::from_fn(move |dispatcher| {
            let mut retries_left = n;
            loop {
                match self.run_with(dispatcher) {
                    Ok(a) => return Ok(a),
                    Err(e) if retries_left == 0 || e.is_cancelled() => return Err(e),
                    Err(e) => {
                        retries_left -= 1;
                        tracing::debug!(error = %e, retries_left, "retrying failed IO");
                    }
                }
            }
        })
    }
}

// ============================================================
// Resource safety
// ============================================================

impl IO<()> {
    /// Acquires a resource, uses it, and guarantees release even on failure.
    ///
    /// - `acquire`: IO that produces the resource
    /// - `use_fn`: Function that uses the resource (receives a reference)
    /// - `release`: Cleanup function that always runs after `use_fn` (on both success and error)
    ///
    /// If `acquire` fails, neither `use_fn` nor `release` run. A panicking
    /// `use_fn` fails the run after `release`. All three run again on every run
    /// of the returned IO.
    pub fn bracket<R: 'static, B: 'static>(
        acquire: IO<R>,
        use_fn: impl Fn(&R) -> IO<B> + Send + Sync + 'static,
        release: impl Fn(&R) + Send + Sync + 'static,
    ) -> IO<B> {
        IO::from_fn(move |dispatcher| {
            let resource = acquire.run_with(dispatcher)?;
            let result = guarded(|| use_fn(&resource)).and_then(|io| io.run_with(dispatcher));
            release(&resource);
            result
        })
    }
}

impl<A: 'static> IO<A> {
    /// Guarantees that the finalizer runs after this IO, regardless of success or failure.
    pub fn ensuring(self, finalizer: impl Fn() + Send + Sync + 'static) -> IO<A> {
        IO::from_fn(move |dispatcher| {
            let result = self.run_with(dispatcher);
            finalizer();
            result
        })
    }
}

// ============================================================
// Async interop
// ============================================================

#[cfg(feature = "tokio")]
impl<A: 'static> IO<A> {
    /// Creates an IO that builds a future and blocks on it, on every run.
    ///
    /// The thunk is suspended with [`Hint::Blocking`]. Must run inside a
    /// multi-thread tokio runtime; outside one the IO fails.
    pub fn from_future<Fut>(factory: impl Fn() -> Fut + Send + Sync + 'static) -> IO<A>
    where
        A: Send,
        Fut: std::future::Future<Output = anyhow::Result<A>>,
    {
        IO::suspend(Hint::Blocking, move || {
            let handle = tokio::runtime::Handle::try_current().map_err(Failure::new)?;
            tokio::task::block_in_place(|| handle.block_on(factory())).map_err(Failure::from)
        })
    }

    /// Converts this IO into a future that runs it once.
    pub async fn to_future(self) -> Result<A, Failure> {
        self.run()
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::{init_tracing, Declining, Offloading, Recorder};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, IO<usize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let io = IO::effect(move || c.fetch_add(1, Ordering::SeqCst) + 1);
        (count, io)
    }

    // ===== Constructors + execution =====

    #[test]
    fn succeed_returns_value() {
        let io = IO::succeed(42);
        assert_eq!(io.run().unwrap(), 42);
    }

    #[test]
    fn succeed_runs_repeatedly() {
        let io = IO::succeed("hello".to_string());
        assert_eq!(io.run().unwrap(), "hello");
        assert_eq!(io.run().unwrap(), "hello");
    }

    #[test]
    fn fail_returns_same_error_every_run() {
        let io: IO<i32> = IO::fail(anyhow::anyhow!("boom"));
        let first = io.run().unwrap_err();
        let second = io.run().unwrap_err();
        assert_eq!(first.to_string(), "boom");
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn effect_is_lazy() {
        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        let _io = IO::effect(move || {
            r.store(true, Ordering::SeqCst);
        });
        assert!(!ran.load(Ordering::SeqCst), "should not run until .run()");
    }

    #[test]
    fn effect_reruns_on_every_run() {
        let (count, io) = counter();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        let seen: Vec<usize> = (0..3).map(|_| io.run().unwrap()).collect();
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn clones_share_description_not_result() {
        let (count, io) = counter();
        let copy = io.clone();
        assert_eq!(io.run().unwrap(), 1);
        assert_eq!(copy.run().unwrap(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn effect_result_success() {
        let io = IO::effect_result(|| Ok(42));
        assert_eq!(io.run().unwrap(), 42);
    }

    #[test]
    fn effect_result_failure() {
        let io: IO<i32> = IO::effect_result(|| Err(anyhow::anyhow!("fail")));
        assert_eq!(io.run().unwrap_err().to_string(), "fail");
    }

    #[test]
    fn suspend_captures_panics() {
        let io: IO<i32> = IO::suspend(Hint::Blocking, || panic!("worker exploded"));
        let err = io.run().unwrap_err();
        assert_eq!(err.panic().map(|p| p.message()), Some("worker exploded"));
    }

    #[test]
    fn continuation_panics_become_failures() {
        let mapped = IO::succeed(1).map(|_| -> i32 { panic!("in map") });
        assert_eq!(mapped.run().unwrap_err().panic().map(|p| p.message()), Some("in map"));

        let chained = IO::succeed(1).flat_map(|_| -> IO<i32> { panic!("in flat_map") });
        assert_eq!(chained.run().unwrap_err().panic().map(|p| p.message()), Some("in flat_map"));

        let recovered = IO::<i32>::fail(anyhow::anyhow!("x")).catch(|_| panic!("in catch"));
        assert_eq!(recovered.run().unwrap_err().panic().map(|p| p.message()), Some("in catch"));

        let deferred = IO::<i32>::defer(|| panic!("in defer"));
        assert_eq!(deferred.run().unwrap_err().panic().map(|p| p.message()), Some("in defer"));
    }

    #[test]
    fn suspend_runs_thunk_once_when_job_is_called_twice() {
        struct Twice;

        impl Dispatch for Twice {
            fn dispatch(&self, _hint: Hint, job: &mut (dyn FnMut() + Send)) {
                job();
                job();
            }
        }

        init_tracing();
        let (count, io) = counter();
        assert_eq!(io.run_with(&Twice).unwrap(), 1);
        assert_eq!(io.run_with(&Twice).unwrap(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn blocking_thunk_can_run_on_another_thread() {
        let caller = std::thread::current().id();
        let io = IO::suspend(Hint::Blocking, || Ok(std::thread::current().id()))
            .zip(IO::effect(|| std::thread::current().id()));
        let (blocking, delayed) = io.run_with(&Offloading).unwrap();
        assert_ne!(blocking, caller);
        assert_eq!(delayed, caller);
    }

    #[test]
    fn offloaded_thunk_keeps_its_error_and_panics() {
        let failure = Failure::msg("remote");
        let f = failure.clone();
        let io = IO::<i32>::suspend(Hint::InterruptibleOnce, move || Err(f.clone()));
        assert!(io.run_with(&Offloading).unwrap_err().ptr_eq(&failure));

        let io = IO::<i32>::suspend(Hint::Blocking, || panic!("remote panic"));
        let err = io.run_with(&Offloading).unwrap_err();
        assert_eq!(err.panic().map(|p| p.message()), Some("remote panic"));
    }

    #[test]
    fn suspend_hands_hint_to_dispatcher() {
        let recorder = Recorder::default();
        for hint in Hint::ALL {
            IO::suspend(hint, || Ok(())).run_with(&recorder).unwrap();
        }
        assert_eq!(recorder.hints(), Hint::ALL.to_vec());
    }

    #[test]
    fn declined_job_is_cancelled_not_stale() {
        init_tracing();
        let (count, io) = counter();
        assert_eq!(io.run().unwrap(), 1);
        let err = io.run_with(&Declining).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pure_values_bypass_dispatcher() {
        let recorder = Recorder::default();
        let io = IO::succeed(1).zip(IO::<i32>::fail(anyhow::anyhow!("x")).or_else(IO::succeed(2)));
        assert_eq!(io.run_with(&recorder).unwrap(), (1, 2));
        assert!(recorder.hints().is_empty());
    }

    #[test]
    fn defer_rebuilds_on_every_run() {
        let built = Arc::new(AtomicUsize::new(0));
        let b = built.clone();
        let io = IO::defer(move || {
            b.fetch_add(1, Ordering::SeqCst);
            IO::succeed(7)
        });
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert_eq!(io.run().unwrap(), 7);
        assert_eq!(io.run().unwrap(), 7);
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn from_result_ok() {
        let io = IO::from_result(Ok::<i32, anyhow::Error>(42));
        assert_eq!(io.run().unwrap(), 42);
    }

    #[test]
    fn from_result_err() {
        let io = IO::from_result(Err::<i32, _>(anyhow::anyhow!("nope")));
        assert_eq!(io.run().unwrap_err().to_string(), "nope");
    }

    #[test]
    fn from_option_some() {
        let io = IO::from_option(Some(42), || anyhow::anyhow!("missing"));
        assert_eq!(io.run().unwrap(), 42);
    }

    #[test]
    fn from_option_none() {
        let io = IO::from_option(None::<i32>, || anyhow::anyhow!("missing"));
        let err = io.run().unwrap_err();
        assert_eq!(err.to_string(), "missing");
    }

    #[test]
    fn run_or_panic_success() {
        let io = IO::succeed(42);
        assert_eq!(io.run_or_panic(), 42);
    }

    #[test]
    #[should_panic(expected = "IO::run_or_panic failed")]
    fn run_or_panic_failure() {
        let io: IO<i32> = IO::fail(anyhow::anyhow!("boom"));
        io.run_or_panic();
    }

    // ===== Monadic combinators =====

    #[test]
    fn map_transforms_value() {
        let io = IO::succeed(21).map(|x| x * 2);
        assert_eq!(io.run().unwrap(), 42);
    }

    #[test]
    fn map_preserves_error() {
        let io: IO<i32> = IO::<i32>::fail(anyhow::anyhow!("err")).map(|x| x * 2);
        assert_eq!(io.run().unwrap_err().to_string(), "err");
    }

    #[test]
    fn flat_map_chains() {
        let io = IO::succeed(10).flat_map(|x| IO::succeed(x + 5));
        assert_eq!(io.run().unwrap(), 15);
    }

    #[test]
    fn flat_map_runs_steps_in_sequence_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (o1, o2) = (order.clone(), order.clone());
        let io = IO::effect(move || o1.lock().unwrap().push("first")).flat_map(move |_| {
            let o = o2.clone();
            IO::effect(move || o.lock().unwrap().push("second"))
        });
        io.run().unwrap();
        io.run().unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn flat_map_short_circuits_on_first_error() {
        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        let io: IO<i32> = IO::fail(anyhow::anyhow!("first")).flat_map(move |x| {
            r.store(true, Ordering::SeqCst);
            IO::succeed(x)
        });
        assert!(io.run().is_err());
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn flat_map_short_circuits_on_second_error() {
        let io = IO::succeed(10).flat_map(|_| IO::<i32>::fail(anyhow::anyhow!("second")));
        assert_eq!(io.run().unwrap_err().to_string(), "second");
    }

    #[test]
    fn and_then_is_flat_map_alias() {
        let io = IO::succeed(10).and_then(|x| IO::succeed(x + 1));
        assert_eq!(io.run().unwrap(), 11);
    }

    #[test]
    fn zip_combines_two_ios() {
        let io = IO::succeed(1).zip(IO::succeed(2));
        assert_eq!(io.run().unwrap(), (1, 2));
    }

    #[test]
    fn zip_short_circuits_second() {
        let io = IO::succeed(1).zip(IO::<i32>::fail(anyhow::anyhow!("second")));
        assert!(io.run().is_err());
    }

    #[test]
    fn zip_with_combines_with_function() {
        let io = IO::succeed(10).zip_with(IO::succeed(20), |a, b| a + b);
        assert_eq!(io.run().unwrap(), 30);
    }

    #[test]
    fn then_discards_first() {
        let io = IO::succeed(1).then(IO::succeed(2));
        assert_eq!(io.run().unwrap(), 2);
    }

    #[test]
    fn tap_runs_side_effect() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        let io = IO::succeed(42).tap(move |x| {
            s.store(*x as usize, Ordering::SeqCst);
        });
        assert_eq!(io.run().unwrap(), 42);
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn tail_rec_m_is_stack_safe() {
        let io = IO::tail_rec_m((0u64, 0u64), |(i, acc)| {
            if i == 100_000 {
                IO::succeed(ControlFlow::Break(acc))
            } else {
                IO::succeed(ControlFlow::Continue((i + 1, acc + i)))
            }
        });
        assert_eq!(io.run().unwrap(), 4_999_950_000);
    }

    #[test]
    fn tail_rec_m_restarts_from_seed() {
        let io = IO::tail_rec_m(3, |n| {
            let step = if n == 0 { ControlFlow::Break("done") } else { ControlFlow::Continue(n - 1) };
            IO::succeed(step)
        });
        assert_eq!(io.run().unwrap(), "done");
        assert_eq!(io.run().unwrap(), "done");
    }

    // Monad laws

    #[test]
    fn monad_left_identity() {
        let f = |x: i32| IO::succeed(x + 1);
        let left = IO::succeed(10).flat_map(f);
        let right = f(10);
        assert_eq!(left.run().unwrap(), right.run().unwrap());
    }

    #[test]
    fn monad_right_identity() {
        let m = IO::succeed(42);
        let result = m.clone().flat_map(IO::succeed);
        assert_eq!(m.run().unwrap(), result.run().unwrap());
    }

    #[test]
    fn monad_associativity() {
        let f = |x: i32| IO::succeed(x + 1);
        let g = |x: i32| IO::succeed(x * 2);
        let left = IO::succeed(10).flat_map(f).flat_map(g);
        let right = IO::succeed(10).flat_map(move |x| f(x).flat_map(g));
        assert_eq!(left.run().unwrap(), right.run().unwrap());
    }

    // ===== Error handling =====

    #[test]
    fn map_error_transforms_error() {
        let io: IO<i32> = IO::fail(anyhow::anyhow!("original")).map_error(|_| Failure::msg("transformed"));
        assert_eq!(io.run().unwrap_err().to_string(), "transformed");
    }

    #[test]
    fn catch_recovers_from_error() {
        let io: IO<i32> = IO::fail(anyhow::anyhow!("err")).catch(|_| IO::succeed(99));
        assert_eq!(io.run().unwrap(), 99);
    }

    #[test]
    fn catch_preserves_success() {
        let io = IO::succeed(42).catch(|_| IO::succeed(99));
        assert_eq!(io.run().unwrap(), 42);
    }

    #[test]
    fn or_else_falls_back() {
        let io: IO<i32> = IO::fail(anyhow::anyhow!("err")).or_else(IO::succeed(99));
        assert_eq!(io.run().unwrap(), 99);
    }

    #[test]
    fn attempt_wraps_both_outcomes() {
        assert_eq!(IO::succeed(42).attempt().run().unwrap().unwrap(), 42);
        let failed: IO<i32> = IO::fail(anyhow::anyhow!("err"));
        let outcome = failed.attempt().run().unwrap();
        assert_eq!(outcome.unwrap_err().to_string(), "err");
    }

    #[test]
    fn retry_succeeds_on_nth_attempt() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let io = IO::effect_result(move || {
            let count = c.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                Err(anyhow::anyhow!("not yet"))
            } else {
                Ok(42)
            }
        })
        .retry(3);
        assert_eq!(io.run().unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn retry_exhausts_attempts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let io: IO<i32> = IO::effect_result(move || {
            c.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("always fails"))
        })
        .retry(2);
        assert!(io.run().is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3); // initial + 2 retries
    }

    #[test]
    fn retry_does_not_retry_cancellation() {
        init_tracing();
        let io = IO::suspend(Hint::InterruptibleOnce, || Ok(1)).retry(5);
        assert!(io.run_with(&Declining).unwrap_err().is_cancelled());
    }

    // ===== Resource safety =====

    #[test]
    fn bracket_runs_all_three_on_every_run() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let o1 = order.clone();
        let o2 = order.clone();
        let o3 = order.clone();

        let io = IO::bracket(
            IO::effect(move || {
                o1.lock().unwrap().push("acquire");
                "resource"
            }),
            move |r| {
                o2.lock().unwrap().push("use");
                IO::succeed(r.len())
            },
            move |_r| {
                o3.lock().unwrap().push("release");
            },
        );

        assert_eq!(io.run().unwrap(), 8);
        assert_eq!(io.run().unwrap(), 8);
        assert_eq!(
            *order.lock().unwrap(),
            vec!["acquire", "use", "release", "acquire", "use", "release"]
        );
    }

    #[test]
    fn bracket_releases_on_use_error() {
        let released = Arc::new(AtomicBool::new(false));
        let r = released.clone();

        let io = IO::bracket(
            IO::succeed(42),
            |_| IO::<i32>::fail(anyhow::anyhow!("use failed")),
            move |_| {
                r.store(true, Ordering::SeqCst);
            },
        );

        assert!(io.run().is_err());
        assert!(released.load(Ordering::SeqCst), "release should run on use error");
    }

    #[test]
    fn bracket_releases_when_use_panics() {
        let released = Arc::new(AtomicBool::new(false));
        let r = released.clone();

        let io = IO::bracket(
            IO::succeed(42),
            |_| -> IO<i32> { panic!("use exploded") },
            move |_| {
                r.store(true, Ordering::SeqCst);
            },
        );

        let err = io.run().unwrap_err();
        assert_eq!(err.panic().map(|p| p.message()), Some("use exploded"));
        assert!(released.load(Ordering::SeqCst), "release should run when use panics");
    }

    #[test]
    fn bracket_does_not_release_on_acquire_error() {
        let released = Arc::new(AtomicBool::new(false));
        let r = released.clone();

        let io = IO::bracket(
            IO::<i32>::fail(anyhow::anyhow!("acquire failed")),
            |_| IO::succeed(0),
            move |_| {
                r.store(true, Ordering::SeqCst);
            },
        );

        assert!(io.run().is_err());
        assert!(!released.load(Ordering::SeqCst), "release should NOT run on acquire error");
    }

    #[test]
    fn ensuring_runs_on_error() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let io: IO<i32> = IO::fail(anyhow::anyhow!("err")).ensuring(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(io.run().unwrap_err().to_string(), "err");
        assert_eq!(io.run().unwrap_err().to_string(), "err");
        assert_eq!(ran.load(Ordering::SeqCst), 2);
    }

    // ===== Async interop =====

    #[cfg(feature = "tokio")]
    #[tokio::test(flavor = "multi_thread")]
    async fn from_future_success() {
        let io = IO::from_future(|| async { Ok(42) });
        assert_eq!(io.run().unwrap(), 42);
    }

    #[cfg(feature = "tokio")]
    #[tokio::test(flavor = "multi_thread")]
    async fn from_future_builds_future_per_run() {
        let polled = Arc::new(AtomicUsize::new(0));
        let p = polled.clone();
        let io = IO::from_future(move || {
            let p = p.clone();
            async move { Ok(p.fetch_add(1, Ordering::SeqCst) + 1) }
        });
        assert_eq!(io.run().unwrap(), 1);
        assert_eq!(io.run().unwrap(), 2);
    }

    #[cfg(feature = "tokio")]
    #[tokio::test(flavor = "multi_thread")]
    async fn from_future_error() {
        let io: IO<i32> = IO::from_future(|| async { Err(anyhow::anyhow!("async fail")) });
        assert_eq!(io.run().unwrap_err().to_string(), "async fail");
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn from_future_outside_runtime_fails() {
        let io: IO<i32> = IO::from_future(|| async { Ok(1) });
        assert!(io.run().is_err());
    }

    #[cfg(feature = "tokio")]
    #[tokio::test(flavor = "multi_thread")]
    async fn to_future_error() {
        let io: IO<i32> = IO::fail(anyhow::anyhow!("err"));
        let result = io.to_future().await;
        assert_eq!(result.unwrap_err().to_string(), "err");
    }

    // ===== Debug + Task alias =====

    #[test]
    fn debug_impl() {
        let io = IO::succeed(42);
        assert!(format!("{:?}", io).contains("IO"));
    }

    #[test]
    fn task_alias() {
        let task: Task<i32> = IO::succeed(42);
        assert_eq!(task.run().unwrap(), 42);
    }
}
