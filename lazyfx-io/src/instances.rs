//! Capability instances for [`IO`].

use std::ops::ControlFlow;
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use lazyfx_core::clock::Clock;
use lazyfx_core::defer::Defer;
use lazyfx_core::error::MonadError;
use lazyfx_core::failure::Failure;
use lazyfx_core::hint::Hint;
use lazyfx_core::kind::{Effect, Value};
use lazyfx_core::monad::Monad;
use lazyfx_core::sync::SyncEffect;

use crate::io::IO;

/// Kind marker for [`IO`]: `<IoKind as Effect>::Of<A>` is `IO<A>`.
///
/// # Examples
/// ```
/// use lazyfx_core::prelude::*;
/// use lazyfx_io::IoKind;
///
/// let io = IoKind::blocking(|| Ok("read".len()));
/// assert_eq!(io.run().unwrap(), 4);
///
/// let fallback = IoKind::handle_error(IoKind::raise_error::<usize>(Failure::msg("gone")), |_| 0);
/// assert_eq!(fallback.run().unwrap(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {}

fn process_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

impl Effect for IoKind {
    type Of<A: Value> = IO<A>;
}

impl Monad for IoKind {
    fn pure<A: Value>(a: A) -> IO<A> {
        IO::succeed(a)
    }

    fn flat_map<A, B, K>(fa: IO<A>, f: K) -> IO<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<B> + Send + Sync + 'static,
    {
        fa.flat_map(f)
    }

    fn tail_rec_m<A, B, K>(seed: A, f: K) -> IO<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> Self::Of<ControlFlow<B, A>> + Send + Sync + 'static,
    {
        IO::tail_rec_m(seed, f)
    }

    fn map<A, B, K>(fa: IO<A>, f: K) -> IO<B>
    where
        A: Value,
        B: Value,
        K: Fn(A) -> B + Send + Sync + 'static,
    {
        fa.map(f)
    }
}

impl MonadError for IoKind {
    type Error = Failure;

    fn raise_error<A: Value>(e: Failure) -> IO<A> {
        IO::fail(e)
    }

    fn handle_error_with<A, K>(fa: IO<A>, f: K) -> IO<A>
    where
        A: Value,
        K: Fn(Self::Error) -> Self::Of<A> + Send + Sync + 'static,
    {
        fa.catch(f)
    }
}

impl Clock for IoKind {
    fn monotonic() -> IO<Duration> {
        IO::from_fn(|_| Ok(process_start().elapsed()))
    }

    fn real_time() -> IO<Duration> {
        IO::from_fn(|_| SystemTime::now().duration_since(UNIX_EPOCH).map_err(Failure::new))
    }
}

impl Defer for IoKind {
    fn defer<A, K>(thunk: K) -> IO<A>
    where
        A: Value,
        K: Fn() -> Self::Of<A> + Send + Sync + 'static,
    {
        IO::defer(thunk)
    }
}

impl SyncEffect for IoKind {
    fn suspend<A, K>(hint: Hint, thunk: K) -> IO<A>
    where
        A: Value,
        K: Fn() -> Result<A, Failure> + Send + Sync + 'static,
    {
        IO::suspend(hint, thunk)
    }
}
