use std::time::Duration;

use crate::kind::Value;
use crate::monad::Monad;

/// Time queries, evaluated each time the returned effect runs.
pub trait Clock: Monad {
    /// Monotonic time, only meaningful as a difference between two reads.
    fn monotonic() -> Self::Of<Duration>;

    /// Wall-clock time since the UNIX epoch.
    fn real_time() -> Self::Of<Duration>;

    /// Runs `fa`, pairing its value with the monotonic time it took.
    fn timed<A: Value>(fa: Self::Of<A>) -> Self::Of<(Duration, A)> {
        Self::flat_map::<Duration, (Duration, A), _>(Self::monotonic(), move |start| {
            Self::flat_map::<A, (Duration, A), _>(fa.clone(), move |a| {
                Self::map::<Duration, (Duration, A), _>(Self::monotonic(), move |end| {
                    (end.saturating_sub(start), a.clone())
                })
            })
        })
    }
}
