use std::fmt;

/// How a suspended thunk should be scheduled by the runtime that runs it.
///
/// The set is closed: every runtime matches on it exhaustively, so adding a
/// variant is a breaking change for all of them.
///
/// # Examples
/// ```
/// use lazyfx_core::hint::Hint;
///
/// assert!(!Hint::Delay.is_blocking());
/// assert!(Hint::Blocking.is_blocking());
/// assert_eq!(Hint::interruptible(true), Hint::InterruptibleMany);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hint {
    /// Cheap synchronous work, safe to run inline on any worker.
    Delay,
    /// May block the calling worker (I/O, locks).
    Blocking,
    /// Blocking work that may be interrupted once on cancellation.
    InterruptibleOnce,
    /// Blocking work that may be interrupted any number of times.
    InterruptibleMany,
}

impl Hint {
    /// Every hint, in declaration order.
    pub const ALL: [Hint; 4] = [
        Hint::Delay,
        Hint::Blocking,
        Hint::InterruptibleOnce,
        Hint::InterruptibleMany,
    ];

    /// Maps the `many` flag of `interruptible(many, thunk)` to its hint.
    pub const INTERRUPTIBLE_TABLE: [(bool, Hint); 2] = [
        (false, Hint::InterruptibleOnce),
        (true, Hint::InterruptibleMany),
    ];

    /// Looks up the hint for an interruptible suspension in [`Hint::INTERRUPTIBLE_TABLE`].
    pub const fn interruptible(many: bool) -> Hint {
        Self::INTERRUPTIBLE_TABLE[many as usize].1
    }

    /// Returns `true` if the thunk may block the thread it runs on.
    pub const fn is_blocking(self) -> bool {
        match self {
            Hint::Delay => false,
            Hint::Blocking | Hint::InterruptibleOnce | Hint::InterruptibleMany => true,
        }
    }

    /// Returns `true` if the runtime may ask the thunk to stop while in flight.
    pub const fn is_interruptible(self) -> bool {
        match self {
            Hint::Delay | Hint::Blocking => false,
            Hint::InterruptibleOnce | Hint::InterruptibleMany => true,
        }
    }

    /// Snake-case name, as rendered by `Display`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Hint::Delay => "delay",
            Hint::Blocking => "blocking",
            Hint::InterruptibleOnce => "interruptible_once",
            Hint::InterruptibleMany => "interruptible_many",
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
