//! lazyfx-io: a lazy, re-runnable, hint-aware IO effect type for lazyfx.
//!
//! Provides `IO<A>`, a deferred computation type inspired by ZIO, and
//! `IoKind`, which implements every lazyfx capability for it. Nothing executes
//! until `.run()` is called, and every call executes again.
//!
//! # Examples
//!
//! ```
//! use lazyfx_core::prelude::*;
//! use lazyfx_io::{IoKind, IO};
//!
//! let io = IO::succeed(42).map(|x| x * 2);
//! assert_eq!(io.run().unwrap(), 84);
//!
//! let read = IoKind::blocking(|| Ok(std::env::args().count()));
//! assert!(read.run().unwrap() >= 1);
//! ```

pub mod dispatch;
pub mod instances;
pub mod io;

pub use dispatch::{Dispatch, Inline};
pub use instances::IoKind;
pub use io::{Task, IO};

pub mod prelude {
    pub use crate::dispatch::{Dispatch, Inline};
    pub use crate::instances::IoKind;
    pub use crate::io::{Task, IO};
}
