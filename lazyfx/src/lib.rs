//! lazyfx: deferred, hint-classified effect suspension for Rust.
//!
//! This is the umbrella crate that re-exports all lazyfx functionality.
//!
//! # Quick Start
//! ```
//! use lazyfx::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let c = counter.clone();
//! let tick = IoKind::delay(move || Ok(c.fetch_add(1, Ordering::SeqCst) + 1));
//!
//! assert_eq!(tick.run().unwrap(), 1);
//! assert_eq!(tick.run().unwrap(), 2);
//!
//! // The same contract, lifted over an optional result.
//! let lifted = OptionTKind::<IoKind>::blocking(|| Ok("found"));
//! assert_eq!(lifted.get_or_else("missing").run().unwrap(), "found");
//! ```

pub use lazyfx_core::*;
pub use lazyfx_io::{dispatch, instances, io, Dispatch, Inline, IoKind, Task, IO};

pub mod prelude {
    pub use lazyfx_core::prelude::*;
    pub use lazyfx_io::prelude::*;
}
