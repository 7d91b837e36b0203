//! lazyfx-core: the suspension contract for deferred, composable effects.
//!
//! This crate defines the vocabulary an effect type implements: a scheduling
//! [`Hint`], small capability traits ([`Monad`], [`MonadError`], [`Clock`],
//! [`Defer`]) and [`SyncEffect`], which requires all of them and adds
//! hint-tagged suspension. [`OptionT`] derives every capability for an
//! optional-result wrapper around any conforming effect kind.

pub mod clock;
pub mod defer;
pub mod error;
pub mod failure;
pub mod hint;
pub mod kind;
pub mod monad;
pub mod option_t;
pub mod panic;
pub mod prelude;
pub mod sync;

pub use crate::clock::Clock;
pub use crate::defer::Defer;
pub use crate::error::MonadError;
pub use crate::failure::{Cancelled, Failure};
pub use crate::hint::Hint;
pub use crate::kind::{Effect, Value};
pub use crate::monad::Monad;
pub use crate::option_t::{OptionT, OptionTKind};
pub use crate::panic::{catch_panic, Panicked};
pub use crate::sync::SyncEffect;
