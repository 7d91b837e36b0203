pub use crate::clock::Clock;
pub use crate::defer::Defer;
pub use crate::error::MonadError;
pub use crate::failure::{Cancelled, Failure};
pub use crate::hint::Hint;
pub use crate::kind::{Effect, Value};
pub use crate::monad::Monad;
pub use crate::option_t::{OptionT, OptionTKind};
pub use crate::sync::SyncEffect;
