//! Mailbox and handoff channels for passing messages between cooperating
//! tasks, sync or async.
//!
//! Two primitives, each guarded by its own lock so every operation on one
//! instance happens strictly before or after every other:
//!
//! - [`mailbox`]: an unbounded multi-producer multi-consumer FIFO whose
//!   readers park while it is empty, also consumable as a `Stream` or a
//!   blocking `Iterator`.
//! - [`handoff`]: a capacity-one channel that hands a message directly to a
//!   waiting reader and makes a second writer wait until the first message
//!   is read.
//!
//! Both support blocking (`*_sync`) and async callers on the same instance.

pub mod error;

// Channel type modules
pub mod handoff;
pub mod mailbox;
pub mod telemetry;

// Internal utilities - not part of public API but exposed for crate use
mod internal;
mod sync_util;

pub use error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
pub use handoff::Handoff;
pub use mailbox::{Mailbox, WakePolicy};
