//! An unbounded, multi-producer multi-consumer mailbox.
//!
//! ## Behavior
//!
//! - **Unbounded FIFO**: `send` never waits. Messages are delivered in the
//!   order their `send` calls entered the channel.
//! - **Exactly-once delivery**: Each message goes to exactly one `pop`, no
//!   matter how many readers are waiting. Which waiting reader wins is not
//!   specified.
//! - **Broadcast wake**: By default a `send` wakes every parked reader and
//!   lets them race for the message; the losers park again. Use
//!   [`WakePolicy::One`] to wake a single reader per message instead. Both are
//!   indistinguishable from the outside.
//! - **Sequence view**: [`Mailbox::messages`] (a `Stream`) and
//!   [`Mailbox::iter`] (a blocking `Iterator`) consume messages one by one.
//!   They do not keep the channel open: once every `Mailbox` handle is dropped
//!   or [`Mailbox::close`] is called, they drain what is left and end.
//! - **Sync/Async Agnostic**: Blocking and async readers can share one
//!   mailbox.

mod async_impl;
mod core;
mod sync_impl;

#[cfg(test)]
mod tests;

pub use async_impl::{Messages, PopFuture};
pub use sync_impl::{Iter, Mailbox};

/// How a `send` resumes parked readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WakePolicy {
  /// Wake every parked reader; they re-contend for the buffer.
  #[default]
  Broadcast,
  /// Wake only the longest-parked reader.
  One,
}

/// Creates a new mailbox with the default [`WakePolicy::Broadcast`].
pub fn channel<T>() -> Mailbox<T> {
  Mailbox::new()
}
