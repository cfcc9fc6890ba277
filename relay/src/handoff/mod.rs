//! A capacity-one handoff channel with writer backpressure.
//!
//! ## Behavior
//!
//! - **One outstanding message**: The channel holds at most one unread
//!   message. A `write` into an empty channel completes immediately; a second
//!   `write` before that message is read waits until a `read` frees the slot.
//! - **Direct handoff**: If a reader is already waiting when a `write`
//!   arrives, the message goes straight to that reader and the slot stays
//!   empty.
//! - **Ordered promotion**: When a `read` drains the slot while writers are
//!   waiting, the longest-waiting writer's message moves into the slot in the
//!   same step, so writers resume in the order they arrived.
//! - **Closing**: [`Handoff::close`], or dropping every handle, wakes waiting
//!   readers with [`RecvError::Closed`](crate::error::RecvError::Closed) and
//!   returns waiting writers' messages in
//!   [`SendError::Closed`](crate::error::SendError::Closed). A message
//!   already in the slot can still be read.
//!
//! This is a buffered rendezvous, not a strict one: a writer with no reader
//! waiting does not wait for one.

mod async_impl;
mod core;
mod sync_impl;


pub use async_impl::{ReadFuture, WriteFuture};
pub use sync_impl::Handoff;

/// Creates a new, empty handoff channel.
pub fn channel<T>() -> Handoff<T> {
  Handoff::new()
}
