use super::core::MailboxShared;
use super::sync_impl::Mailbox;
use crate::error::RecvError;
use crate::internal::wait_list::{Ticket, Waiter};

use futures_core::stream::{FusedStream, Stream};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

impl<T> Mailbox<T> {
  /// Takes the oldest message, waiting while the mailbox is empty.
  ///
  /// Resolves to `Err(RecvError::Closed)` only once the mailbox is closed and
  /// drained. Dropping the future before it resolves withdraws the reader
  /// without losing any message.
  pub fn pop(&self) -> PopFuture<'_, T> {
    PopFuture {
      shared: &self.shared,
      ticket: None,
    }
  }

  /// A lazy stream over the messages. See [`Messages`].
  pub fn messages(&self) -> Messages<T> {
    Messages {
      shared: Arc::clone(&self.shared),
      ticket: None,
      terminated: false,
    }
  }
}

// --- Future Implementation ---

#[must_use = "futures do nothing unless you .await or poll them"]
pub struct PopFuture<'a, T> {
  shared: &'a MailboxShared<T>,
  ticket: Option<Ticket>,
}

impl<T> fmt::Debug for PopFuture<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PopFuture").field("ticket", &self.ticket).finish()
  }
}

impl<T> Future for PopFuture<'_, T> {
  type Output = Result<T, RecvError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    let waker = cx.waker();
    this
      .shared
      .poll_pop(&mut this.ticket, || Waiter::Async(waker.clone()), Some(waker))
  }
}

impl<T> Drop for PopFuture<'_, T> {
  fn drop(&mut self) {
    if let Some(ticket) = self.ticket.take() {
      self.shared.cancel_pop(ticket);
    }
  }
}

// --- Stream Implementation ---

/// Lazy, non-restartable stream over a mailbox.
///
/// Every item is destructively popped; nothing is read ahead. The stream
/// holds the mailbox's memory but not its liveness: it ends after the mailbox
/// is closed (explicitly or by dropping every [`Mailbox`] handle) and drained.
#[must_use = "streams do nothing unless polled"]
pub struct Messages<T> {
  shared: Arc<MailboxShared<T>>,
  ticket: Option<Ticket>,
  terminated: bool,
}

impl<T> fmt::Debug for Messages<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Messages")
      .field("ticket", &self.ticket)
      .field("terminated", &self.terminated)
      .finish()
  }
}

impl<T> Stream for Messages<T> {
  type Item = T;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
    let this = self.get_mut();
    if this.terminated {
      return Poll::Ready(None);
    }

    let waker = cx.waker();
    match this
      .shared
      .poll_pop(&mut this.ticket, || Waiter::Async(waker.clone()), Some(waker))
    {
      Poll::Ready(Ok(message)) => Poll::Ready(Some(message)),
      Poll::Ready(Err(RecvError::Closed)) => {
        this.terminated = true;
        Poll::Ready(None)
      }
      Poll::Pending => Poll::Pending,
    }
  }
}

impl<T> FusedStream for Messages<T> {
  fn is_terminated(&self) -> bool {
    self.terminated
  }
}

impl<T> Drop for Messages<T> {
  fn drop(&mut self) {
    if let Some(ticket) = self.ticket.take() {
      self.shared.cancel_pop(ticket);
    }
  }
}
