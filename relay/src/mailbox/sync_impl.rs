use super::core::MailboxShared;
use super::WakePolicy;
use crate::error::{CloseError, RecvError, SendError, TryRecvError};
use crate::internal::wait_list::Waiter;
use crate::sync_util;

use std::fmt;
use std::iter::FusedIterator;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::Poll;

/// An owning handle to a mailbox. Clone it to hand the same mailbox to
/// another task; the mailbox closes when the last handle is dropped.
pub struct Mailbox<T> {
  pub(crate) shared: Arc<MailboxShared<T>>,
}

impl<T> fmt::Debug for Mailbox<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Mailbox").field("shared", &self.shared).finish()
  }
}

impl<T> Default for Mailbox<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Mailbox<T> {
  /// Creates an empty mailbox that broadcasts wakes on send.
  pub fn new() -> Self {
    Self::with_policy(WakePolicy::default())
  }

  /// Creates an empty mailbox with the given wake policy.
  pub fn with_policy(policy: WakePolicy) -> Self {
    Mailbox {
      shared: Arc::new(MailboxShared::new(policy)),
    }
  }

  /// Appends `message` and resumes parked readers. Never waits.
  ///
  /// Fails only if the mailbox has been closed, in which case the message is
  /// handed back.
  pub fn send(&self, message: T) -> Result<(), SendError<T>> {
    self.shared.send(message)
  }

  /// Takes the oldest message without waiting.
  pub fn try_pop(&self) -> Result<T, TryRecvError> {
    self.shared.try_pop()
  }

  /// Takes the oldest message, blocking the current thread while the mailbox
  /// is empty.
  ///
  /// Returns `Err(RecvError::Closed)` only once the mailbox is closed and
  /// every buffered message has been taken.
  pub fn pop_sync(&self) -> Result<T, RecvError> {
    self.shared.pop_sync()
  }

  /// A blocking iterator over the messages. See [`Iter`].
  pub fn iter(&self) -> Iter<T> {
    Iter {
      shared: Arc::clone(&self.shared),
    }
  }

  /// Closes the mailbox. Parked readers wake up; messages already buffered
  /// can still be popped, new sends fail.
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close()
  }

  /// Returns `true` once the mailbox has been closed.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// Number of messages currently buffered.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Number of readers currently parked on this mailbox.
  pub fn waiting_readers(&self) -> usize {
    self.shared.waiting_readers()
  }
}

impl<T> MailboxShared<T> {
  pub(crate) fn pop_sync(&self) -> Result<T, RecvError> {
    let mut ticket = None;
    loop {
      if let Poll::Ready(result) = self.poll_pop(&mut ticket, Waiter::current_thread, None) {
        return result;
      }
      sync_util::park_thread();
    }
  }
}

impl<T> Clone for Mailbox<T> {
  fn clone(&self) -> Self {
    self.shared.handles.fetch_add(1, Ordering::Relaxed);
    Mailbox {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T> Drop for Mailbox<T> {
  fn drop(&mut self) {
    if self.shared.handles.fetch_sub(1, Ordering::AcqRel) == 1 {
      // Already closed explicitly is fine.
      let _ = self.shared.close();
    }
  }
}

/// Blocking, non-restartable iterator over a mailbox.
///
/// Each `next` destructively pops one message, blocking while the mailbox is
/// empty. It does not keep the mailbox open and returns `None` once the
/// mailbox is closed and drained.
pub struct Iter<T> {
  shared: Arc<MailboxShared<T>>,
}

impl<T> fmt::Debug for Iter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Iter").finish_non_exhaustive()
  }
}

impl<T> Iterator for Iter<T> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.shared.pop_sync().ok()
  }
}

impl<T> FusedIterator for Iter<T> {}
