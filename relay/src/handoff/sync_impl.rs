use super::core::{HandoffShared, Progress};
use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::wait_list::Waiter;
use crate::sync_util;

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::Poll;

/// An owning handle to a handoff channel. Typically one clone sits with the
/// writer and one with the reader; the channel closes when the last handle is
/// dropped.
pub struct Handoff<T> {
  pub(crate) shared: Arc<HandoffShared<T>>,
}

impl<T> fmt::Debug for Handoff<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Handoff").field("shared", &self.shared).finish()
  }
}

impl<T> Default for Handoff<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Handoff<T> {
  pub fn new() -> Self {
    Handoff {
      shared: Arc::new(HandoffShared::new()),
    }
  }

  /// Writes a message, blocking the current thread while the slot is
  /// occupied.
  ///
  /// Returns once the message was handed to a waiting reader or stored in the
  /// slot.
  pub fn write_sync(&self, message: T) -> Result<(), SendError<T>> {
    let ticket = match self.shared.start_write(message, Waiter::current_thread)? {
      Progress::Ready(()) => return Ok(()),
      Progress::Parked(ticket) => ticket,
    };
    loop {
      sync_util::park_thread();
      if let Poll::Ready(result) = self.shared.poll_write(ticket, None) {
        return result;
      }
    }
  }

  /// Writes a message only if that needs no waiting.
  pub fn try_write(&self, message: T) -> Result<(), TrySendError<T>> {
    self.shared.try_write(message)
  }

  /// Reads a message, blocking the current thread while the slot is empty.
  pub fn read_sync(&self) -> Result<T, RecvError> {
    let ticket = match self.shared.start_read(Waiter::current_thread) {
      Progress::Ready(result) => return result,
      Progress::Parked(ticket) => ticket,
    };
    loop {
      sync_util::park_thread();
      if let Poll::Ready(result) = self.shared.poll_read(ticket, None) {
        return result;
      }
    }
  }

  /// Reads the slot's message without waiting.
  pub fn try_read(&self) -> Result<T, TryRecvError> {
    self.shared.try_read()
  }

  /// Closes the channel. See the [module docs](super) for what waiters see.
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close()
  }

  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// Returns `true` while an unread message occupies the slot.
  pub fn is_full(&self) -> bool {
    self.shared.is_full()
  }

  pub fn waiting_readers(&self) -> usize {
    self.shared.waiting_readers()
  }

  pub fn waiting_writers(&self) -> usize {
    self.shared.waiting_writers()
  }
}

impl<T> Clone for Handoff<T> {
  fn clone(&self) -> Self {
    self.shared.handles.fetch_add(1, Ordering::Relaxed);
    Handoff {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T> Drop for Handoff<T> {
  fn drop(&mut self) {
    if self.shared.handles.fetch_sub(1, Ordering::AcqRel) == 1 {
      let _ = self.shared.close();
    }
  }
}
