use super::WakePolicy;
use crate::error::{CloseError, RecvError, SendError, TryRecvError};
use crate::internal::wait_list::{Ticket, WaitList, Waiter};
use crate::telemetry;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Poll, Waker};

/// The state behind a mailbox's lock.
pub(crate) struct MailboxState<T> {
  pub(crate) buffer: VecDeque<T>,
  /// Readers parked on an empty buffer. Resuming one carries no payload: the
  /// reader re-checks `buffer` itself.
  pub(crate) readers: WaitList<()>,
  pub(crate) closed: bool,
  policy: WakePolicy,
}

/// The shared core of a mailbox.
pub(crate) struct MailboxShared<T> {
  pub(crate) state: Mutex<MailboxState<T>>,
  /// Number of live `Mailbox` handles. The channel closes when it reaches zero.
  pub(crate) handles: AtomicUsize,
}

impl<T> fmt::Debug for MailboxShared<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.lock();
    f.debug_struct("MailboxShared")
      .field("len", &state.buffer.len())
      .field("readers", &state.readers)
      .field("closed", &state.closed)
      .field("policy", &state.policy)
      .field("handles", &self.handles.load(Ordering::Relaxed))
      .finish()
  }
}

impl<T> MailboxShared<T> {
  pub(crate) fn new(policy: WakePolicy) -> Self {
    MailboxShared {
      state: Mutex::new(MailboxState {
        buffer: VecDeque::new(),
        readers: WaitList::new(),
        closed: false,
        policy,
      }),
      handles: AtomicUsize::new(1),
    }
  }

  pub(crate) fn send(&self, message: T) -> Result<(), SendError<T>> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(SendError::Closed(message));
    }
    state.buffer.push_back(message);

    // Broadcast may wake more readers than there are messages. Each one
    // re-checks the buffer under the lock, and the losers park again.
    let wakeups: Vec<Waiter> = match state.policy {
      WakePolicy::Broadcast => state.readers.drain().map(|(_, w, _)| w).collect(),
      WakePolicy::One => state.readers.pop_front().map(|(_, w, _)| w).into_iter().collect(),
    };
    drop(state);

    if !wakeups.is_empty() {
      tracing::trace!(woken = wakeups.len(), "mailbox send resumed readers");
      telemetry::increment_counter("mailbox::send", "readers_woken");
    }
    for waiter in wakeups {
      waiter.wake();
    }
    Ok(())
  }

  pub(crate) fn try_pop(&self) -> Result<T, TryRecvError> {
    let mut state = self.state.lock();
    if let Some(message) = state.buffer.pop_front() {
      Ok(message)
    } else if state.closed {
      Err(TryRecvError::Closed)
    } else {
      Err(TryRecvError::Empty)
    }
  }

  /// One step of a pop: take the head, report closure, or (re)register.
  ///
  /// `ticket` is the caller's registration from an earlier step, if any. A
  /// wake never implies the buffer holds anything for this caller; it only
  /// means "look again".
  pub(crate) fn poll_pop(
    &self,
    ticket: &mut Option<Ticket>,
    make_waiter: impl FnOnce() -> Waiter,
    waker: Option<&Waker>,
  ) -> Poll<Result<T, RecvError>> {
    let mut state = self.state.lock();

    if let Some(message) = state.buffer.pop_front() {
      if let Some(t) = ticket.take() {
        state.readers.remove(t);
        telemetry::log_event(Some(t.id()), "mailbox::pop", "Resumed", None);
      }
      return Poll::Ready(Ok(message));
    }

    if state.closed {
      if let Some(t) = ticket.take() {
        state.readers.remove(t);
      }
      return Poll::Ready(Err(RecvError::Closed));
    }

    match *ticket {
      Some(t) if state.readers.still_waiting(t, waker) => {}
      _ => {
        let t = state.readers.push_back(make_waiter(), ());
        *ticket = Some(t);
        tracing::trace!(ticket = t.id(), "mailbox reader suspended");
        telemetry::log_event(Some(t.id()), "mailbox::pop", "Suspended", None);
      }
    }
    Poll::Pending
  }

  /// Withdraws an abandoned pop.
  ///
  /// If the reader had already been woken under `WakePolicy::One`, its wake is
  /// passed on so a buffered message is not left behind with readers parked.
  pub(crate) fn cancel_pop(&self, ticket: Ticket) {
    let mut state = self.state.lock();
    if state.readers.remove(ticket).is_some() {
      return;
    }
    let handoff = if state.buffer.is_empty() {
      None
    } else {
      state.readers.pop_front().map(|(_, w, _)| w)
    };
    drop(state);

    if let Some(waiter) = handoff {
      tracing::trace!(ticket = ticket.id(), "abandoned mailbox reader passed its wake on");
      waiter.wake();
    }
  }

  pub(crate) fn close(&self) -> Result<(), CloseError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(CloseError);
    }
    state.closed = true;
    let wakeups: Vec<Waiter> = state.readers.drain().map(|(_, w, _)| w).collect();
    let remaining = state.buffer.len();
    drop(state);

    tracing::debug!(woken = wakeups.len(), remaining, "mailbox closed");
    telemetry::log_event(None, "mailbox::close", "Closed", None);
    for waiter in wakeups {
      waiter.wake();
    }
    Ok(())
  }

  pub(crate) fn len(&self) -> usize {
    self.state.lock().buffer.len()
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  pub(crate) fn waiting_readers(&self) -> usize {
    self.state.lock().readers.len()
  }
}
