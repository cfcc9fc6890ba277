use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::wait_list::{Ticket, WaitList, Waiter};
use crate::telemetry;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Poll, Waker};

/// The state behind a handoff channel's lock.
///
/// Invariants, holding whenever the lock is released:
/// - readers only wait while `slot` is empty;
/// - writers only wait while `slot` is full.
pub(crate) struct HandoffState<T> {
  pub(crate) slot: Option<T>,
  pub(crate) readers: WaitList<()>,
  /// Messages handed straight to a waiting reader, keyed by its ticket.
  pub(crate) delivered: HashMap<Ticket, T>,
  /// Each waiting writer carries the message it wants to store.
  pub(crate) writers: WaitList<T>,
  /// Messages returned to writers that were waiting when the channel closed.
  pub(crate) rejected: HashMap<Ticket, T>,
  pub(crate) closed: bool,
}

pub(crate) struct HandoffShared<T> {
  pub(crate) state: Mutex<HandoffState<T>>,
  pub(crate) handles: AtomicUsize,
}

impl<T> fmt::Debug for HandoffShared<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.lock();
    f.debug_struct("HandoffShared")
      .field("full", &state.slot.is_some())
      .field("readers", &state.readers)
      .field("writers", &state.writers)
      .field("closed", &state.closed)
      .field("handles", &self.handles.load(Ordering::Relaxed))
      .finish()
  }
}

/// Outcome of the first step of a read or write.
pub(crate) enum Progress<R> {
  Ready(R),
  Parked(Ticket),
}

impl<T> HandoffState<T> {
  /// Empties the slot. A waiting writer's message is promoted into the freed
  /// slot within the same step, and that writer is returned for waking.
  fn take_slot(&mut self) -> Option<(T, Option<Waiter>)> {
    let message = self.slot.take()?;
    let promoted = self.writers.pop_front().map(|(ticket, waiter, pending)| {
      self.slot = Some(pending);
      tracing::trace!(ticket = ticket.id(), "handoff writer promoted into slot");
      telemetry::log_event(Some(ticket.id()), "handoff::read", "WriterPromoted", None);
      waiter
    });
    Some((message, promoted))
  }

  /// Stores into an empty slot, or bypasses it for the first waiting reader.
  fn fill_empty_slot(&mut self, message: T) -> Option<Waiter> {
    debug_assert!(self.slot.is_none());
    debug_assert!(self.writers.is_empty(), "writers only wait behind a full slot");
    match self.readers.pop_front() {
      Some((ticket, waiter, ())) => {
        self.delivered.insert(ticket, message);
        tracing::trace!(ticket = ticket.id(), "handoff direct to waiting reader");
        telemetry::increment_counter("handoff::write", "direct_handoff");
        Some(waiter)
      }
      None => {
        self.slot = Some(message);
        telemetry::increment_counter("handoff::write", "slot_filled");
        None
      }
    }
  }
}

impl<T> HandoffShared<T> {
  pub(crate) fn new() -> Self {
    HandoffShared {
      state: Mutex::new(HandoffState {
        slot: None,
        readers: WaitList::new(),
        delivered: HashMap::new(),
        writers: WaitList::new(),
        rejected: HashMap::new(),
        closed: false,
      }),
      handles: AtomicUsize::new(1),
    }
  }

  // --- Write side ---

  /// Delivers, stores, or parks `message` behind the occupied slot.
  pub(crate) fn start_write(
    &self,
    message: T,
    make_waiter: impl FnOnce() -> Waiter,
  ) -> Result<Progress<()>, SendError<T>> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(SendError::Closed(message));
    }
    if state.slot.is_some() {
      let ticket = state.writers.push_back(make_waiter(), message);
      tracing::trace!(ticket = ticket.id(), "handoff writer suspended on full slot");
      telemetry::log_event(Some(ticket.id()), "handoff::write", "Suspended", None);
      return Ok(Progress::Parked(ticket));
    }
    let wake = state.fill_empty_slot(message);
    drop(state);

    if let Some(waiter) = wake {
      waiter.wake();
    }
    Ok(Progress::Ready(()))
  }

  pub(crate) fn try_write(&self, message: T) -> Result<(), TrySendError<T>> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(TrySendError::Closed(message));
    }
    if state.slot.is_some() {
      return Err(TrySendError::Full(message));
    }
    let wake = state.fill_empty_slot(message);
    drop(state);

    if let Some(waiter) = wake {
      waiter.wake();
    }
    Ok(())
  }

  /// Checks on a parked writer. Its message has been stored once its ticket is
  /// gone from the wait list, unless close handed the message back.
  pub(crate) fn poll_write(&self, ticket: Ticket, waker: Option<&Waker>) -> Poll<Result<(), SendError<T>>> {
    let mut state = self.state.lock();
    if state.writers.still_waiting(ticket, waker) {
      return Poll::Pending;
    }
    match state.rejected.remove(&ticket) {
      Some(message) => Poll::Ready(Err(SendError::Closed(message))),
      None => Poll::Ready(Ok(())),
    }
  }

  /// Withdraws a parked writer. Its message was never accepted and is dropped.
  pub(crate) fn cancel_write(&self, ticket: Ticket) {
    let mut state = self.state.lock();
    let withdrawn = state.writers.remove(ticket).map(|(_, message)| message);
    let rejected = state.rejected.remove(&ticket);
    drop(state);
    drop((withdrawn, rejected));
  }

  // --- Read side ---

  /// Takes the slot's message, or parks until a writer hands one over.
  pub(crate) fn start_read(&self, make_waiter: impl FnOnce() -> Waiter) -> Progress<Result<T, RecvError>> {
    let mut state = self.state.lock();
    if let Some((message, promoted)) = state.take_slot() {
      drop(state);
      if let Some(waiter) = promoted {
        waiter.wake();
      }
      return Progress::Ready(Ok(message));
    }
    if state.closed {
      return Progress::Ready(Err(RecvError::Closed));
    }
    let ticket = state.readers.push_back(make_waiter(), ());
    tracing::trace!(ticket = ticket.id(), "handoff reader suspended on empty slot");
    telemetry::log_event(Some(ticket.id()), "handoff::read", "Suspended", None);
    Progress::Parked(ticket)
  }

  pub(crate) fn try_read(&self) -> Result<T, TryRecvError> {
    let mut state = self.state.lock();
    match state.take_slot() {
      Some((message, promoted)) => {
        drop(state);
        if let Some(waiter) = promoted {
          waiter.wake();
        }
        Ok(message)
      }
      None if state.closed => Err(TryRecvError::Closed),
      None => Err(TryRecvError::Empty),
    }
  }

  /// Checks on a parked reader.
  pub(crate) fn poll_read(&self, ticket: Ticket, waker: Option<&Waker>) -> Poll<Result<T, RecvError>> {
    let mut state = self.state.lock();
    if let Some(message) = state.delivered.remove(&ticket) {
      telemetry::log_event(Some(ticket.id()), "handoff::read", "Resumed", None);
      return Poll::Ready(Ok(message));
    }
    if state.readers.still_waiting(ticket, waker) {
      return Poll::Pending;
    }
    // Only close resumes a reader without a delivery.
    Poll::Ready(Err(RecvError::Closed))
  }

  /// Withdraws a parked reader. A message already handed to it goes with it.
  pub(crate) fn cancel_read(&self, ticket: Ticket) {
    let mut state = self.state.lock();
    state.readers.remove(ticket);
    let lost = state.delivered.remove(&ticket);
    drop(state);

    if lost.is_some() {
      tracing::debug!(ticket = ticket.id(), "handoff reader abandoned after delivery; message dropped");
      telemetry::increment_counter("handoff::read", "abandoned_delivery");
    }
  }

  // --- Lifecycle ---

  pub(crate) fn close(&self) -> Result<(), CloseError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(CloseError);
    }
    state.closed = true;

    let mut wakeups: Vec<Waiter> = state.readers.drain().map(|(_, w, _)| w).collect();
    let writers: Vec<_> = state.writers.drain().collect();
    for (ticket, waiter, message) in writers {
      state.rejected.insert(ticket, message);
      wakeups.push(waiter);
    }
    drop(state);

    tracing::debug!(woken = wakeups.len(), "handoff closed");
    telemetry::log_event(None, "handoff::close", "Closed", None);
    for waiter in wakeups {
      waiter.wake();
    }
    Ok(())
  }

  pub(crate) fn is_full(&self) -> bool {
    self.state.lock().slot.is_some()
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  pub(crate) fn waiting_readers(&self) -> usize {
    self.state.lock().readers.len()
  }

  pub(crate) fn waiting_writers(&self) -> usize {
    self.state.lock().writers.len()
  }
}
