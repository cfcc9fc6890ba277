use crate::sync_util;

use std::collections::VecDeque;
use std::fmt;
use std::task::Waker;
use std::thread::{self, Thread};

/// Represents either a parked thread or a pending task.
#[derive(Debug)]
pub(crate) enum Waiter {
  Sync(Thread),
  Async(Waker),
}

impl Waiter {
  /// A waiter for the calling thread.
  pub(crate) fn current_thread() -> Self {
    Waiter::Sync(thread::current())
  }

  /// Wakes the underlying thread or task.
  pub(crate) fn wake(self) {
    match self {
      Waiter::Sync(thread) => sync_util::unpark_thread(&thread),
      Waiter::Async(waker) => waker.wake(),
    }
  }

  fn refresh(&mut self, waker: &Waker) {
    match self {
      Waiter::Async(existing) if existing.will_wake(waker) => {}
      _ => *self = Waiter::Async(waker.clone()),
    }
  }
}

/// Identity of one entry in a [`WaitList`]. Unique for the lifetime of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Ticket(u64);

impl Ticket {
  #[inline]
  pub(crate) fn id(self) -> u64 {
    self.0
  }
}

struct Entry<P> {
  ticket: Ticket,
  waiter: Waiter,
  payload: P,
}

/// FIFO of suspended callers, each optionally carrying a payload.
///
/// The list performs no synchronization; it lives inside a channel's state and
/// is only touched while that channel's lock is held. Resuming an entry means
/// removing it and waking its waiter. A resumed caller finds out what happened
/// by checking whether its ticket is still listed.
pub(crate) struct WaitList<P = ()> {
  entries: VecDeque<Entry<P>>,
  next_ticket: u64,
}

impl<P> fmt::Debug for WaitList<P> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WaitList")
      .field("len", &self.entries.len())
      .field("next_ticket", &self.next_ticket)
      .finish()
  }
}

impl<P> Default for WaitList<P> {
  fn default() -> Self {
    Self::new()
  }
}

impl<P> WaitList<P> {
  pub(crate) fn new() -> Self {
    Self {
      entries: VecDeque::new(),
      next_ticket: 0,
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Appends a waiter and returns its ticket.
  pub(crate) fn push_back(&mut self, waiter: Waiter, payload: P) -> Ticket {
    let ticket = Ticket(self.next_ticket);
    self.next_ticket += 1;
    self.entries.push_back(Entry {
      ticket,
      waiter,
      payload,
    });
    ticket
  }

  /// Removes the longest-waiting entry.
  pub(crate) fn pop_front(&mut self) -> Option<(Ticket, Waiter, P)> {
    self
      .entries
      .pop_front()
      .map(|e| (e.ticket, e.waiter, e.payload))
  }

  /// Removes a specific entry. Returns `None` if it was already resumed.
  ///
  /// Linear in the number of waiters; lists stay short in practice.
  pub(crate) fn remove(&mut self, ticket: Ticket) -> Option<(Waiter, P)> {
    let idx = self.entries.iter().position(|e| e.ticket == ticket)?;
    self.entries.remove(idx).map(|e| (e.waiter, e.payload))
  }

  /// Returns `true` if `ticket` is still listed. When a waker is supplied the
  /// entry's waiter is replaced with it, so the latest poll gets the wake.
  pub(crate) fn still_waiting(&mut self, ticket: Ticket, waker: Option<&Waker>) -> bool {
    match self.entries.iter_mut().find(|e| e.ticket == ticket) {
      Some(entry) => {
        if let Some(waker) = waker {
          entry.waiter.refresh(waker);
        }
        true
      }
      None => false,
    }
  }

  /// Removes every entry in FIFO order.
  pub(crate) fn drain(&mut self) -> impl Iterator<Item = (Ticket, Waiter, P)> + '_ {
    self.entries.drain(..).map(|e| (e.ticket, e.waiter, e.payload))
  }
}
