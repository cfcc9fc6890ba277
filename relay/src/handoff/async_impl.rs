use super::core::{HandoffShared, Progress};
use super::sync_impl::Handoff;
use crate::error::{RecvError, SendError};
use crate::internal::wait_list::{Ticket, Waiter};

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

impl<T> Handoff<T> {
  /// Writes a message, waiting while the slot is occupied.
  ///
  /// Dropping the future before it resolves withdraws the message; it is
  /// never stored.
  pub fn write(&self, message: T) -> WriteFuture<'_, T> {
    WriteFuture {
      shared: &self.shared,
      state: WriteState::Idle(message),
    }
  }

  /// Reads a message, waiting while the slot is empty.
  ///
  /// Not cancel-safe once a writer has handed this read its message: dropping
  /// the future at that point drops the message too.
  pub fn read(&self) -> ReadFuture<'_, T> {
    ReadFuture {
      shared: &self.shared,
      state: ReadState::Idle,
    }
  }
}

// --- Write Future ---

enum WriteState<T> {
  Idle(T),
  Parked(Ticket),
  Done,
}

#[must_use = "futures do nothing unless you .await or poll them"]
pub struct WriteFuture<'a, T> {
  shared: &'a HandoffShared<T>,
  state: WriteState<T>,
}

// The pending message is never pinned; it is moved into the channel by value.
impl<T> Unpin for WriteFuture<'_, T> {}

impl<T> fmt::Debug for WriteFuture<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = match self.state {
      WriteState::Idle(_) => "Idle",
      WriteState::Parked(_) => "Parked",
      WriteState::Done => "Done",
    };
    f.debug_struct("WriteFuture").field("state", &state).finish()
  }
}

impl<T> Future for WriteFuture<'_, T> {
  type Output = Result<(), SendError<T>>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    match std::mem::replace(&mut this.state, WriteState::Done) {
      WriteState::Idle(message) => {
        match this
          .shared
          .start_write(message, || Waiter::Async(cx.waker().clone()))
        {
          Ok(Progress::Ready(())) => Poll::Ready(Ok(())),
          Ok(Progress::Parked(ticket)) => {
            this.state = WriteState::Parked(ticket);
            Poll::Pending
          }
          Err(err) => Poll::Ready(Err(err)),
        }
      }
      WriteState::Parked(ticket) => match this.shared.poll_write(ticket, Some(cx.waker())) {
        Poll::Ready(result) => Poll::Ready(result),
        Poll::Pending => {
          this.state = WriteState::Parked(ticket);
          Poll::Pending
        }
      },
      WriteState::Done => panic!("WriteFuture polled after completion"),
    }
  }
}

impl<T> Drop for WriteFuture<'_, T> {
  fn drop(&mut self) {
    if let WriteState::Parked(ticket) = self.state {
      self.shared.cancel_write(ticket);
    }
  }
}

// --- Read Future ---

#[derive(Debug, Clone, Copy)]
enum ReadState {
  Idle,
  Parked(Ticket),
  Done,
}

#[must_use = "futures do nothing unless you .await or poll them"]
pub struct ReadFuture<'a, T> {
  shared: &'a HandoffShared<T>,
  state: ReadState,
}

impl<T> fmt::Debug for ReadFuture<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReadFuture").field("state", &self.state).finish()
  }
}

impl<T> Future for ReadFuture<'_, T> {
  type Output = Result<T, RecvError>;

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    let this = self.get_mut();
    let poll = match this.state {
      ReadState::Idle => match this.shared.start_read(|| Waiter::Async(cx.waker().clone())) {
        Progress::Ready(result) => Poll::Ready(result),
        Progress::Parked(ticket) => {
          this.state = ReadState::Parked(ticket);
          return Poll::Pending;
        }
      },
      ReadState::Parked(ticket) => this.shared.poll_read(ticket, Some(cx.waker())),
      ReadState::Done => panic!("ReadFuture polled after completion"),
    };
    if poll.is_ready() {
      this.state = ReadState::Done;
    }
    poll
  }
}

impl<T> Drop for ReadFuture<'_, T> {
  fn drop(&mut self) {
    if let ReadState::Parked(ticket) = self.state {
      self.shared.cancel_read(ticket);
    }
  }
}
