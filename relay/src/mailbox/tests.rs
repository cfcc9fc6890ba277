use super::*;
use crate::error::{CloseError, RecvError, SendError, TryRecvError};

use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};
use std::thread;
use std::time::Duration;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_millis(500);

struct NoopWaker;

impl Wake for NoopWaker {
  fn wake(self: Arc<Self>) {}
}

fn noop_context() -> Context<'static> {
  let waker: &'static Waker = Box::leak(Box::new(Waker::from(Arc::new(NoopWaker))));
  Context::from_waker(waker)
}

#[test]
fn sends_then_pops_in_fifo_order() {
  let mailbox = channel();
  for i in 0..5 {
    mailbox.send(i).unwrap();
  }
  assert_eq!(mailbox.len(), 5);
  let popped: Vec<_> = (0..5).map(|_| mailbox.try_pop().unwrap()).collect();
  assert_eq!(popped, vec![0, 1, 2, 3, 4]);
  assert_eq!(mailbox.try_pop(), Err(TryRecvError::Empty));
}

#[test]
fn interleaved_producers_follow_entry_order() {
  let mailbox = channel();
  let first = mailbox.clone();
  let second = mailbox.clone();

  first.send("a").unwrap();
  second.send("c").unwrap();
  first.send("b").unwrap();
  second.send("d").unwrap();

  let popped: Vec<_> = (0..4).map(|_| mailbox.pop_sync().unwrap()).collect();
  assert_eq!(popped, vec!["a", "c", "b", "d"]);
}

#[test]
fn one_send_satisfies_exactly_one_of_many_waiters() {
  let mailbox = Mailbox::<u32>::new();
  let mut cx = noop_context();

  let mut pops: Vec<_> = (0..3).map(|_| Box::pin(mailbox.pop())).collect();
  for pop in pops.iter_mut() {
    assert!(pop.as_mut().poll(&mut cx).is_pending());
  }
  assert_eq!(mailbox.waiting_readers(), 3);

  mailbox.send(7).unwrap();
  // Broadcast: everyone was resumed and must re-check.
  assert_eq!(mailbox.waiting_readers(), 0);

  let mut delivered = Vec::new();
  for pop in pops.iter_mut() {
    if let Poll::Ready(v) = pop.as_mut().poll(&mut cx) {
      delivered.push(v.unwrap());
    }
  }
  assert_eq!(delivered, vec![7]);
  assert_eq!(mailbox.waiting_readers(), 2, "losers park again");
}

#[test]
fn wake_one_policy_resumes_a_single_reader() {
  let mailbox = Mailbox::<u32>::with_policy(WakePolicy::One);
  let mut cx = noop_context();

  let mut first = Box::pin(mailbox.pop());
  let mut second = Box::pin(mailbox.pop());
  assert!(first.as_mut().poll(&mut cx).is_pending());
  assert!(second.as_mut().poll(&mut cx).is_pending());

  mailbox.send(1).unwrap();
  assert_eq!(mailbox.waiting_readers(), 1);
  assert_eq!(first.as_mut().poll(&mut cx), Poll::Ready(Ok(1)));
  assert!(second.as_mut().poll(&mut cx).is_pending());
}

#[test]
fn dropped_pop_withdraws_its_registration() {
  let mailbox = Mailbox::<u32>::new();
  let mut cx = noop_context();

  let mut pop = Box::pin(mailbox.pop());
  assert!(pop.as_mut().poll(&mut cx).is_pending());
  assert_eq!(mailbox.waiting_readers(), 1);
  drop(pop);
  assert_eq!(mailbox.waiting_readers(), 0);

  mailbox.send(3).unwrap();
  assert_eq!(mailbox.try_pop(), Ok(3));
}

#[test]
fn woken_then_dropped_pop_passes_wake_on() {
  let mailbox = Mailbox::<u32>::with_policy(WakePolicy::One);
  let mut cx = noop_context();

  let mut woken = Box::pin(mailbox.pop());
  let mut next = Box::pin(mailbox.pop());
  assert!(woken.as_mut().poll(&mut cx).is_pending());
  assert!(next.as_mut().poll(&mut cx).is_pending());

  mailbox.send(9).unwrap();
  assert_eq!(mailbox.waiting_readers(), 1);

  // The woken reader never comes back for its message.
  drop(woken);
  assert_eq!(mailbox.waiting_readers(), 0, "wake was handed to the next reader");
  assert_eq!(next.as_mut().poll(&mut cx), Poll::Ready(Ok(9)));
}

#[test]
fn close_drains_then_ends() {
  let mailbox = channel();
  mailbox.send(1).unwrap();
  mailbox.send(2).unwrap();
  mailbox.close().unwrap();

  assert_eq!(mailbox.close(), Err(CloseError));
  assert_eq!(mailbox.send(3), Err(SendError::Closed(3)));
  assert_eq!(mailbox.pop_sync(), Ok(1));
  assert_eq!(mailbox.try_pop(), Ok(2));
  assert_eq!(mailbox.pop_sync(), Err(RecvError::Closed));
  assert_eq!(mailbox.try_pop(), Err(TryRecvError::Closed));
}

#[test]
fn iter_ends_when_last_handle_drops() {
  let mailbox = channel();
  let mut iter = mailbox.iter();

  mailbox.send("x").unwrap();
  mailbox.send("y").unwrap();
  drop(mailbox);

  assert_eq!(iter.next(), Some("x"));
  assert_eq!(iter.next(), Some("y"));
  assert_eq!(iter.next(), None);
  assert_eq!(iter.next(), None);
}

#[test]
fn pop_sync_blocks_and_unblocks() {
  let mailbox = channel();
  let reader = mailbox.clone();

  let handle = thread::spawn(move || reader.pop_sync());

  thread::sleep(Duration::from_millis(100));
  mailbox.send(99).unwrap();

  let result = handle.join().expect("Thread panicked");
  assert_eq!(result, Ok(99));
}

#[tokio::test]
async fn pop_waits_and_completes() {
  let mailbox = channel();
  let reader = mailbox.clone();

  let task = tokio::spawn(async move { reader.pop().await });

  tokio::time::sleep(Duration::from_millis(50)).await;
  mailbox.send(123).unwrap();

  let result = timeout(TEST_TIMEOUT, task)
    .await
    .expect("Task timed out")
    .unwrap();
  assert_eq!(result, Ok(123));
}

#[tokio::test]
async fn messages_stream_wakes_on_close() {
  let mailbox = channel::<u32>();
  let mut messages = mailbox.messages();

  let task = tokio::spawn(async move {
    let mut seen = Vec::new();
    while let Some(m) = messages.next().await {
      seen.push(m);
    }
    seen
  });

  tokio::time::sleep(Duration::from_millis(50)).await;
  mailbox.send(1).unwrap();
  mailbox.send(2).unwrap();
  drop(mailbox);

  let seen = timeout(TEST_TIMEOUT, task)
    .await
    .expect("Task timed out")
    .unwrap();
  assert_eq!(seen, vec![1, 2]);
}

#[test]
fn messages_stream_is_fused() {
  use futures_core::stream::FusedStream;

  let mailbox = channel::<u32>();
  let mut messages = mailbox.messages();
  mailbox.close().unwrap();

  let mut cx = noop_context();
  assert_eq!(messages.poll_next_unpin(&mut cx), Poll::Ready(None));
  assert!(messages.is_terminated());
}
