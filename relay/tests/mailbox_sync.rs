// tests/mailbox_sync.rs

mod common;
use common::*;

use fibre_relay::error::{RecvError, SendError};
use fibre_relay::mailbox::{self, Mailbox, WakePolicy};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn mailbox_sync_smoke() {
  let mailbox = mailbox::channel();
  mailbox.send(1).unwrap();
  mailbox.send(2).unwrap();
  assert_eq!(mailbox.pop_sync(), Ok(1));
  assert_eq!(mailbox.pop_sync(), Ok(2));
  assert!(mailbox.is_empty());
}

#[test]
fn mailbox_sync_multi_producer_no_loss() {
  let mailbox = mailbox::channel();
  let producers = 8;
  let per_producer = ITEMS_HIGH;
  let barrier = Arc::new(Barrier::new(producers));

  let mut handles = Vec::new();
  for p in 0..producers {
    let mailbox = mailbox.clone();
    let barrier = Arc::clone(&barrier);
    handles.push(thread::spawn(move || {
      barrier.wait();
      for i in 0..per_producer {
        mailbox.send((p, i)).unwrap();
        if i % 10 == 0 {
          thread::yield_now();
        }
      }
    }));
  }

  let mut last_seen = vec![None; producers];
  for _ in 0..producers * per_producer {
    let (p, i) = mailbox.pop_sync().unwrap();
    // Per-producer order is preserved.
    if let Some(prev) = last_seen[p] {
      assert!(i > prev);
    }
    last_seen[p] = Some(i);
  }
  for handle in handles {
    handle.join().unwrap();
  }
  assert!(mailbox.is_empty());
}

fn threads_many_to_many(policy: WakePolicy) {
  let mailbox = Mailbox::with_policy(policy);
  let consumers = 4;
  let total = ITEMS_HIGH * 4;

  let mut consumer_handles = Vec::new();
  for _ in 0..consumers {
    let iter = mailbox.iter();
    consumer_handles.push(thread::spawn(move || iter.collect::<Vec<_>>()));
  }

  let producer = {
    let mailbox = mailbox.clone();
    thread::spawn(move || {
      for i in 0..total {
        mailbox.send(i).unwrap();
      }
    })
  };
  producer.join().unwrap();
  drop(mailbox);

  let mut all = Vec::new();
  for handle in consumer_handles {
    all.extend(handle.join().unwrap());
  }
  assert_eq!(all.len(), total);
  let unique: HashSet<_> = all.into_iter().collect();
  assert_eq!(unique.len(), total);
}

#[test]
fn mailbox_sync_many_to_many_broadcast() {
  threads_many_to_many(WakePolicy::Broadcast);
}

#[test]
fn mailbox_sync_many_to_many_wake_one() {
  threads_many_to_many(WakePolicy::One);
}

#[test]
fn mailbox_sync_close_wakes_blocked_readers() {
  let mailbox = mailbox::channel::<()>();
  let woken = Arc::new(AtomicUsize::new(0));

  let mut handles = Vec::new();
  for _ in 0..3 {
    let mailbox = mailbox.clone();
    let woken = Arc::clone(&woken);
    handles.push(thread::spawn(move || {
      assert_eq!(mailbox.pop_sync(), Err(RecvError::Closed));
      woken.fetch_add(1, Ordering::SeqCst);
    }));
  }

  thread::sleep(Duration::from_millis(100));
  assert_eq!(woken.load(Ordering::SeqCst), 0);
  mailbox.close().unwrap();
  for handle in handles {
    handle.join().unwrap();
  }
  assert_eq!(woken.load(Ordering::SeqCst), 3);
  assert_eq!(mailbox.send(()), Err(SendError::Closed(())));
}

#[test]
fn mailbox_sync_dropped_messages_are_released_with_the_channel() {
  let drop_count = Arc::new(AtomicUsize::new(0));
  struct DropCounter(Arc<AtomicUsize>);
  impl Drop for DropCounter {
    fn drop(&mut self) {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }

  let mailbox = mailbox::channel();
  mailbox.send(DropCounter(drop_count.clone())).unwrap();
  mailbox.send(DropCounter(drop_count.clone())).unwrap();
  drop(mailbox);

  assert_eq!(drop_count.load(Ordering::SeqCst), 2);
}
