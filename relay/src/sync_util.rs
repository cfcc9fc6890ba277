//! Utilities for synchronous blocking and parking.
//! The channels own all wait state; these are thin helpers around
//! `std::thread::park`/`unpark` so the blocking paths read the same everywhere.

use std::thread;

/// Parks the current thread until it is unparked (or spuriously woken).
#[inline]
pub(crate) fn park_thread() {
  thread::park();
}

/// Unparks the given thread.
#[inline]
pub(crate) fn unpark_thread(thread: &thread::Thread) {
  thread.unpark();
}
