// src/error.rs

use core::fmt;

// Generates `into_inner`, `Display` and `Error` for enums whose every variant
// carries the rejected value.
macro_rules! impl_error_for_enum_with_inner {
    (
        $enum_name:ident < $generic_param:ident >,
        $($variant:ident ( $message:expr ) ),+
        $(,)?
    ) => {
        impl<$generic_param> $enum_name<$generic_param> {
            /// Consumes the error, returning the value that could not be delivered.
            #[inline]
            pub fn into_inner(self) -> $generic_param {
                match self {
                    $( $enum_name::$variant(v) => v, )+
                }
            }
        }

        impl<$generic_param> fmt::Display for $enum_name<$generic_param> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( $enum_name::$variant(_) => f.write_str($message), )+
                }
            }
        }

        impl<$generic_param: fmt::Debug> std::error::Error for $enum_name<$generic_param> {}
    };
}

/// Error returned by `send`/`write` when the channel has been closed.
///
/// The message is handed back so the caller can decide what to do with it.
#[derive(PartialEq, Eq, Clone)]
pub enum SendError<T> {
  /// The channel was closed, either explicitly or because every owning
  /// handle was dropped.
  Closed(T),
}

impl<T> fmt::Debug for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed(_) => write!(f, "SendError::Closed(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(SendError<T>, Closed("channel closed"));

/// Error returned by `try_write` when the message could not be accepted
/// immediately.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The handoff slot is occupied.
  Full(T),
  /// The channel is closed.
  Closed(T),
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl_error_for_enum_with_inner!(
  TrySendError<T>,
  Full("channel full"),
  Closed("channel closed"),
);

impl<T> From<SendError<T>> for TrySendError<T> {
  fn from(err: SendError<T>) -> Self {
    match err {
      SendError::Closed(v) => TrySendError::Closed(v),
    }
  }
}

/// Error returned by `pop`/`read` once the channel is closed and nothing is
/// left to deliver.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  Closed,
}
impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Closed => write!(f, "channel closed and drained"),
    }
  }
}

/// Error returned by `try_pop`/`try_read`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// Nothing is available right now.
  Empty,
  /// The channel is closed and drained.
  Closed,
}
impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Closed => write!(f, "channel closed and drained"),
    }
  }
}

/// Error returned when attempting to close an already closed channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn send_error_hands_value_back() {
    let err = SendError::Closed(String::from("late"));
    assert_eq!(err.to_string(), "channel closed");
    assert_eq!(format!("{:?}", err), "SendError::Closed(..)");
    assert_eq!(err.into_inner(), "late");
  }

  #[test]
  fn try_send_error_from_send_error() {
    let err: TrySendError<u8> = SendError::Closed(7).into();
    assert_eq!(err, TrySendError::Closed(7));
    assert_eq!(TrySendError::Full(1u8).to_string(), "channel full");
  }
}
