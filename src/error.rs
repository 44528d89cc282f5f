//! The three error kinds this crate can surface. Each is a small
//! concrete type with a manual `Display`/`Error` impl, matching the
//! dependency-free error style the channel this crate's core is
//! modeled on uses — no `thiserror`, because there is nothing a derive
//! macro would save here.

use std::fmt;

/// The channel constructor was asked for a capacity less than one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidArgument {
    pub(crate) requested_capacity: usize,
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel capacity must be at least 1, got {}",
            self.requested_capacity
        )
    }
}

impl std::error::Error for InvalidArgument {}

/// The cancellation signal raised by operations that cannot make
/// progress because the channel is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelClosed;

impl fmt::Display for ChannelClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("channel is closed")
    }
}

impl std::error::Error for ChannelClosed {}

/// The error returned by `try_send`, carrying the value back so the
/// caller doesn't lose it.
pub enum TrySendError<T> {
    /// The channel would have had to park the sender (buffer full, no
    /// parked receiver to hand off to).
    Full(T),
    /// The channel is closed.
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Returns true if this error is a result of the channel being full.
    pub fn is_full(&self) -> bool {
        matches!(self, TrySendError::Full(_))
    }

    /// Returns true if this error is a result of the channel being
    /// closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, TrySendError::Closed(_))
    }

    /// Consumes the error, returning the value that failed to send.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(v) | TrySendError::Closed(v) => v,
        }
    }
}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.debug_tuple("Full").field(&"..").finish(),
            TrySendError::Closed(_) => f.debug_tuple("Closed").field(&"..").finish(),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("send failed because the channel is full"),
            TrySendError::Closed(_) => f.write_str("send failed because the channel is closed"),
        }
    }
}

impl<T> std::error::Error for TrySendError<T> {}
