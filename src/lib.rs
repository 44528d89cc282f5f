//! A bounded, typed, multi-producer multi-consumer queue for passing
//! values between concurrently running tasks, plus a `select` that can
//! wait on several such channels at once.
//!
//! Channel creation provides a [`Sender`] and a [`Receiver`]. Both are
//! cloneable: cloning either one shares the same underlying channel
//! rather than creating a new one, so several threads can send (or
//! receive) concurrently. A cloned [`Receiver`] steals work from the
//! same buffer instead of getting its own copy of every value — this
//! is a multi-consumer queue, not a broadcast channel.
//!
//! [`Receiver`] also implements [`Stream`](futures_core::Stream), so a
//! channel can be consumed by an async task the same way it is
//! consumed by a blocking thread.
//!
//! # Disconnection
//!
//! When the last [`Sender`] is dropped, or any handle calls
//! [`Sender::close`], the channel is marked closed. Values already in
//! the buffer are still delivered to receivers, but any receiver
//! currently parked waiting for a value that will never come is woken
//! immediately with [`ChannelClosed`]. Once the buffer has drained,
//! every subsequent receive also fails with [`ChannelClosed`].
//!
//! Dropping the last [`Receiver`] likewise closes the channel: there
//! is no one left to deliver values to, so further sends would simply
//! accumulate or block forever.
//!
//! # Capacity and backpressure
//!
//! A channel is created with a fixed positive `capacity`. `send`
//! blocks the calling thread while the buffer is full; `try_send`
//! fails instead of blocking; `send_async` returns a future that
//! resolves once room is available. There is no unbounded variant —
//! an unbounded queue turns a slow consumer into unbounded memory
//! growth, which this crate's capacity accounting is built to rule
//! out by construction.
//!
//! # Select
//!
//! [`select`] lets a caller wait on several channels — of different
//! element types — at once, reacting to whichever becomes ready
//! first. See the [`select`] module for the full contract.

mod channel;
mod error;
mod one_shot;
mod ring_buffer;
mod select;
mod wait_queue;

pub use channel::{channel, ReceiveFuture, Receiver, SendFuture, Sender};
pub use error::{ChannelClosed, InvalidArgument, TrySendError};
pub use select::{select, Selectable, SelectCase, Waiter};
