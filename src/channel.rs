//! The channel core: the synchronization object binding the ring
//! buffer and the three wait queues, exposing send/receive/try/close
//! operations plus the async-interop handles built on top of the same
//! state.
//!
//! All operations acquire the channel mutex first and release it
//! before blocking or registering a completion — the mutex is never
//! held across a wait, matching the "no caller-supplied code runs
//! under it" rule. Blocking happens on the parked actor's own
//! [`OneShot`], never on a second, channel-wide condvar.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures_core::stream::Stream;

use crate::error::{ChannelClosed, InvalidArgument, TrySendError};
use crate::one_shot::OneShot;
use crate::ring_buffer::RingBuffer;
use crate::select::{Selectable, SelectCase, Waiter};
use crate::wait_queue::WaitQueue;

struct ParkedSender<T> {
    // `Mutex<Option<T>>` rather than a plain `T` because a receiver on
    // another thread reaches in through the shared `Arc` and moves the
    // value out once it has room for it.
    value: Mutex<Option<T>>,
    completion: OneShot<()>,
}

struct ParkedReceiver<T> {
    completion: OneShot<Result<T, ChannelClosed>>,
}

struct State<T> {
    buffer: RingBuffer<T>,
    senders: WaitQueue<ParkedSender<T>>,
    receivers: WaitQueue<ParkedReceiver<T>>,
    selects: WaitQueue<Waiter>,
    closed: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    sender_count: AtomicUsize,
    receiver_count: AtomicUsize,
}

impl<T> Inner<T> {
    fn send(&self, v: T) -> Result<(), ChannelClosed> {
        let mut guard = self.state.lock().unwrap();
        if guard.closed {
            return Err(ChannelClosed);
        }
        if !guard.buffer.is_empty() && !guard.buffer.is_full() {
            guard.buffer.enqueue(v);
            return Ok(());
        }
        if guard.buffer.is_empty() {
            if let Some(receiver) = guard.receivers.pop_front() {
                drop(guard);
                receiver.completion.set(Ok(v));
                return Ok(());
            }
            guard.buffer.enqueue(v);
            let waiter = guard.selects.pop_front();
            drop(guard);
            if let Some(waiter) = waiter {
                waiter.fire();
            }
            return Ok(());
        }
        // Full: park until a receiver makes room.
        let parked = Arc::new(ParkedSender {
            value: Mutex::new(Some(v)),
            completion: OneShot::new(),
        });
        guard.senders.push_back(parked.clone());
        drop(guard);
        parked.completion.wait();
        Ok(())
    }

    fn try_send(&self, v: T) -> Result<(), TrySendError<T>> {
        let mut guard = self.state.lock().unwrap();
        if guard.closed {
            return Err(TrySendError::Closed(v));
        }
        if !guard.buffer.is_empty() && !guard.buffer.is_full() {
            guard.buffer.enqueue(v);
            return Ok(());
        }
        if guard.buffer.is_empty() {
            if let Some(receiver) = guard.receivers.pop_front() {
                drop(guard);
                receiver.completion.set(Ok(v));
                return Ok(());
            }
            guard.buffer.enqueue(v);
            let waiter = guard.selects.pop_front();
            drop(guard);
            if let Some(waiter) = waiter {
                waiter.fire();
            }
            return Ok(());
        }
        Err(TrySendError::Full(v))
    }

    fn send_async(&self, v: T) -> SendFuture<T> {
        let mut guard = self.state.lock().unwrap();
        if guard.closed {
            return SendFuture::ready(Err(ChannelClosed));
        }
        if !guard.buffer.is_empty() && !guard.buffer.is_full() {
            guard.buffer.enqueue(v);
            return SendFuture::ready(Ok(()));
        }
        if guard.buffer.is_empty() {
            if let Some(receiver) = guard.receivers.pop_front() {
                drop(guard);
                receiver.completion.set(Ok(v));
                return SendFuture::ready(Ok(()));
            }
            guard.buffer.enqueue(v);
            let waiter = guard.selects.pop_front();
            drop(guard);
            if let Some(waiter) = waiter {
                waiter.fire();
            }
            return SendFuture::ready(Ok(()));
        }
        let parked = Arc::new(ParkedSender {
            value: Mutex::new(Some(v)),
            completion: OneShot::new(),
        });
        guard.senders.push_back(parked.clone());
        drop(guard);
        SendFuture::pending(parked)
    }

    fn receive(&self) -> Result<T, ChannelClosed> {
        let mut guard = self.state.lock().unwrap();
        if !guard.buffer.is_empty() {
            let v = guard.buffer.dequeue();
            self.refill_from_parked_sender(&mut guard);
            return Ok(v);
        }
        if guard.closed {
            return Err(ChannelClosed);
        }
        let parked = Arc::new(ParkedReceiver { completion: OneShot::new() });
        guard.receivers.push_back(parked.clone());
        drop(guard);
        parked.completion.wait()
    }

    fn try_receive(&self) -> Option<T> {
        let mut guard = self.state.lock().unwrap();
        if guard.buffer.is_empty() {
            return None;
        }
        let v = guard.buffer.dequeue();
        self.refill_from_parked_sender(&mut guard);
        Some(v)
    }

    fn receive_async(&self) -> ReceiveFuture<T> {
        let mut guard = self.state.lock().unwrap();
        if !guard.buffer.is_empty() {
            let v = guard.buffer.dequeue();
            self.refill_from_parked_sender(&mut guard);
            return ReceiveFuture::ready(Ok(v));
        }
        if guard.closed {
            return ReceiveFuture::ready(Err(ChannelClosed));
        }
        let parked = Arc::new(ParkedReceiver { completion: OneShot::new() });
        guard.receivers.push_back(parked.clone());
        drop(guard);
        ReceiveFuture::pending(parked)
    }

    /// After dequeuing a value, a parked sender (if any) gets its value
    /// moved into the buffer and is woken — this is what keeps I2
    /// (`senders` non-empty implies `buffer` full) true and preserves
    /// global FIFO order (the buffered item was committed before any
    /// parked sender's).
    fn refill_from_parked_sender(&self, guard: &mut State<T>) {
        if let Some(sender) = guard.senders.pop_front() {
            let value = sender
                .value
                .lock()
                .unwrap()
                .take()
                .expect("parked sender missing its value");
            guard.buffer.enqueue(value);
            sender.completion.set(());
        }
    }

    fn close(&self) {
        let mut guard = self.state.lock().unwrap();
        if guard.closed {
            return;
        }
        guard.closed = true;
        let mut cancelled = Vec::new();
        while let Some(receiver) = guard.receivers.pop_front() {
            cancelled.push(receiver);
        }
        drop(guard);
        for receiver in cancelled {
            receiver.completion.set(Err(ChannelClosed));
        }
    }

    fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

/// A handle returned by [`Sender::send_async`], completing when the
/// send completes (or immediately, if it could be satisfied without
/// parking).
pub struct SendFuture<T> {
    state: SendFutureState<T>,
}

enum SendFutureState<T> {
    Ready(Option<Result<(), ChannelClosed>>),
    Pending(Arc<ParkedSender<T>>),
}

impl<T> SendFuture<T> {
    fn ready(result: Result<(), ChannelClosed>) -> Self {
        SendFuture { state: SendFutureState::Ready(Some(result)) }
    }

    fn pending(parked: Arc<ParkedSender<T>>) -> Self {
        SendFuture { state: SendFutureState::Pending(parked) }
    }
}

impl<T> Unpin for SendFuture<T> {}

impl<T> Future for SendFuture<T> {
    type Output = Result<(), ChannelClosed>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            SendFutureState::Ready(slot) => {
                Poll::Ready(slot.take().expect("SendFuture polled after completion"))
            }
            SendFutureState::Pending(parked) => parked.completion.poll(cx).map(Ok),
        }
    }
}

/// A handle returned by [`Receiver::receive_async`], completing with
/// the next value or a cancellation.
pub struct ReceiveFuture<T> {
    state: ReceiveFutureState<T>,
}

enum ReceiveFutureState<T> {
    Ready(Option<Result<T, ChannelClosed>>),
    Pending(Arc<ParkedReceiver<T>>),
}

impl<T> ReceiveFuture<T> {
    fn ready(result: Result<T, ChannelClosed>) -> Self {
        ReceiveFuture { state: ReceiveFutureState::Ready(Some(result)) }
    }

    fn pending(parked: Arc<ParkedReceiver<T>>) -> Self {
        ReceiveFuture { state: ReceiveFutureState::Pending(parked) }
    }
}

impl<T> Unpin for ReceiveFuture<T> {}

impl<T> Future for ReceiveFuture<T> {
    type Output = Result<T, ChannelClosed>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.state {
            ReceiveFutureState::Ready(slot) => {
                Poll::Ready(slot.take().expect("ReceiveFuture polled after completion"))
            }
            ReceiveFutureState::Pending(parked) => parked.completion.poll(cx),
        }
    }
}

/// The transmission end of a bounded channel. Cloning a `Sender`
/// shares the same underlying channel; every clone may send
/// concurrently from its own thread.
pub struct Sender<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Sender<T> {
    /// Sends `v`, blocking the current thread until there is room.
    /// Fails immediately if the channel is closed.
    pub fn send(&self, v: T) -> Result<(), ChannelClosed> {
        self.inner.send(v)
    }

    /// Sends `v` without blocking, failing instead of parking.
    pub fn try_send(&self, v: T) -> Result<(), TrySendError<T>> {
        self.inner.try_send(v)
    }

    /// Sends `v`, returning a future that resolves once the send
    /// completes, without blocking the calling thread.
    pub fn send_async(&self, v: T) -> SendFuture<T> {
        self.inner.send_async(v)
    }

    /// Closes the channel. Idempotent; cancels any parked receivers.
    pub fn close(&self) {
        self.inner.close();
    }

    /// True once the channel has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.inner.sender_count.fetch_add(1, Ordering::SeqCst);
        Sender { inner: self.inner.clone() }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        if self.inner.sender_count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.close();
        }
    }
}

/// The receiving end of a bounded channel. Cloning a `Receiver` makes
/// it a work-stealing consumer of the same channel, not a broadcast
/// subscriber — every value still goes to exactly one receiver.
pub struct Receiver<T> {
    inner: Arc<Inner<T>>,
    // The `ReceiveFuture` currently being polled by `Stream::poll_next`,
    // if one is in flight. Held across `Poll::Pending` returns instead
    // of being rebuilt on every poll: rebuilding would abandon the
    // `ParkedReceiver` record a sender later wakes, orphaning its value.
    in_flight: Option<ReceiveFuture<T>>,
}

impl<T> Receiver<T> {
    /// Receives the next value, blocking the current thread until one
    /// is available or the channel closes.
    pub fn receive(&self) -> Result<T, ChannelClosed> {
        self.inner.receive()
    }

    /// Receives the next value without blocking.
    ///
    /// Returns `None` both when the buffer is simply empty and when
    /// the channel is closed and drained — callers that need to tell
    /// those apart should also check a `Sender`'s `is_closed`.
    pub fn try_receive(&self) -> Option<T> {
        self.inner.try_receive()
    }

    /// Receives the next value, returning a future that resolves once
    /// one is available, without blocking the calling thread.
    pub fn receive_async(&self) -> ReceiveFuture<T> {
        self.inner.receive_async()
    }

    /// Builds a [`SelectCase`] that, when ready, calls `on_ready` with
    /// the received value.
    pub fn case<'a, F>(&'a self, mut on_ready: F) -> SelectCase<'a>
    where
        F: FnMut(T) + 'a,
    {
        SelectCase::new(self, move || match self.try_receive() {
            Some(v) => {
                on_ready(v);
                true
            }
            None => false,
        })
    }
}

impl<T> Selectable for Receiver<T> {
    fn add_waiter(&self, waiter: Arc<Waiter>) {
        let mut guard = self.inner.state.lock().unwrap();
        let immediately_receivable = !guard.buffer.is_empty();
        guard.selects.push_back(waiter.clone());
        drop(guard);
        if immediately_receivable {
            waiter.fire();
        }
    }

    fn remove_waiter(&self, waiter: &Arc<Waiter>) {
        let mut guard = self.inner.state.lock().unwrap();
        guard.selects.remove(waiter);
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        self.inner.receiver_count.fetch_add(1, Ordering::SeqCst);
        Receiver { inner: self.inner.clone(), in_flight: None }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        if self.inner.receiver_count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.close();
        }
    }
}

impl<T> Unpin for Receiver<T> {}

impl<T> Stream for Receiver<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        // The in-flight `ReceiveFuture` is held across `Pending` returns
        // rather than rebuilt on every poll: a rebuilt future would drop
        // the very `ParkedReceiver` record a later sender wakes, losing
        // the value it was just handed (see struct doc on `in_flight`).
        let this = self.get_mut();
        if this.in_flight.is_none() {
            this.in_flight = Some(this.inner.receive_async());
        }
        let fut = this.in_flight.as_mut().unwrap();
        match Pin::new(fut).poll(cx) {
            Poll::Ready(Ok(v)) => {
                this.in_flight = None;
                Poll::Ready(Some(v))
            }
            Poll::Ready(Err(ChannelClosed)) => {
                this.in_flight = None;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Creates a bounded channel. `capacity` must be at least 1.
pub fn channel<T>(capacity: usize) -> Result<(Sender<T>, Receiver<T>), InvalidArgument> {
    if capacity < 1 {
        return Err(InvalidArgument { requested_capacity: capacity });
    }
    let inner = Arc::new(Inner {
        state: Mutex::new(State {
            buffer: RingBuffer::new(capacity),
            senders: WaitQueue::new(),
            receivers: WaitQueue::new(),
            selects: WaitQueue::new(),
            closed: false,
        }),
        sender_count: AtomicUsize::new(1),
        receiver_count: AtomicUsize::new(1),
    });
    Ok((Sender { inner: inner.clone() }, Receiver { inner, in_flight: None }))
}
