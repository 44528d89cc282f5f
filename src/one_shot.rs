//! The completion primitive shared by parked senders, parked receivers,
//! and select waiters.
//!
//! A `OneShot<T>` holds at most one value of `T`. It fires exactly once:
//! the first `set` wins, and a second `set` is silently ignored rather
//! than panicking, because a double-fire is an expected race (e.g. two
//! channels in the same `select()` call becoming ready back to back),
//! not a bug. The same record backs both a blocking caller (`wait`,
//! parked on a `Condvar`) and an async caller (`poll`, registering a
//! `Waker`) so `send`/`send_async` and `receive`/`receive_async` share
//! one parked-record type instead of needing two.

use std::sync::{Condvar, Mutex};
use std::task::{Context, Poll, Waker};

struct State<T> {
    value: Option<T>,
    waker: Option<Waker>,
}

pub struct OneShot<T> {
    state: Mutex<State<T>>,
    condvar: Condvar,
}

impl<T> OneShot<T> {
    pub fn new() -> Self {
        OneShot {
            state: Mutex::new(State { value: None, waker: None }),
            condvar: Condvar::new(),
        }
    }

    /// Fires the completion with `value`, waking whichever of a blocked
    /// thread or a polling task is registered. A `OneShot` that has
    /// already fired ignores this call.
    pub fn set(&self, value: T) {
        let mut guard = self.state.lock().unwrap();
        if guard.value.is_some() {
            return;
        }
        guard.value = Some(value);
        let waker = guard.waker.take();
        drop(guard);
        self.condvar.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Blocks the current thread until the completion fires, then
    /// returns its value.
    pub fn wait(&self) -> T {
        let mut guard = self.state.lock().unwrap();
        loop {
            if let Some(value) = guard.value.take() {
                return value;
            }
            guard = self.condvar.wait(guard).unwrap();
        }
    }

    /// Polls the completion for an async caller, registering `cx`'s
    /// waker if it hasn't fired yet.
    pub fn poll(&self, cx: &mut Context<'_>) -> Poll<T> {
        let mut guard = self.state.lock().unwrap();
        if let Some(value) = guard.value.take() {
            return Poll::Ready(value);
        }
        guard.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}
