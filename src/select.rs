//! Waiting on several channels at once.
//!
//! `select` is built entirely on top of the public `try_receive`
//! surface plus one extra capability, [`Selectable`], that a channel's
//! `Receiver` exposes so the multiplexer can park on more than one
//! channel with a single waiter. No channel internals leak across this
//! boundary: `Selectable` is the entire contract.

use std::sync::Arc;

use crate::one_shot::OneShot;

/// A capability that lets [`select`] park a single [`Waiter`] across
/// several otherwise-unrelated channels.
///
/// Implemented by `Receiver<T>` for every `T`, which is what lets
/// `select` take cases built from channels of different element types
/// in the same call: the cases are held as `&dyn Selectable` plus a
/// type-erased "try it now" closure, not as a generic over `T`.
pub trait Selectable {
    /// Registers `waiter` to be fired the next time this channel has a
    /// value ready (or becomes readable for whatever other reason the
    /// implementation defines). If a value is already available,
    /// `waiter` is fired immediately, in addition to being enqueued —
    /// `select` tolerates being woken for a value someone else drains
    /// first.
    fn add_waiter(&self, waiter: Arc<Waiter>);

    /// Removes a previously added waiter. A no-op if it already fired
    /// and was popped, or was never added.
    fn remove_waiter(&self, waiter: &Arc<Waiter>);
}

/// The shared wake signal `select` parks on. One `Waiter` is created
/// per `select` call and registered with every case; the first case to
/// become ready fires it, and firing it a second time (two cases
/// racing) is silently ignored.
pub struct Waiter {
    completion: OneShot<()>,
}

impl Waiter {
    fn new() -> Self {
        Waiter { completion: OneShot::new() }
    }

    /// Wakes whatever is parked in [`Waiter::wait`]. Idempotent.
    pub fn fire(&self) {
        self.completion.set(());
    }

    fn wait(&self) {
        self.completion.wait();
    }
}

/// One arm of a [`select`] call: a channel to watch, paired with a
/// closure that attempts the operation and reports whether it
/// succeeded. Built by a channel's `case` method (e.g.
/// `Receiver::case`), not constructed directly.
pub struct SelectCase<'a> {
    selectable: &'a dyn Selectable,
    attempt: Box<dyn FnMut() -> bool + 'a>,
}

impl<'a> SelectCase<'a> {
    pub(crate) fn new<F>(selectable: &'a dyn Selectable, attempt: F) -> Self
    where
        F: FnMut() -> bool + 'a,
    {
        SelectCase { selectable, attempt: Box::new(attempt) }
    }
}

/// Blocks the current thread until one of `cases` is ready, runs that
/// case's callback, and returns.
///
/// Cases are tried in the order given on every pass, so when several
/// are simultaneously ready the first one listed wins — `select` makes
/// no fairness guarantee across calls, only this per-call determinism.
///
/// # Panics
///
/// Panics if `cases` is empty: there is nothing to wait on and the
/// call would otherwise block forever.
pub fn select(cases: &mut [SelectCase<'_>]) {
    assert!(!cases.is_empty(), "select called with no cases");
    loop {
        for case in cases.iter_mut() {
            if (case.attempt)() {
                return;
            }
        }

        let waiter = Arc::new(Waiter::new());
        for case in cases.iter() {
            case.selectable.add_waiter(waiter.clone());
        }
        waiter.wait();
        for case in cases.iter() {
            case.selectable.remove_waiter(&waiter);
        }
        // Loop back to the optimistic pass: the case that fired the
        // waiter may have already been drained by another consumer
        // (P7), so re-checking every case from scratch is required,
        // not just an optimization.
    }
}
