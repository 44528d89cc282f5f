//! A FIFO of parked, reference-counted records with O(n) removal by
//! identity.
//!
//! Used for all three of the channel's wait queues (senders, receivers,
//! selects). Constant-time enqueue/dequeue; removal is a linear scan
//! comparing `Arc` pointer identity, which is fine for the small
//! multiplexer fan-outs this is designed for (see the select module's
//! doc comment for the scaling note).

use std::collections::VecDeque;
use std::sync::Arc;

pub struct WaitQueue<T> {
    entries: VecDeque<Arc<T>>,
}

impl<T> WaitQueue<T> {
    pub fn new() -> Self {
        WaitQueue { entries: VecDeque::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push_back(&mut self, entry: Arc<T>) {
        self.entries.push_back(entry);
    }

    pub fn pop_front(&mut self) -> Option<Arc<T>> {
        self.entries.pop_front()
    }

    /// Removes the entry identical (by pointer) to `entry`, if present.
    pub fn remove(&mut self, entry: &Arc<T>) {
        if let Some(pos) = self.entries.iter().position(|e| Arc::ptr_eq(e, entry)) {
            self.entries.remove(pos);
        }
    }
}
