//! A fixed-capacity FIFO store of pending values.
//!
//! This is the leaf-most piece of the channel: it knows nothing about
//! waiting, closing, or fairness. All it does is hold up to `capacity`
//! values in the order they were pushed. It is not thread-safe on its
//! own — every caller reaches it through the channel's mutex, so the
//! preconditions below are enforced with `debug_assert!` rather than a
//! `Result`: tripping one means the Channel Core has a bug, not that the
//! caller passed bad input.

use std::collections::VecDeque;

pub struct RingBuffer<T> {
    capacity: usize,
    items: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        RingBuffer {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    /// Pushes `v` onto the tail of the buffer.
    ///
    /// # Panics (debug only)
    ///
    /// Panics if the buffer is already full. Callers must check
    /// `is_full()` first; this is a `ContractViolation`, not a
    /// recoverable error.
    pub fn enqueue(&mut self, v: T) {
        debug_assert!(!self.is_full(), "enqueue into a full ring buffer");
        self.items.push_back(v);
    }

    /// Pops a value off the head of the buffer.
    ///
    /// # Panics (debug only)
    ///
    /// Panics if the buffer is empty; see `enqueue`.
    pub fn dequeue(&mut self) -> T {
        debug_assert!(!self.is_empty(), "dequeue from an empty ring buffer");
        self.items.pop_front().expect("dequeue from an empty ring buffer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_and_drains_in_order() {
        let mut buf = RingBuffer::new(2);
        assert!(buf.is_empty());
        buf.enqueue(1);
        buf.enqueue(2);
        assert!(buf.is_full());
        assert_eq!(buf.dequeue(), 1);
        assert_eq!(buf.dequeue(), 2);
        assert!(buf.is_empty());
    }

    #[test]
    #[should_panic]
    fn enqueue_past_capacity_is_a_contract_violation() {
        let mut buf = RingBuffer::new(1);
        buf.enqueue(1);
        buf.enqueue(2);
    }

    #[test]
    #[should_panic]
    fn dequeue_empty_is_a_contract_violation() {
        let mut buf: RingBuffer<i32> = RingBuffer::new(1);
        buf.dequeue();
    }
}
