//! Hot, warm and cold segments

use crossbeam::queue::SegQueue;
use std::sync::atomic::{AtomicIsize, Ordering};

/// An unbounded lock-free FIFO with an externally maintained count.
///
/// The count is tracked separately from the queue so the cycling hot path
/// never has to ask the queue for its length. It may briefly disagree with the
/// queue while a dequeue is in progress, but every decrement is paired with a
/// successful pop or an immediate increment, so it always converges.
pub(crate) struct Segment<T> {
    queue: SegQueue<T>,
    count: AtomicIsize,
    capacity: usize,
}

impl<T> Segment<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: SegQueue::new(),
            count: AtomicIsize::new(0),
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn count(&self) -> isize {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) fn is_over_capacity(&self) -> bool {
        self.count() > self.capacity as isize
    }

    /// Whether the segment can take one more item without exceeding capacity.
    pub(crate) fn is_within_capacity(&self) -> bool {
        self.count() <= self.capacity as isize
    }

    pub(crate) fn enqueue(&self, item: T) {
        self.queue.push(item);
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    /// Take the tail item.
    ///
    /// The count is decremented before popping so that two racing cyclers
    /// both observing the segment as over capacity do not both drain it.
    pub(crate) fn dequeue(&self) -> Option<T> {
        self.count.fetch_sub(1, Ordering::AcqRel);
        match self.queue.pop() {
            Some(item) => Some(item),
            None => {
                self.count.fetch_add(1, Ordering::AcqRel);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order_and_count() {
        let segment = Segment::new(2);
        segment.enqueue(1);
        segment.enqueue(2);
        assert!(!segment.is_over_capacity());
        segment.enqueue(3);
        assert!(segment.is_over_capacity());
        assert_eq!(segment.count(), 3);

        assert_eq!(segment.dequeue(), Some(1));
        assert_eq!(segment.dequeue(), Some(2));
        assert_eq!(segment.count(), 1);
    }

    #[test]
    fn test_dequeue_on_empty_restores_count() {
        let segment: Segment<u32> = Segment::new(1);
        assert_eq!(segment.dequeue(), None);
        assert_eq!(segment.count(), 0);
        assert!(segment.is_within_capacity());
    }
}
