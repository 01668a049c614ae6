//! Unsorted-list priority queue
//!
//! Entries sit in a `Vec` in insertion order; `peek` and `dequeue` scan the
//! whole list for the extremal entry. O(1) enqueue, O(n) everything else.
//!
//! This variant exists as the reference oracle the heap-backed variants are
//! validated against, not as something to use at scale.

use crate::policy::OrderPolicy;
use crate::traits::{Entry, PriorityQueue, QueueError};

/// Unordered-sequence priority queue.
///
/// Ties resolve to the earliest-inserted entry: a scan only moves its
/// candidate when a later entry strictly outranks it.
#[derive(Debug, Clone)]
pub struct NaiveQueue<T, P> {
    items: Vec<Entry<T, P>>,
    policy: OrderPolicy<P>,
}

impl<T, P> NaiveQueue<T, P> {
    /// Index of the extremal entry, first match winning ties.
    fn top_index(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let mut best = 0;
        for (i, entry) in self.items.iter().enumerate().skip(1) {
            if self
                .policy
                .higher_priority(&entry.priority, &self.items[best].priority)
            {
                best = i;
            }
        }
        Some(best)
    }
}

impl<T, P> PriorityQueue<T, P> for NaiveQueue<T, P> {
    fn with_policy(policy: OrderPolicy<P>) -> Self {
        Self {
            items: Vec::new(),
            policy,
        }
    }

    fn policy(&self) -> &OrderPolicy<P> {
        &self.policy
    }

    fn size(&self) -> usize {
        self.items.len()
    }

    fn enqueue(&mut self, value: T, priority: P) -> &mut Self {
        self.items.push(Entry::new(value, priority));
        self
    }

    fn peek_entry(&self) -> Result<(&T, &P), QueueError> {
        let idx = self.top_index().ok_or(QueueError::EmptyQueue)?;
        let entry = &self.items[idx];
        Ok((&entry.value, &entry.priority))
    }

    fn dequeue_entry(&mut self) -> Result<(T, P), QueueError> {
        let idx = self.top_index().ok_or(QueueError::EmptyQueue)?;
        // Vec::remove keeps the remainder in insertion order, which is what
        // makes this variant a usable tie-breaking oracle.
        let entry = self.items.remove(idx);
        Ok((entry.value, entry.priority))
    }
}
