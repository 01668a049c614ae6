//! Binary heap priority queue
//!
//! A complete binary tree stored as a dense `Vec`: the entry at index `i` has
//! children at `2i + 1` and `2i + 2` and its parent at `(i - 1) / 2`. Every
//! operation restores the heap-order property by sifting an entry up or down.
//!
//! # Time Complexity
//!
//! | Operation         | Complexity              |
//! |-------------------|-------------------------|
//! | `enqueue`         | O(log n)                |
//! | `peek`            | O(1)                    |
//! | `dequeue`         | O(log n)                |
//! | `change_priority` | O(n) search + O(log n)  |

use crate::policy::OrderPolicy;
use crate::traits::{ChangePriority, Entry, PriorityQueue, QueueError};

/// Dense-array binary heap.
///
/// Sift-up moves an entry only while it strictly outranks its parent, so
/// equal-priority entries never displace an earlier arrival on the way up.
/// Sift-down hands the root slot over unless the entry strictly outranks its
/// preferred child.
#[derive(Debug, Clone)]
pub struct BinaryHeapQueue<T, P> {
    items: Vec<Entry<T, P>>,
    policy: OrderPolicy<P>,
}

impl<T, P> BinaryHeapQueue<T, P> {
    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self
                .policy
                .higher_priority(&self.items[idx].priority, &self.items[parent].priority)
            {
                self.items.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut pick = left;
            if right < len
                && self
                    .policy
                    .higher_priority(&self.items[right].priority, &self.items[pick].priority)
            {
                pick = right;
            }
            // The entry keeps its slot only while it strictly outranks the
            // preferred child; on a tie the child moves up.
            if self
                .policy
                .higher_priority(&self.items[idx].priority, &self.items[pick].priority)
            {
                break;
            }
            self.items.swap(idx, pick);
            idx = pick;
        }
    }

    /// Updates the priority at `idx` and re-sifts in whichever direction the
    /// comparison demands.
    fn reprioritize(&mut self, idx: usize, new_priority: P) {
        let promoted = self
            .policy
            .higher_priority(&new_priority, &self.items[idx].priority);
        let demoted = self
            .policy
            .higher_priority(&self.items[idx].priority, &new_priority);
        self.items[idx].priority = new_priority;
        if promoted {
            self.sift_up(idx);
        } else if demoted {
            self.sift_down(idx);
        }
    }

    /// Like [`ChangePriority::change_priority`], but with the entry's current
    /// index supplied by the caller, skipping the linear search.
    ///
    /// # Errors
    /// Returns [`QueueError::NotFound`] if `index` is out of range or the
    /// entry there does not hold `value`.
    pub fn change_priority_with_hint(
        &mut self,
        value: &T,
        new_priority: P,
        index: usize,
    ) -> Result<(), QueueError>
    where
        T: PartialEq,
    {
        match self.items.get(index) {
            Some(entry) if entry.value == *value => {
                self.reprioritize(index, new_priority);
                Ok(())
            }
            _ => Err(QueueError::NotFound),
        }
    }

    #[cfg(test)]
    fn assert_heap_order(&self) {
        for idx in 1..self.items.len() {
            let parent = (idx - 1) / 2;
            assert!(
                !self
                    .policy
                    .higher_priority(&self.items[idx].priority, &self.items[parent].priority),
                "child at {idx} outranks its parent at {parent}"
            );
        }
    }
}

impl<T, P> PriorityQueue<T, P> for BinaryHeapQueue<T, P> {
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
        self.sift_up(self.items.len() - 1);
        self
    }

    fn peek_entry(&self) -> Result<(&T, &P), QueueError> {
        self.items
            .first()
            .map(|entry| (&entry.value, &entry.priority))
            .ok_or(QueueError::EmptyQueue)
    }

    fn dequeue_entry(&mut self) -> Result<(T, P), QueueError> {
        if self.items.is_empty() {
            return Err(QueueError::EmptyQueue);
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let entry = self.items.pop().ok_or(QueueError::EmptyQueue)?;
        if !self.items.is_empty() {
            self.sift_down(0);
        }
        Ok((entry.value, entry.priority))
    }
}

impl<T: PartialEq, P> ChangePriority<T, P> for BinaryHeapQueue<T, P> {
    /// First match is the lowest index holding an equal value.
    fn change_priority(&mut self, value: &T, new_priority: P) -> Result<(), QueueError> {
        let idx = self
            .items
            .iter()
            .position(|entry| entry.value == *value)
            .ok_or(QueueError::NotFound)?;
        self.reprioritize(idx, new_priority);
        Ok(())
    }
}
