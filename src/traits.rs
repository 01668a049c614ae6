//! Shared contract for the queue variants
//!
//! This module provides the two-tier trait hierarchy the variants implement:
//!
//! - [`PriorityQueue`]: the uniform enqueue/peek/dequeue/size contract
//! - [`ChangePriority`]: adds in-place priority updates for the variants that
//!   support them (binary, binomial, Fibonacci; the naive queue does not)
//!
//! All variants share the same observable semantics and differ only in cost
//! profile, so callers can swap one backend for another without touching the
//! call sites.

use std::fmt;

use crate::policy::OrderPolicy;

/// Error type for queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// `peek` or `dequeue` was called on a queue with no entries
    EmptyQueue,
    /// `change_priority` found no entry whose value matched
    NotFound,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::EmptyQueue => write!(f, "queue has no entries"),
            QueueError::NotFound => write!(f, "no entry matches the given value"),
        }
    }
}

impl std::error::Error for QueueError {}

/// The `(value, priority)` pair stored in a queue.
///
/// The value is opaque to the queue; it is compared only by equality when
/// `change_priority` locates an entry. The pair is immutable from outside the
/// queue once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<T, P> {
    pub value: T,
    pub priority: P,
}

impl<T, P> Entry<T, P> {
    pub fn new(value: T, priority: P) -> Self {
        Self { value, priority }
    }
}

/// Uniform contract exposed by every queue variant
///
/// A queue is constructed around an [`OrderPolicy`] and routes every internal
/// comparison through it, so the same code serves as a max-priority or
/// min-priority queue.
///
/// Mutating calls return `&mut Self` so construction chains fluently:
///
/// ```rust
/// use priority_queues::{BinaryHeapQueue, PriorityQueue};
///
/// let mut queue: BinaryHeapQueue<&str, i64> = BinaryHeapQueue::new();
/// queue.enqueue("low", 1).enqueue("high", 10);
/// assert_eq!(queue.peek(), Ok(&"high"));
/// ```
pub trait PriorityQueue<T, P> {
    /// Creates an empty queue governed by the given policy.
    fn with_policy(policy: OrderPolicy<P>) -> Self;

    /// Creates an empty queue with the default policy for `P`
    /// (max-priority for the numeric priority types).
    fn new() -> Self
    where
        Self: Sized,
        OrderPolicy<P>: Default,
    {
        Self::with_policy(OrderPolicy::default())
    }

    /// The policy this queue was constructed with.
    fn policy(&self) -> &OrderPolicy<P>;

    /// Current entry count.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Adds an entry. Never fails; returns the queue for chaining.
    fn enqueue(&mut self, value: T, priority: P) -> &mut Self;

    /// Adds an entry at the policy sentinel priority, i.e. behind every
    /// explicitly prioritized entry.
    fn enqueue_default(&mut self, value: T) -> &mut Self
    where
        Self: Sized,
        P: Clone,
    {
        let priority = self.policy().default_priority();
        self.enqueue(value, priority)
    }

    /// The extremal entry's value and priority, without removing it.
    fn peek_entry(&self) -> Result<(&T, &P), QueueError>;

    /// The extremal entry's value, without removing it.
    fn peek<'a>(&'a self) -> Result<&'a T, QueueError>
    where
        P: 'a,
    {
        self.peek_entry().map(|(value, _)| value)
    }

    /// Removes and returns the extremal entry.
    fn dequeue_entry(&mut self) -> Result<(T, P), QueueError>;

    /// Removes the extremal entry and returns its value.
    fn dequeue(&mut self) -> Result<T, QueueError> {
        self.dequeue_entry().map(|(value, _)| value)
    }
}

/// Extended contract for variants supporting in-place priority updates
///
/// The entry is located by value equality; when the same value occurs more
/// than once, the first match under the variant's documented traversal order
/// is updated. The update may move the entry in either direction: toward the
/// front when the new priority outranks the old one, toward the back
/// otherwise.
pub trait ChangePriority<T: PartialEq, P>: PriorityQueue<T, P> {
    /// Updates the priority of the first entry whose value equals `value`.
    ///
    /// # Errors
    /// Returns [`QueueError::NotFound`] if no entry matches.
    fn change_priority(&mut self, value: &T, new_priority: P) -> Result<(), QueueError>;
}
