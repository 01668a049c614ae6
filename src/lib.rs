//! Priority Queues with Pluggable Ordering
//!
//! This crate provides four priority queue backends behind one contract, so a
//! caller can trade implementation complexity against asymptotic cost without
//! touching call sites.
//!
//! # Variants
//!
//! - **Naive list** ([`NaiveQueue`]): O(1) enqueue; O(n) peek and dequeue
//! - **Binary heap** ([`BinaryHeapQueue`]): O(log n) enqueue and dequeue; O(1) peek
//! - **Binomial heap** ([`BinomialHeapQueue`]): O(log n) enqueue and dequeue; O(log n) union
//! - **Fibonacci heap** ([`FibonacciHeapQueue`]): O(1) enqueue; O(log n) amortized dequeue
//!
//! Which entry "wins" is decided by an [`OrderPolicy`]: a comparison function
//! plus a sentinel priority that every explicit priority outranks. The bundled
//! [`OrderPolicy::max_wins`] and [`OrderPolicy::min_wins`] policies cover the
//! common numeric cases; custom policies work on any priority type.
//!
//! # Example
//!
//! ```rust
//! use priority_queues::{BinaryHeapQueue, ChangePriority, PriorityQueue};
//!
//! let mut queue: BinaryHeapQueue<&str, i64> = BinaryHeapQueue::new();
//! queue.enqueue("walk the dog", 3).enqueue("fix the build", 9);
//! queue.enqueue_default("someday: learn sailing");
//!
//! assert_eq!(queue.peek(), Ok(&"fix the build"));
//! queue.change_priority(&"walk the dog", 11).unwrap();
//! assert_eq!(queue.dequeue(), Ok("walk the dog"));
//! ```

pub mod binary;
pub mod binomial;
pub mod fibonacci;
pub mod naive;
pub mod policy;
pub mod traits;

pub use binary::BinaryHeapQueue;
pub use binomial::BinomialHeapQueue;
pub use fibonacci::FibonacciHeapQueue;
pub use naive::NaiveQueue;
pub use policy::OrderPolicy;
pub use traits::{ChangePriority, Entry, PriorityQueue, QueueError};
