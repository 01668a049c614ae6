//! Property-based tests using proptest
//!
//! Random operation sequences are run against every variant and checked
//! against the naive list queue as an oracle. Ties between equal priorities
//! may resolve differently per backend, so the properties compare priorities,
//! which the contract does pin down, rather than values.

use proptest::prelude::*;

use priority_queues::binary::BinaryHeapQueue;
use priority_queues::binomial::BinomialHeapQueue;
use priority_queues::fibonacci::FibonacciHeapQueue;
use priority_queues::naive::NaiveQueue;
use priority_queues::policy::OrderPolicy;
use priority_queues::traits::{ChangePriority, PriorityQueue};

/// Every peek and dequeue agrees with the naive oracle on the extremal
/// priority, and the sizes stay in lockstep.
fn check_against_oracle<Q: PriorityQueue<i32, i32>>(
    ops: Vec<(bool, i32)>,
) -> Result<(), TestCaseError> {
    let mut queue = Q::new();
    let mut oracle: NaiveQueue<i32, i32> = NaiveQueue::new();

    for (should_pop, priority) in ops {
        if should_pop && !oracle.is_empty() {
            let (_, got) = queue.dequeue_entry().map_err(|e| {
                TestCaseError::fail(format!("dequeue failed on non-empty queue: {e}"))
            })?;
            let (_, expected) = oracle.dequeue_entry().unwrap();
            prop_assert_eq!(got, expected);
        } else {
            queue.enqueue(priority, priority);
            oracle.enqueue(priority, priority);
        }

        prop_assert_eq!(queue.size(), oracle.size());
        match (queue.peek_entry(), oracle.peek_entry()) {
            (Ok((_, got)), Ok((_, expected))) => prop_assert_eq!(got, expected),
            (Err(got), Err(expected)) => prop_assert_eq!(got, expected),
            (got, expected) => {
                return Err(TestCaseError::fail(format!(
                    "peek disagrees with oracle: {got:?} vs {expected:?}"
                )))
            }
        }
    }
    Ok(())
}

/// Draining yields priorities in non-increasing order under the max policy.
fn check_drain_order<Q: PriorityQueue<i32, i32>>(values: Vec<i32>) -> Result<(), TestCaseError> {
    let mut queue = Q::new();
    for v in &values {
        queue.enqueue(*v, *v);
    }

    let mut last: Option<i32> = None;
    while let Ok((_, priority)) = queue.dequeue_entry() {
        if let Some(prev) = last {
            prop_assert!(
                priority <= prev,
                "priority {} dequeued after {}",
                priority,
                prev
            );
        }
        last = Some(priority);
    }
    prop_assert!(queue.is_empty());
    Ok(())
}

/// The min policy drains the same input in non-decreasing order.
fn check_min_policy_order<Q: PriorityQueue<i32, i32>>(
    values: Vec<i32>,
) -> Result<(), TestCaseError> {
    let mut queue = Q::with_policy(OrderPolicy::min_wins(i32::MAX));
    for v in &values {
        queue.enqueue(*v, *v);
    }

    let mut last: Option<i32> = None;
    while let Ok((_, priority)) = queue.dequeue_entry() {
        if let Some(prev) = last {
            prop_assert!(priority >= prev);
        }
        last = Some(priority);
    }
    Ok(())
}

/// Random priority updates over distinct values keep agreeing with a flat
/// model on the extremal priority.
fn check_change_priority_model<Q: ChangePriority<i32, i32>>(
    initial: Vec<i32>,
    changes: Vec<(usize, i32)>,
) -> Result<(), TestCaseError> {
    let mut queue = Q::new();
    // Values are the indices, so every value is distinct and each change
    // targets exactly one entry.
    let mut model: Vec<i32> = initial.clone();
    for (i, priority) in initial.iter().enumerate() {
        queue.enqueue(i as i32, *priority);
    }

    for (idx, new_priority) in changes {
        if idx >= model.len() {
            continue;
        }
        queue
            .change_priority(&(idx as i32), new_priority)
            .map_err(|e| TestCaseError::fail(format!("change_priority failed: {e}")))?;
        model[idx] = new_priority;

        let (_, top) = queue
            .peek_entry()
            .map_err(|e| TestCaseError::fail(format!("peek failed: {e}")))?;
        let expected = model.iter().max().unwrap();
        prop_assert_eq!(top, expected);
    }

    // Drain and confirm the updated multiset comes back in order.
    let mut drained = Vec::new();
    while let Ok((_, priority)) = queue.dequeue_entry() {
        drained.push(priority);
    }
    model.sort_unstable_by(|a, b| b.cmp(a));
    prop_assert_eq!(drained, model);
    Ok(())
}

macro_rules! queue_properties {
    ($variant:ident, $queue_type:ident) => {
        mod $variant {
            use super::*;

            proptest! {
                #[test]
                fn matches_oracle(
                    ops in prop::collection::vec((prop::bool::ANY, -100i32..100), 0..200)
                ) {
                    check_against_oracle::<$queue_type<i32, i32>>(ops)?;
                }

                #[test]
                fn drain_order(values in prop::collection::vec(-100i32..100, 0..200)) {
                    check_drain_order::<$queue_type<i32, i32>>(values)?;
                }

                #[test]
                fn min_policy_order(values in prop::collection::vec(-100i32..100, 0..200)) {
                    check_min_policy_order::<$queue_type<i32, i32>>(values)?;
                }
            }
        }
    };
}

macro_rules! change_priority_properties {
    ($variant:ident, $queue_type:ident) => {
        mod $variant {
            use super::*;

            proptest! {
                #[test]
                fn change_priority_matches_model(
                    initial in prop::collection::vec(-100i32..100, 1..50),
                    changes in prop::collection::vec((0usize..50, -100i32..100), 0..40)
                ) {
                    check_change_priority_model::<$queue_type<i32, i32>>(initial, changes)?;
                }
            }
        }
    };
}

queue_properties!(naive, NaiveQueue);
queue_properties!(binary, BinaryHeapQueue);
queue_properties!(binomial, BinomialHeapQueue);
queue_properties!(fibonacci, FibonacciHeapQueue);

change_priority_properties!(binary_changes, BinaryHeapQueue);
change_priority_properties!(binomial_changes, BinomialHeapQueue);
change_priority_properties!(fibonacci_changes, FibonacciHeapQueue);
