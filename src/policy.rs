//! Comparator policy shared by every queue variant
//!
//! All four queues are parameterized by an [`OrderPolicy`], which answers one
//! question: should priority `a` dequeue before priority `b`? The policy also
//! carries a sentinel priority that every other priority outranks, used as the
//! default when an entry is enqueued without an explicit priority.
//!
//! The predicate must be a strict weak ordering: irreflexive, asymmetric for
//! unequal priorities, and transitive. Violating that is a caller bug and is
//! not detected at runtime.

/// Pure predicate deciding whether the first priority dequeues before the second.
pub type HigherPriority<P> = fn(&P, &P) -> bool;

/// Ordering policy: a dequeue-first predicate plus the worst-possible priority.
///
/// The same queue code provides max-priority or min-priority behavior
/// depending on the policy it is constructed with:
///
/// ```rust
/// use priority_queues::policy::OrderPolicy;
///
/// let max: OrderPolicy<i64> = OrderPolicy::max_wins(i64::MIN);
/// assert!(max.higher_priority(&10, &3));
///
/// let min: OrderPolicy<i64> = OrderPolicy::min_wins(i64::MAX);
/// assert!(min.higher_priority(&3, &10));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct OrderPolicy<P> {
    higher: HigherPriority<P>,
    sentinel: P,
}

fn greater<P: PartialOrd>(a: &P, b: &P) -> bool {
    a > b
}

fn less<P: PartialOrd>(a: &P, b: &P) -> bool {
    a < b
}

impl<P> OrderPolicy<P> {
    /// Builds a policy from an arbitrary predicate.
    ///
    /// `sentinel` must be outranked by every priority the caller will ever
    /// enqueue; it doubles as the default priority for entries enqueued
    /// without one.
    pub fn new(sentinel: P, higher: HigherPriority<P>) -> Self {
        Self { higher, sentinel }
    }

    /// True if `a` should dequeue before `b`.
    #[inline]
    pub fn higher_priority(&self, a: &P, b: &P) -> bool {
        (self.higher)(a, b)
    }

    /// The default priority, outranked by everything else under this policy.
    pub fn default_priority(&self) -> P
    where
        P: Clone,
    {
        self.sentinel.clone()
    }
}

impl<P: PartialOrd> OrderPolicy<P> {
    /// Greater priority value dequeues first (max-priority queue).
    pub fn max_wins(sentinel: P) -> Self {
        Self::new(sentinel, greater::<P>)
    }

    /// Smaller priority value dequeues first (min-priority queue).
    pub fn min_wins(sentinel: P) -> Self {
        Self::new(sentinel, less::<P>)
    }
}

impl Default for OrderPolicy<i32> {
    fn default() -> Self {
        Self::max_wins(i32::MIN)
    }
}

impl Default for OrderPolicy<i64> {
    fn default() -> Self {
        Self::max_wins(i64::MIN)
    }
}

impl Default for OrderPolicy<f64> {
    fn default() -> Self {
        Self::max_wins(f64::NEG_INFINITY)
    }
}
