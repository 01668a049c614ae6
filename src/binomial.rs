//! Binomial heap priority queue
//!
//! A forest of binomial trees, at most one per degree. A binomial tree of
//! order `k` has exactly `2^k` nodes: a root with `k` children that are
//! themselves binomial trees of orders `k-1 .. 0`. Because degrees mirror the
//! binary representation of the entry count, merging two forests works
//! exactly like binary addition with carry propagation.
//!
//! # Time Complexity
//!
//! | Operation         | Complexity                        |
//! |-------------------|-----------------------------------|
//! | `enqueue`         | O(log n) worst, O(1) amortized    |
//! | `peek`            | O(1) (tracked extremal root)      |
//! | `dequeue`         | O(log n)                          |
//! | `union`           | O(log n)                          |
//! | `change_priority` | O(n) search + O(log n) restore    |
//!
//! Priority changes restore heap order by swapping payloads along the
//! ancestor (or descendant) chain; the tree structure itself never changes
//! outside of link and union, unlike the Fibonacci variant's cuts.

use std::cell::RefCell;
use std::mem;
use std::rc::{Rc, Weak};

use crate::policy::OrderPolicy;
use crate::traits::{ChangePriority, PriorityQueue, QueueError};

type NodeRef<T, P> = Rc<RefCell<Node<T, P>>>;
type NodePtr<T, P> = Option<NodeRef<T, P>>;
type WeakNodeRef<T, P> = Weak<RefCell<Node<T, P>>>;

/// Tree node. Strong references flow downward (`child`, `sibling`); the
/// upward `parent` link is weak to avoid reference cycles.
struct Node<T, P> {
    value: T,
    priority: P,
    parent: Option<WeakNodeRef<T, P>>,
    /// First child; children are linked through `sibling`, most recently
    /// linked first, so a degree-k node's child list runs k-1 down to 0.
    child: NodePtr<T, P>,
    sibling: NodePtr<T, P>,
    degree: usize,
}

/// Binomial-forest priority queue.
///
/// Roots live in a degree-indexed slot array (`trees[k]` holds the order-`k`
/// tree, if any), which makes the no-two-roots-share-a-degree invariant
/// structural. A weak reference tracks the extremal root for O(1) peeks.
pub struct BinomialHeapQueue<T, P> {
    trees: Vec<NodePtr<T, P>>,
    top: Option<WeakNodeRef<T, P>>,
    len: usize,
    policy: OrderPolicy<P>,
}

impl<T, P> PriorityQueue<T, P> for BinomialHeapQueue<T, P> {
    fn with_policy(policy: OrderPolicy<P>) -> Self {
        Self {
            trees: Vec::new(),
            top: None,
            len: 0,
            policy,
        }
    }

    fn policy(&self) -> &OrderPolicy<P> {
        &self.policy
    }

    fn size(&self) -> usize {
        self.len
    }

    /// Creates a single-node order-0 tree and carries it into the forest,
    /// the way binary addition carries a 1 into a running sum.
    fn enqueue(&mut self, value: T, priority: P) -> &mut Self {
        let node = Rc::new(RefCell::new(Node {
            value,
            priority,
            parent: None,
            child: None,
            sibling: None,
            degree: 0,
        }));

        self.update_top_if_outranked(&node);

        let mut carry: NodePtr<T, P> = Some(node);
        let mut degree = 0;
        while let Some(tree) = carry.take() {
            if degree >= self.trees.len() {
                self.trees.push(None);
            }
            match self.trees[degree].take() {
                None => self.trees[degree] = Some(tree),
                Some(existing) => {
                    carry = Some(self.link_trees(existing, tree));
                    degree += 1;
                }
            }
        }

        self.len += 1;
        self
    }

    fn peek_entry(&self) -> Result<(&T, &P), QueueError> {
        let top_weak = self.top.as_ref().ok_or(QueueError::EmptyQueue)?;
        let top_rc = top_weak.upgrade().ok_or(QueueError::EmptyQueue)?;
        // The forest owns the node through `trees`, and `&self` freezes the
        // forest, so the reference stays valid for the borrow's lifetime even
        // though the local Rc is dropped here.
        let node_ptr = top_rc.as_ptr();
        unsafe { Ok((&(*node_ptr).value, &(*node_ptr).priority)) }
    }

    /// Removes the extremal root, re-files its children as an order-descending
    /// forest of their own, and unions that forest back into the remainder.
    fn dequeue_entry(&mut self) -> Result<(T, P), QueueError> {
        let top_weak = self.top.take().ok_or(QueueError::EmptyQueue)?;
        let top_rc = top_weak.upgrade().ok_or(QueueError::EmptyQueue)?;

        let degree = top_rc.borrow().degree;
        if degree < self.trees.len() {
            self.trees[degree] = None;
        }

        let mut child_forest = Self::detach_children(&top_rc);
        self.merge_forests(&mut child_forest);
        self.rescan_top();
        self.len -= 1;

        // Every other strong reference was just detached, so the unwrap of
        // the Rc cannot race anything.
        let node = Rc::try_unwrap(top_rc)
            .ok()
            .expect("extremal root still referenced after detach")
            .into_inner();
        Ok((node.value, node.priority))
    }
}

impl<T: PartialEq, P> ChangePriority<T, P> for BinomialHeapQueue<T, P> {
    /// First match under ascending root degree, pre-order within each tree,
    /// children in child-list order.
    fn change_priority(&mut self, value: &T, new_priority: P) -> Result<(), QueueError> {
        let node = self.find_node(value).ok_or(QueueError::NotFound)?;

        let (promoted, demoted) = {
            let current = node.borrow();
            (
                self.policy.higher_priority(&new_priority, &current.priority),
                self.policy.higher_priority(&current.priority, &new_priority),
            )
        };
        node.borrow_mut().priority = new_priority;

        if promoted {
            self.bubble_up(node);
        } else if demoted {
            self.sift_down(node);
        }
        // Heap order is restored, but the extremal root may have changed.
        self.rescan_top();
        Ok(())
    }
}

impl<T, P> BinomialHeapQueue<T, P> {
    /// Merges another queue into this one, like binary addition of the two
    /// forests. Both queues must have been built with the same policy; the
    /// receiver's policy governs the result.
    pub fn union(&mut self, mut other: Self) {
        let mut other_trees = mem::take(&mut other.trees);
        self.merge_forests(&mut other_trees);
        self.len += other.len;
        other.len = 0;
        other.top = None;
        self.rescan_top();
    }

    /// Links two trees of equal order into one of the next order. The root
    /// that is outranked becomes a child of the other; ties keep the first
    /// argument on top.
    fn link_trees(&self, a: NodeRef<T, P>, b: NodeRef<T, P>) -> NodeRef<T, P> {
        let a_stays_root = {
            let (a_ref, b_ref) = (a.borrow(), b.borrow());
            !self.policy.higher_priority(&b_ref.priority, &a_ref.priority)
        };
        let (parent, child) = if a_stays_root { (a, b) } else { (b, a) };

        {
            let mut child_ref = child.borrow_mut();
            let mut parent_ref = parent.borrow_mut();
            child_ref.parent = Some(Rc::downgrade(&parent));
            child_ref.sibling = parent_ref.child.take();
            parent_ref.child = Some(Rc::clone(&child));
            parent_ref.degree += 1;
        }

        parent
    }

    /// Detaches a root's children into a degree-indexed slot array of their
    /// own, with parent links cleared.
    fn detach_children(node: &NodeRef<T, P>) -> Vec<NodePtr<T, P>> {
        let mut forest: Vec<NodePtr<T, P>> = Vec::new();

        let mut current = node.borrow_mut().child.take();
        while let Some(child) = current {
            let next = child.borrow_mut().sibling.take();
            child.borrow_mut().parent = None;
            let degree = child.borrow().degree;
            while forest.len() <= degree {
                forest.push(None);
            }
            forest[degree] = Some(child);
            current = next;
        }

        forest
    }

    /// Carry-propagation merge of another forest's trees into this one.
    /// After it returns, at most one tree of each degree remains, exactly as
    /// binary addition leaves at most one bit per position.
    fn merge_forests(&mut self, other: &mut Vec<NodePtr<T, P>>) {
        let max_degree = self.trees.len().max(other.len());
        while self.trees.len() < max_degree {
            self.trees.push(None);
        }

        let mut carry: NodePtr<T, P> = None;
        for degree in 0..max_degree {
            let mut pending: Vec<NodeRef<T, P>> = Vec::new();
            if let Some(tree) = self.trees[degree].take() {
                pending.push(tree);
            }
            if degree < other.len() {
                if let Some(tree) = other[degree].take() {
                    pending.push(tree);
                }
            }
            if let Some(tree) = carry.take() {
                pending.push(tree);
            }

            // Link pairs until at most one tree of this degree remains; a
            // linked pair has the next degree and becomes the carry.
            while pending.len() > 1 {
                let a = pending.pop().expect("len checked");
                let b = pending.pop().expect("len checked");
                let linked = self.link_trees(a, b);
                if linked.borrow().degree == degree + 1 {
                    carry = Some(linked);
                } else {
                    pending.push(linked);
                }
            }

            if let Some(tree) = pending.pop() {
                if tree.borrow().degree == degree {
                    self.trees[degree] = Some(tree);
                } else {
                    carry = Some(tree);
                }
            }
        }

        if let Some(tree) = carry {
            let degree = tree.borrow().degree;
            while self.trees.len() <= degree {
                self.trees.push(None);
            }
            self.trees[degree] = Some(tree);
        }
    }

    /// Swaps payloads up the ancestor chain while the node outranks its
    /// parent. Structure is untouched, so degrees stay valid.
    fn bubble_up(&mut self, node: NodeRef<T, P>) {
        let mut current = node;
        loop {
            let parent_weak = match &current.borrow().parent {
                Some(parent) => parent.clone(),
                None => break,
            };
            let parent = match parent_weak.upgrade() {
                Some(parent) => parent,
                None => break,
            };

            let outranks = {
                let (cur_ref, par_ref) = (current.borrow(), parent.borrow());
                self.policy
                    .higher_priority(&cur_ref.priority, &par_ref.priority)
            };
            if !outranks {
                break;
            }

            {
                let mut cur_ref = current.borrow_mut();
                let mut par_ref = parent.borrow_mut();
                mem::swap(&mut cur_ref.priority, &mut par_ref.priority);
                mem::swap(&mut cur_ref.value, &mut par_ref.value);
            }
            current = parent;
        }
    }

    /// Swaps payloads down toward the children while one of them outranks
    /// the node. Counterpart of `bubble_up` for worsened priorities.
    fn sift_down(&mut self, node: NodeRef<T, P>) {
        let mut current = node;
        loop {
            let best_child = {
                let mut best: NodePtr<T, P> = None;
                let mut cursor = current.borrow().child.clone();
                while let Some(child) = cursor {
                    let replace = match &best {
                        None => true,
                        Some(b) => {
                            let (c_ref, b_ref) = (child.borrow(), b.borrow());
                            self.policy.higher_priority(&c_ref.priority, &b_ref.priority)
                        }
                    };
                    if replace {
                        best = Some(Rc::clone(&child));
                    }
                    cursor = child.borrow().sibling.clone();
                }
                best
            };

            let child = match best_child {
                Some(child) => child,
                None => break,
            };
            let child_outranks = {
                let (c_ref, cur_ref) = (child.borrow(), current.borrow());
                self.policy
                    .higher_priority(&c_ref.priority, &cur_ref.priority)
            };
            if !child_outranks {
                break;
            }

            {
                let mut c_ref = child.borrow_mut();
                let mut cur_ref = current.borrow_mut();
                mem::swap(&mut c_ref.priority, &mut cur_ref.priority);
                mem::swap(&mut c_ref.value, &mut cur_ref.value);
            }
            current = child;
        }
    }

    fn update_top_if_outranked(&mut self, node: &NodeRef<T, P>) {
        let should_update = match &self.top {
            Some(top_weak) => match top_weak.upgrade() {
                Some(top_rc) => {
                    let (node_ref, top_ref) = (node.borrow(), top_rc.borrow());
                    self.policy
                        .higher_priority(&node_ref.priority, &top_ref.priority)
                }
                None => true,
            },
            None => true,
        };
        if should_update {
            self.top = Some(Rc::downgrade(node));
        }
    }

    /// Rescans all roots for the extremal one. At most O(log n) roots exist.
    fn rescan_top(&mut self) {
        self.top = None;
        let roots: Vec<NodeRef<T, P>> = self.trees.iter().flatten().map(Rc::clone).collect();
        for root in roots {
            self.update_top_if_outranked(&root);
        }
    }

    fn find_node(&self, value: &T) -> Option<NodeRef<T, P>>
    where
        T: PartialEq,
    {
        for root in self.trees.iter().flatten() {
            if let Some(found) = Self::find_in_tree(root, value) {
                return Some(found);
            }
        }
        None
    }

    fn find_in_tree(node: &NodeRef<T, P>, value: &T) -> Option<NodeRef<T, P>>
    where
        T: PartialEq,
    {
        if node.borrow().value == *value {
            return Some(Rc::clone(node));
        }
        let mut cursor = node.borrow().child.clone();
        while let Some(child) = cursor {
            if let Some(found) = Self::find_in_tree(&child, value) {
                return Some(found);
            }
            cursor = child.borrow().sibling.clone();
        }
        None
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        let mut total = 0;
        for (degree, slot) in self.trees.iter().enumerate() {
            if let Some(root) = slot {
                assert!(root.borrow().parent.is_none(), "root has a parent link");
                assert_eq!(root.borrow().degree, degree, "root filed at wrong slot");
                total += self.check_subtree(root);
            }
        }
        assert_eq!(total, self.len, "node count disagrees with size()");
    }

    #[cfg(test)]
    fn check_subtree(&self, node: &NodeRef<T, P>) -> usize {
        let mut count = 1;
        let mut children = 0;
        let mut cursor = node.borrow().child.clone();
        while let Some(child) = cursor {
            {
                let (c_ref, n_ref) = (child.borrow(), node.borrow());
                assert!(
                    !self.policy.higher_priority(&c_ref.priority, &n_ref.priority),
                    "child outranks parent"
                );
            }
            count += self.check_subtree(&child);
            children += 1;
            cursor = child.borrow().sibling.clone();
        }
        let degree = node.borrow().degree;
        assert_eq!(children, degree, "degree disagrees with child count");
        assert_eq!(count, 1 << degree, "order-k tree must hold 2^k nodes");
        count
    }
}
