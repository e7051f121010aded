//! A link-based BST with explicit rebalancing. Each node owns its children
//! through `Box`es, so the tree is a plain owned graph with no sharing and
//! no parent pointers.
//!
//! The tree never rebalances on its own. Insertion order decides the shape,
//! [`Tree::is_balanced`] reports how degenerate that shape has become, and
//! [`Tree::rebalance`] rebuilds the whole tree at near-minimal height.
//!
//! # Examples
//!
//! ```
//! use linked_bst::linked::Tree;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), None);
//!
//! tree.add(1);
//! assert_eq!(tree.find(&1), Some(&1));
//!
//! // Removing an item returns it.
//! let removed = tree.remove(&1);
//!
//! assert_eq!(removed, Ok(1));
//! assert_eq!(tree.find(&1), None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use std::mem;

/// Errors triggered by tree operations.
///
/// Absence is only an error where the operation has no useful result
/// without the item ([`Tree::remove`], [`Tree::range_find`]). Lookups
/// signal absence with `None` instead.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested item is not stored in the tree.
    #[error("item not found in tree")]
    NotFound,
}

/// The slot a node hangs from: either the tree's root or a parent's child
/// pointer. A `&mut Link<T>` identifies both the parent and the side, so
/// deletion needs no sentinel above the root.
type Link<T> = Option<Box<Node<T>>>;

/// An owned cell holding one item and its subtrees.
#[derive(Clone, Debug)]
struct Node<T> {
    data: T,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new(data: T) -> Self {
        Node {
            data,
            left: None,
            right: None,
        }
    }
}

/// A Binary Search Tree of self-comparable items. The item is its own key:
/// lookups compare the probe against stored items with `T`'s total order.
///
/// Equal items are allowed. A tie descends to the right on insertion, so
/// duplicates sit in the right subtree of an equal node and come out
/// adjacent in sorted order.
#[derive(Clone, Debug)]
pub struct Tree<T> {
    root: Link<T>,
    size: usize,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Tree<T> {
    // `Box`'s own drop would recurse per level, which overflows the call
    // stack on a degenerate chain. Detach children first and drop each
    // node off an explicit stack instead.
    fn drop(&mut self) {
        let mut stack = Vec::new();
        stack.extend(self.root.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<T> fmt::Display for Tree<T>
where
    T: fmt::Display,
{
    /// Renders the tree rotated 90 degrees counterclockwise, one item per
    /// line, with `"| "` repeated once per level of depth.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reverse in-order: right subtree above the node, left below.
        let mut stack = Vec::new();
        let mut cur = self.root.as_deref();
        let mut depth = 0;
        loop {
            while let Some(node) = cur {
                stack.push((node, depth));
                cur = node.right.as_deref();
                depth += 1;
            }
            let (node, node_depth) = match stack.pop() {
                Some(entry) => entry,
                None => return Ok(()),
            };
            for _ in 0..node_depth {
                f.write_str("| ")?;
            }
            writeln!(f, "{}", node.data)?;
            cur = node.left.as_deref();
            depth = node_depth + 1;
        }
    }
}

impl<T> Tree<T> {
    /// Generates a new, empty `Tree`.
    pub fn new() -> Self {
        Tree {
            root: None,
            size: 0,
        }
    }

    /// The number of items stored in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Removes every item from the tree.
    pub fn clear(&mut self) {
        // Route the old nodes through `Drop`'s explicit stack.
        let _ = mem::replace(self, Tree::new());
    }

    /// Potentially finds the stored item equal to the probe. If no node
    /// holds an equal item, `None` is returned.
    ///
    /// Takes `O(height)` comparisons and has no side effects.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_bst::linked::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.add("hay");
    /// tree.add("needle");
    ///
    /// assert_eq!(tree.find(&"needle"), Some(&"needle"));
    /// assert_eq!(tree.find(&"nail"), None);
    /// ```
    pub fn find(&self, item: &T) -> Option<&T>
    where
        T: Ord,
    {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match item.cmp(&node.data) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Equal => return Some(&node.data),
                Ordering::Greater => cur = node.right.as_deref(),
            }
        }
        None
    }

    /// Whether an item equal to the probe is stored in the tree.
    pub fn contains(&self, item: &T) -> bool
    where
        T: Ord,
    {
        self.find(item).is_some()
    }

    /// Adds the item to the tree, descending left on smaller and right
    /// otherwise until a free slot is found. Equal items are not rejected:
    /// a tie descends right, so duplicates accumulate as right-descendants
    /// of an equal node. No rebalancing happens here.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_bst::linked::Tree;
    ///
    /// let mut tree = Tree::new();
    /// tree.add(1);
    /// tree.add(1);
    ///
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn add(&mut self, item: T)
    where
        T: Ord,
    {
        let mut cur = &mut self.root;
        loop {
            match cur {
                None => {
                    *cur = Some(Box::new(Node::new(item)));
                    break;
                }
                Some(node) => {
                    if item < node.data {
                        cur = &mut node.left;
                    } else {
                        cur = &mut node.right;
                    }
                }
            }
        }
        self.size += 1;
    }

    /// Removes the node holding an item equal to the probe and returns its
    /// item, or [`Error::NotFound`] if there is no such node. On failure
    /// the tree is unchanged.
    ///
    /// A single descent locates the link the target hangs from; that link
    /// stands in for the parent-and-side bookkeeping, so removing the root
    /// is not a special case. A target with two children has its item
    /// replaced by the largest item of its left subtree and the donor node
    /// spliced out, which leaves the right subtree untouched. A target with
    /// at most one child is replaced by that child directly.
    ///
    /// This operation does not rebalance.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_bst::linked::{Error, Tree};
    ///
    /// let mut tree = Tree::new();
    /// tree.add(1);
    ///
    /// assert_eq!(tree.remove(&1), Ok(1));
    /// assert_eq!(tree.remove(&1), Err(Error::NotFound));
    /// ```
    pub fn remove(&mut self, item: &T) -> Result<T, Error>
    where
        T: Ord,
    {
        let mut cur = &mut self.root;
        loop {
            let ordering = match cur {
                None => return Err(Error::NotFound),
                Some(node) => item.cmp(&node.data),
            };
            match ordering {
                Ordering::Less => cur = &mut cur.as_mut().expect("checked above").left,
                Ordering::Greater => cur = &mut cur.as_mut().expect("checked above").right,
                Ordering::Equal => {
                    let data = Self::splice_out(cur);
                    self.size -= 1;
                    return Ok(data);
                }
            }
        }
    }

    /// Detaches the node owned by `link` and returns its item, reattaching
    /// whatever must take its place. The caller has already located a node
    /// in `link`.
    fn splice_out(link: &mut Link<T>) -> T {
        let mut node = link.take().expect("caller located the node to splice");
        if node.left.is_some() && node.right.is_some() {
            let data = Self::lift_max_of_left(&mut node);
            *link = Some(node);
            data
        } else {
            let child = node.left.take().or_else(|| node.right.take());
            *link = child;
            node.data
        }
    }

    /// Overwrites `node`'s item with the largest item in its left subtree,
    /// splicing the donor node out and reattaching the donor's left child
    /// in its place. Returns the item previously held by `node`. The caller
    /// ensures `node` has a left child.
    fn lift_max_of_left(node: &mut Node<T>) -> T {
        let mut link = &mut node.left;
        while link.as_ref().map_or(false, |n| n.right.is_some()) {
            link = &mut link.as_mut().expect("checked by the loop condition").right;
        }
        let donor = link.take().expect("node has a left child");
        *link = donor.left;
        mem::replace(&mut node.data, donor.data)
    }

    /// If an item equal to the probe is stored, overwrites it in place with
    /// `replacement` and returns the old item, or returns `None` otherwise.
    ///
    /// # Ordering hazard
    ///
    /// The search order is **not** re-validated. If `replacement` does not
    /// sort into the same position as the item it overwrites, the tree's
    /// ordering invariant is broken and later lookups may miss items.
    /// Callers needing a genuine reordering should `remove` and `add`
    /// instead.
    pub fn replace(&mut self, item: &T, replacement: T) -> Option<T>
    where
        T: Ord,
    {
        let mut cur = self.root.as_deref_mut();
        while let Some(node) = cur {
            match item.cmp(&node.data) {
                Ordering::Less => cur = node.left.as_deref_mut(),
                Ordering::Equal => return Some(mem::replace(&mut node.data, replacement)),
                Ordering::Greater => cur = node.right.as_deref_mut(),
            }
        }
        None
    }

    /// The height of the tree in edges: a lone root has height 0, and each
    /// node's height is one more than its tallest child, a missing child
    /// counting as -1. An empty tree has height -1 by the same convention.
    pub fn height(&self) -> isize {
        let mut height = -1;
        let mut stack = Vec::new();
        if let Some(root) = self.root.as_deref() {
            stack.push((root, 0));
        }
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            if let Some(left) = node.left.as_deref() {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, depth + 1));
            }
        }
        height
    }

    /// Whether the tree's height is within the heuristic bound
    /// `height < 2 * log2(len + 1) - 1`.
    ///
    /// This is an approximate AVL-style test, not a strict structural
    /// invariant: it flags degenerate shapes worth a [`Tree::rebalance`]
    /// rather than certifying balance at every node. An empty tree counts
    /// as balanced.
    pub fn is_balanced(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        let bound = 2.0 * ((self.size + 1) as f64).log2() - 1.0;
        (self.height() as f64) < bound
    }

    /// Returns the sorted run of items from `low` through `high` inclusive.
    ///
    /// Both endpoints must be present as actual stored items: they are
    /// located by equality in the in-order sequence, not by boundary
    /// comparison, and an absent endpoint fails with [`Error::NotFound`].
    /// If `high` sorts before `low` the run is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_bst::linked::Tree;
    ///
    /// let tree: Tree<i32> = vec![5, 3, 8, 1, 4, 7, 9].into_iter().collect();
    ///
    /// assert_eq!(tree.range_find(&3, &8), Ok(vec![&3, &4, &5, &7, &8]));
    /// assert!(tree.range_find(&3, &6).is_err());
    /// ```
    pub fn range_find(&self, low: &T, high: &T) -> Result<Vec<&T>, Error>
    where
        T: Ord,
    {
        let items: Vec<&T> = self.inorder().collect();
        // With duplicates, the last equal item marks each endpoint.
        let low_pos = items
            .iter()
            .rposition(|x| *x == low)
            .ok_or(Error::NotFound)?;
        let high_pos = items
            .iter()
            .rposition(|x| *x == high)
            .ok_or(Error::NotFound)?;
        if high_pos < low_pos {
            return Ok(Vec::new());
        }
        Ok(items[low_pos..=high_pos].to_vec())
    }

    /// Rebuilds the tree at near-minimal height: `ceil(log2(len + 1)) - 1`
    /// edges for `len` items.
    ///
    /// The old structure is dismantled into its sorted item sequence (ties
    /// keep their relative order) and a fresh tree is built by lifting the
    /// middle item of each run to be the subtree root. Membership and
    /// length never change, only shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use linked_bst::linked::Tree;
    ///
    /// // Ascending insertion degenerates into a chain...
    /// let mut tree: Tree<i32> = (1..=7).collect();
    /// assert_eq!(tree.height(), 6);
    /// assert!(!tree.is_balanced());
    ///
    /// // ...until it is rebuilt.
    /// tree.rebalance();
    /// assert_eq!(tree.height(), 2);
    /// assert!(tree.is_balanced());
    /// ```
    pub fn rebalance(&mut self) {
        let items = self.drain_inorder();
        let len = items.len();
        let mut items = items.into_iter();
        self.root = Self::build_balanced(&mut items, len);
    }

    /// Dismantles the tree into its items in sorted order, leaving the root
    /// empty. `size` is deliberately left alone for `rebalance`.
    fn drain_inorder(&mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.size);
        let mut stack: Vec<Box<Node<T>>> = Vec::new();
        let mut cur = self.root.take();
        loop {
            while let Some(mut node) = cur {
                cur = node.left.take();
                stack.push(node);
            }
            let mut node = match stack.pop() {
                Some(node) => node,
                None => break,
            };
            cur = node.right.take();
            items.push(node.data);
        }
        items
    }

    /// Builds a minimal-height subtree from the next `len` items of a
    /// sorted sequence: the middle item becomes the root, the runs before
    /// and after it the left and right subtrees. Recursion depth is the
    /// height of the result, `O(log len)`.
    fn build_balanced(items: &mut std::vec::IntoIter<T>, len: usize) -> Link<T> {
        if len == 0 {
            return None;
        }
        let mid = len / 2;
        let left = Self::build_balanced(items, mid);
        let data = items.next().expect("len items remain in the sequence");
        let right = Self::build_balanced(items, len - mid - 1);
        Some(Box::new(Node { data, left, right }))
    }

    /// The smallest stored item strictly greater than the probe, or `None`
    /// if no stored item is greater. The probe itself need not be stored.
    ///
    /// This is a linear scan of the sorted sequence, not a pointer chase.
    pub fn successor(&self, item: &T) -> Option<&T>
    where
        T: Ord,
    {
        self.inorder().find(|&candidate| candidate > item)
    }

    /// The largest stored item strictly smaller than the probe, or `None`
    /// if no stored item is smaller. The probe itself need not be stored.
    pub fn predecessor(&self, item: &T) -> Option<&T>
    where
        T: Ord,
    {
        self.inorder().filter(|&candidate| candidate < item).last()
    }

    /// A preorder traversal: each node before its left subtree, the left
    /// subtree before the right. This is the tree's default iteration
    /// order, also reachable through `&tree` with a `for` loop.
    ///
    /// Every call starts a fresh traversal from the root.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }

    /// An in-order traversal: left subtree, node, right subtree, which
    /// yields the items in sorted order. Range queries, rebalancing, and
    /// the successor/predecessor scans are all built on this order.
    ///
    /// Every call starts a fresh traversal from the root.
    pub fn inorder(&self) -> Inorder<'_, T> {
        let mut iter = Inorder { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }
}

impl<T> FromIterator<T> for Tree<T>
where
    T: Ord,
{
    /// Builds a tree by adding the source's items one by one in input
    /// order. The input order decides the shape.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Tree::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<T> for Tree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// A preorder traversal over the items of a [`Tree`]. See [`Tree::iter`].
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        // Right below left so the left subtree is processed first.
        if let Some(right) = node.right.as_deref() {
            self.stack.push(right);
        }
        if let Some(left) = node.left.as_deref() {
            self.stack.push(left);
        }
        Some(&node.data)
    }
}

/// An in-order (sorted) traversal over the items of a [`Tree`]. See
/// [`Tree::inorder`].
pub struct Inorder<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Inorder<'a, T> {
    fn push_left_spine(&mut self, mut cur: Option<&'a Node<T>>) {
        while let Some(node) = cur {
            self.stack.push(node);
            cur = node.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Inorder<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.data)
    }
}


#[cfg(test)]
mod quicktests {
    use super::*;
    use crate::test::quick::Op;

    /// Applies a set of operations to a tree and a sorted vector. This way
    /// we can ensure that after a random smattering of adds, removes, and
    /// rebalances both hold the same multiset of items.
    fn do_ops<T>(ops: &[Op<T>], tree: &mut Tree<T>, model: &mut Vec<T>)
    where
        T: Ord + Clone + std::fmt::Debug,
    {
        for op in ops {
            match op {
                Op::Add(item) => {
                    tree.add(item.clone());
                    let pos = model.binary_search(item).unwrap_or_else(|pos| pos);
                    model.insert(pos, item.clone());
                }
                Op::Remove(item) => match model.binary_search(item) {
                    Ok(pos) => {
                        model.remove(pos);
                        assert_eq!(tree.remove(item), Ok(item.clone()));
                    }
                    Err(_) => assert_eq!(tree.remove(item), Err(Error::NotFound)),
                },
                Op::Rebalance => tree.rebalance(),
            }
        }
    }

    quickcheck::quickcheck! {
        fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
            let mut tree = Tree::new();
            let mut model = Vec::new();

            do_ops(&ops, &mut tree, &mut model);
            tree.len() == model.len() && tree.inorder().eq(model.iter())
        }
    }

    quickcheck::quickcheck! {
        fn inorder_is_sorted(xs: Vec<i8>) -> bool {
            let tree: Tree<i8> = xs.iter().copied().collect();
            let mut sorted = xs;
            sorted.sort();

            tree.inorder().eq(sorted.iter())
        }
    }

    quickcheck::quickcheck! {
        fn contains(xs: Vec<i8>) -> bool {
            let tree: Tree<i8> = xs.iter().copied().collect();

            xs.iter().all(|x| tree.contains(x))
        }
    }

    quickcheck::quickcheck! {
        fn rebalance_keeps_items_and_bounds_height(xs: Vec<i8>) -> bool {
            let mut tree: Tree<i8> = xs.iter().copied().collect();
            let before: Vec<i8> = tree.inorder().copied().collect();

            tree.rebalance();

            let after: Vec<i8> = tree.inorder().copied().collect();
            let minimal_height = ((tree.len() + 1) as f64).log2().ceil() as isize - 1;

            before == after && tree.len() == before.len() && tree.height() <= minimal_height
        }
    }
}
