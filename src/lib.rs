//! This crate exposes a link-based Binary Search Tree (BST) whose items
//! are their own keys, together with balance diagnostics and a full
//! rebalancing pass.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` holds one item and
//! sometimes has child `Node`s. The important invariants of this tree are:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree hold an item
//!    less than its own item.
//! 2. For every `Node`, all the `Node`s in its right subtree hold an item
//!    greater than *or equal to* its own item. Ties go right, so equal
//!    items may be stored more than once.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching the tree takes `O(height)` (where `height` is defined as the
//! longest path from the root `Node` to a leaf `Node`, in edges). Nothing
//! keeps the height small on its own: inserting items in ascending order
//! degenerates the tree into a chain of `N - 1` edges. The tree instead
//! reports when its shape has drifted ([`linked::Tree::is_balanced`]) and
//! rebuilds itself at near-minimal height on demand
//! ([`linked::Tree::rebalance`]). BSTs also naturally support sorted
//! iteration by visiting the left subtree, then the subtree root, then the
//! right subtree ([`linked::Tree::inorder`]).

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod linked;

#[cfg(test)]
pub(crate) mod test;
