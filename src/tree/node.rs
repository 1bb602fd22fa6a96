//! Owned tree node
//!
//! Node = { value, left, right }, children uniquely owned via `Box`.
//! A node without children is a leaf.

use std::fmt;

/// Owning link to an optional subtree (`None` = empty tree)
pub type Link = Option<Box<Node>>;

/// Tree node carrying an integer payload
#[derive(Debug, PartialEq, Eq)]
pub struct Node {
    /// Payload, also the simulated work magnitude in milliseconds
    pub value: i32,

    /// Left subtree
    pub left: Link,

    /// Right subtree
    pub right: Link,
}

impl Node {
    /// Create a leaf
    pub fn leaf(value: i32) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// Check if leaf (no children)
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Borrow both children
    #[inline]
    pub fn children(&self) -> (Option<&Node>, Option<&Node>) {
        (self.left.as_deref(), self.right.as_deref())
    }

    /// Number of edges on the longest path down to a leaf
    pub fn height(&self) -> u32 {
        let (left, right) = self.children();
        match (left, right) {
            (None, None) => 0,
            _ => 1 + left.map_or(0, Node::height).max(right.map_or(0, Node::height)),
        }
    }

    /// Total number of nodes in this subtree
    pub fn count(&self) -> u64 {
        let (left, right) = self.children();
        1 + left.map_or(0, Node::count) + right.map_or(0, Node::count)
    }

    /// Check the complete-tree shape: every internal node has two children
    /// and every leaf sits at the same depth
    pub fn is_complete(&self) -> bool {
        fn leaf_depth(node: &Node) -> Option<u32> {
            match node.children() {
                (None, None) => Some(0),
                (Some(left), Some(right)) => {
                    let l = leaf_depth(left)?;
                    let r = leaf_depth(right)?;
                    (l == r).then_some(l + 1)
                }
                _ => None,
            }
        }

        leaf_depth(self).is_some()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            write!(f, "({})", self.value)
        } else {
            write!(f, "({} h={})", self.value, self.height())
        }
    }
}
