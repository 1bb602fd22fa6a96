//! Tree construction and teardown
//!
//! Builder: pre-order (value set before children are built)
//! Destroyer: post-order (children released before their parent)

use super::{Link, Node};

/// Build a complete binary tree of `depth` where every node holds `value`
///
/// `depth` must already be validated (see [`crate::BenchConfig`]); the node
/// count is exponential in it.
pub fn build_tree(depth: u32, value: i32) -> Box<Node> {
    let mut node = Box::new(Node::leaf(value));

    if depth > 0 {
        node.left = Some(build_tree(depth - 1, value));
        node.right = Some(build_tree(depth - 1, value));
    }

    node
}

/// Release every node of `root`, children before parent
///
/// Taking the link by value makes a second release of the same tree
/// impossible; an empty link is a no-op.
pub fn destroy_tree(root: Link) {
    if let Some(mut node) = root {
        destroy_tree(node.left.take());
        destroy_tree(node.right.take());
        drop(node);
    }
}
