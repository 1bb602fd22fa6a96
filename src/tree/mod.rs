//! Complete binary tree with uniform node values
//!
//! The tree is materialized once by [`build_tree`], read concurrently by the
//! reducers, and released once by [`destroy_tree`]:
//!   Depth D ⇒ 2^(D+1) − 1 nodes, every leaf at depth D
//!   Expected sum = value × (2^(D+1) − 1) (mod 2^32)
//!
//! Ownership is strictly hierarchical: each child is a `Box` owned by its
//! parent, the root is owned by whoever built it. No sharing, no cycles.

mod build;
mod node;

pub use build::{build_tree, destroy_tree};
pub use node::{Link, Node};

/// Deepest tree the harness will build.
///
/// Depth 20 ⇒ ~2M nodes (~48 MiB on 64-bit targets); beyond that the node
/// count grows past what the benchmark can allocate comfortably.
pub const MAX_SAFE_DEPTH: u32 = 20;

/// Number of nodes in a complete tree of `depth`: 2^(depth+1) − 1
pub fn node_count(depth: u32) -> u64 {
    1u64.checked_shl(depth + 1).map_or(u64::MAX, |n| n - 1)
}

/// Ground-truth sum for a uniform-value complete tree
///
/// Uses the same wrapping 32-bit arithmetic as the reducers, so it stays the
/// exact oracle even when the true sum overflows.
pub fn expected_sum(depth: u32, value: i32) -> i32 {
    // Truncation to 32 bits commutes with multiplication mod 2^32.
    value.wrapping_mul(node_count(depth) as i32)
}
