//! Sequential depth-first reduction; the correctness oracle

use super::{combine, Reducer};
use crate::tree::Node;
use crate::workload::Workload;

/// Plain recursive reduction on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialReducer;

impl SequentialReducer {
    /// Report name
    pub const NAME: &'static str = "sequential";
}

impl Reducer for SequentialReducer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn reduce(&self, root: Option<&Node>, workload: &dyn Workload) -> i32 {
        sequential_sum(root, workload)
    }
}

pub(crate) fn sequential_sum(node: Option<&Node>, workload: &dyn Workload) -> i32 {
    let Some(node) = node else {
        return 0;
    };

    let (left, right) = node.children();
    let left_sum = sequential_sum(left, workload);
    let right_sum = sequential_sum(right, workload);

    workload.compute(node);
    combine(node.value, left_sum, right_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, destroy_tree};
    use crate::workload::{NoopWorkload, RecordingWorkload};

    #[test]
    fn test_empty_tree_sums_to_zero() {
        assert_eq!(SequentialReducer.reduce(None, &NoopWorkload), 0);
    }

    #[test]
    fn test_single_leaf() {
        let root = build_tree(0, 5);
        assert_eq!(SequentialReducer.reduce(Some(&*root), &NoopWorkload), 5);
        destroy_tree(Some(root));
    }

    #[test]
    fn test_post_order_compute() {
        let root = build_tree(1, 1);
        let recorder = RecordingWorkload::new(NoopWorkload);

        assert_eq!(SequentialReducer.reduce(Some(&*root), &recorder), 3);

        let (left, right) = root.children();
        let parent = recorder.span(&root).expect("root computed");
        let left = recorder.span(left.expect("left child")).expect("left computed");
        let right = recorder.span(right.expect("right child")).expect("right computed");
        assert!(left.end < right.start, "sequential runs left before right");
        assert!(right.end < parent.start);
        destroy_tree(Some(root));
    }
}
