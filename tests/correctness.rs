//! Correctness tests: every reducer matches the closed-form oracle

use test_case::test_case;
use treesum::*;
use test_helpers::*;

#[test_case(0, 5, 5 ; "single leaf")]
#[test_case(2, 1, 7 ; "seven nodes")]
#[test_case(3, 2, 30 ; "fifteen nodes")]
#[test_case(10, 0, 0 ; "zero valued")]
fn test_scenarios_with_real_delay(depth: u32, value: i32, expected: i32) {
    let root = build_tree(depth, value);
    assert_eq!(root.count(), node_count(depth));

    for reducer in all_reducers() {
        let sum = reducer.reduce(Some(&*root), &SleepWorkload);
        assert_eq!(sum, expected, "{} disagrees", reducer.name());
    }

    destroy_tree(Some(root));
}

#[test_case(10, 1, 2047 ; "depth ten")]
#[test_case(12, -7, -57337 ; "negative values")]
#[test_case(MAX_SAFE_DEPTH, 1, 2_097_151 ; "deepest safe tree")]
fn test_scenarios_without_delay(depth: u32, value: i32, expected: i32) {
    let root = build_tree(depth, value);

    for reducer in all_reducers() {
        assert_eq!(reducer.reduce(Some(&*root), &NoopWorkload), expected, "{}", reducer.name());
    }

    destroy_tree(Some(root));
}

#[test]
fn test_overflowing_sum_is_identical_across_reducers() {
    let root = build_tree(8, i32::MAX);
    let expected = expected_sum(8, i32::MAX);

    for reducer in all_reducers() {
        assert_eq!(reducer.reduce(Some(&*root), &NoopWorkload), expected, "{}", reducer.name());
    }

    destroy_tree(Some(root));
}

#[test]
fn test_empty_tree_sums_to_zero() {
    for reducer in all_reducers() {
        assert_eq!(reducer.reduce(None, &NoopWorkload), 0, "{}", reducer.name());
    }
}

#[test]
fn test_degraded_pool_still_reduces() {
    let reducer = TaskPoolReducer::inline();
    let root = build_tree(6, 4);

    assert_eq!(reducer.reduce(Some(&*root), &NoopWorkload), expected_sum(6, 4));
    destroy_tree(Some(root));
}

#[test]
fn test_reducers_are_reusable() {
    let reducers = all_reducers();
    for depth in [1, 4, 7] {
        let root = build_tree(depth, 3);
        for reducer in &reducers {
            assert_eq!(reducer.reduce(Some(&*root), &NoopWorkload), expected_sum(depth, 3));
        }
        destroy_tree(Some(root));
    }
}
