use proptest::prelude::*;
use treesum::*;
use test_helpers::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn sequential_matches_closed_form(depth in 0u32..=12, value in -10_000i32..10_000) {
        let root = build_tree(depth, value);
        let sum = SequentialReducer.reduce(Some(&*root), &NoopWorkload);
        destroy_tree(Some(root));

        let exact = i64::from(value) * ((1i64 << (depth + 1)) - 1);
        prop_assert_eq!(i64::from(sum), exact);
    }

    #[test]
    fn concurrency_does_not_change_the_sum(
        depth in 0u32..=9,
        value in any::<i32>(),
        workers in 1usize..8,
        thread_limit in 1usize..64,
    ) {
        let root = build_tree(depth, value);
        let oracle = SequentialReducer.reduce(Some(&*root), &NoopWorkload);

        let pooled = TaskPoolReducer::new(PoolConfig { workers }).reduce(Some(&*root), &NoopWorkload);
        let spawned = ThreadSpawnReducer::new(SpawnPolicy::new(thread_limit)).reduce(Some(&*root), &NoopWorkload);
        destroy_tree(Some(root));

        prop_assert_eq!(oracle, expected_sum(depth, value));
        prop_assert_eq!(pooled, oracle, "task pool diverged");
        prop_assert_eq!(spawned, oracle, "thread spawn diverged");
    }

    #[test]
    fn spawn_decision_is_monotone(thread_limit in 0usize..100_000, depth in 0u32..80) {
        let policy = SpawnPolicy::new(thread_limit);
        if policy.should_spawn(depth + 1) {
            prop_assert!(policy.should_spawn(depth), "spawning must stop for good once it stops");
        }
        prop_assert_eq!(policy.should_spawn(depth), depth < policy.cutoff_depth());
    }
}

#[test]
fn all_reducers_agree_on_small_trees() {
    for depth in 0..=6 {
        let root = build_tree(depth, 9);
        let sums: Vec<i32> = all_reducers()
            .iter()
            .map(|reducer| reducer.reduce(Some(&*root), &NoopWorkload))
            .collect();
        destroy_tree(Some(root));

        assert!(sums.windows(2).all(|pair| pair[0] == pair[1]), "depth {}: {:?}", depth, sums);
    }
}
