//! Thread-per-spawn reduction with a depth-based thread budget
//!
//! At recursion depth d a node spawns one OS thread for its left subtree
//! only while 2^d < L (L = thread limit), recursing on the right subtree in
//! place and joining before its compute step. Below the cutoff everything is
//! sequential, so at most 2^cutoff − 1 threads are ever spawned no matter
//! how deep the tree is.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, Scope};

use tracing::{debug, warn};

use super::{combine, Reducer};
use crate::tree::Node;
use crate::workload::Workload;

/// Thread limit used when none is configured
pub const DEFAULT_THREAD_LIMIT: usize = 10;

/// Depth-gated spawn decision, independent of any threading API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPolicy {
    thread_limit: usize,
}

impl SpawnPolicy {
    /// Policy for thread limit L
    pub fn new(thread_limit: usize) -> Self {
        Self { thread_limit }
    }

    /// Configured limit L
    pub fn thread_limit(&self) -> usize {
        self.thread_limit
    }

    /// Spawn at `depth` iff 2^depth < L
    #[inline]
    pub fn should_spawn(&self, depth: u32) -> bool {
        1usize
            .checked_shl(depth)
            .is_some_and(|width| width < self.thread_limit)
    }

    /// First depth at which spawning stops: smallest d with 2^d ≥ L
    pub fn cutoff_depth(&self) -> u32 {
        let mut depth = 0;
        while self.should_spawn(depth) {
            depth += 1;
        }
        depth
    }

    /// Upper bound on threads spawned by one reduction: 2^cutoff − 1
    ///
    /// Every spawning level d < cutoff holds at most 2^d nodes.
    pub fn max_spawned_threads(&self) -> usize {
        1usize
            .checked_shl(self.cutoff_depth())
            .map_or(usize::MAX, |n| n - 1)
    }
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THREAD_LIMIT)
    }
}

/// Spawn accounting of the most recent reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnSnapshot {
    /// Threads successfully spawned
    pub spawned: usize,
    /// Most spawned threads alive at the same instant
    pub peak_live: usize,
    /// Spawns the OS refused (subtree reduced inline instead)
    pub refused: usize,
}

#[derive(Debug, Default)]
struct SpawnStats {
    spawned: AtomicUsize,
    live: AtomicUsize,
    peak_live: AtomicUsize,
    refused: AtomicUsize,
}

impl SpawnStats {
    fn reset(&self) {
        self.spawned.store(0, Ordering::SeqCst);
        self.live.store(0, Ordering::SeqCst);
        self.peak_live.store(0, Ordering::SeqCst);
        self.refused.store(0, Ordering::SeqCst);
    }

    fn enter(&self) {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_live.fetch_max(live, Ordering::SeqCst);
    }

    fn started(&self) {
        self.spawned.fetch_add(1, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }

    fn refuse(&self) {
        self.exit();
        self.refused.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> SpawnSnapshot {
        SpawnSnapshot {
            spawned: self.spawned.load(Ordering::SeqCst),
            peak_live: self.peak_live.load(Ordering::SeqCst),
            refused: self.refused.load(Ordering::SeqCst),
        }
    }
}

/// Reducer that spawns scoped OS threads down to the policy cutoff
///
/// Spawn counters are reset at the start of each reduction; run one
/// reduction at a time per reducer for [`Self::last_run`] to be meaningful.
#[derive(Debug, Default)]
pub struct ThreadSpawnReducer {
    policy: SpawnPolicy,
    stats: SpawnStats,
}

impl ThreadSpawnReducer {
    /// Report name
    pub const NAME: &'static str = "thread-spawn";

    /// Reducer following `policy`
    pub fn new(policy: SpawnPolicy) -> Self {
        Self {
            policy,
            stats: SpawnStats::default(),
        }
    }

    /// Spawn policy in use
    pub fn policy(&self) -> SpawnPolicy {
        self.policy
    }

    /// Spawn accounting of the most recent reduction
    pub fn last_run(&self) -> SpawnSnapshot {
        self.stats.snapshot()
    }
}

impl Reducer for ThreadSpawnReducer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn reduce(&self, root: Option<&Node>, workload: &dyn Workload) -> i32 {
        self.stats.reset();
        let spawner = Spawner {
            policy: self.policy,
            stats: &self.stats,
            workload,
        };

        let sum = thread::scope(|scope| spawner.sum(scope, root, 0));

        let snapshot = self.stats.snapshot();
        debug!(
            spawned = snapshot.spawned,
            peak_live = snapshot.peak_live,
            refused = snapshot.refused,
            cutoff = self.policy.cutoff_depth(),
            "thread-spawn reduction finished"
        );
        sum
    }
}

struct Spawner<'env> {
    policy: SpawnPolicy,
    stats: &'env SpawnStats,
    workload: &'env dyn Workload,
}

impl<'env> Spawner<'env> {
    fn sum<'scope>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        node: Option<&'env Node>,
        depth: u32,
    ) -> i32 {
        let Some(node) = node else {
            return 0;
        };

        let (left, right) = node.children();
        let (left_sum, right_sum) = if left.is_some() && self.policy.should_spawn(depth) {
            self.fork(scope, left, right, depth)
        } else {
            (
                self.sum(scope, left, depth + 1),
                self.sum(scope, right, depth + 1),
            )
        };

        self.workload.compute(node);
        combine(node.value, left_sum, right_sum)
    }

    fn fork<'scope>(
        &'env self,
        scope: &'scope Scope<'scope, 'env>,
        left: Option<&'env Node>,
        right: Option<&'env Node>,
        depth: u32,
    ) -> (i32, i32) {
        self.stats.enter();
        let spawned = thread::Builder::new()
            .name(format!("treesum-spawn-d{depth}"))
            .spawn_scoped(scope, move || self.sum(scope, left, depth + 1));

        match spawned {
            Ok(handle) => {
                self.stats.started();
                let right_sum = self.sum(scope, right, depth + 1);
                let left_sum = handle
                    .join()
                    .unwrap_or_else(|payload| panic::resume_unwind(payload));
                self.stats.exit();
                (left_sum, right_sum)
            }
            Err(err) => {
                self.stats.refuse();
                warn!(depth, error = %err, "thread spawn refused; reducing left subtree inline");
                (
                    self.sum(scope, left, depth + 1),
                    self.sum(scope, right, depth + 1),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{build_tree, destroy_tree, expected_sum};
    use crate::workload::NoopWorkload;

    #[test]
    fn test_should_spawn_cutoff() {
        let policy = SpawnPolicy::new(10);
        assert!(policy.should_spawn(0)); // 1 < 10
        assert!(policy.should_spawn(3)); // 8 < 10
        assert!(!policy.should_spawn(4)); // 16 ≥ 10
        assert!(!policy.should_spawn(200));
        assert_eq!(policy.cutoff_depth(), 4);
        assert_eq!(policy.max_spawned_threads(), 15);
    }

    #[test]
    fn test_tiny_limits_never_spawn() {
        for limit in [0, 1] {
            let policy = SpawnPolicy::new(limit);
            assert!(!policy.should_spawn(0));
            assert_eq!(policy.cutoff_depth(), 0);
            assert_eq!(policy.max_spawned_threads(), 0);
        }
    }

    #[test]
    fn test_power_of_two_limit() {
        let policy = SpawnPolicy::new(8);
        assert!(policy.should_spawn(2));
        assert!(!policy.should_spawn(3));
        assert_eq!(policy.max_spawned_threads(), 7);
    }

    #[test]
    fn test_reduce_matches_oracle_and_counts_spawns() {
        let reducer = ThreadSpawnReducer::new(SpawnPolicy::new(10));
        let root = build_tree(6, 3);

        assert_eq!(reducer.reduce(Some(&*root), &NoopWorkload), expected_sum(6, 3));

        let run = reducer.last_run();
        assert_eq!(run.spawned, 15);
        assert_eq!(run.refused, 0);
        assert!(run.peak_live <= reducer.policy().max_spawned_threads());
        destroy_tree(Some(root));
    }

    #[test]
    fn test_shallow_tree_spawns_only_for_internal_nodes() {
        let reducer = ThreadSpawnReducer::new(SpawnPolicy::new(1 << 20));
        let root = build_tree(2, 1);

        assert_eq!(reducer.reduce(Some(&*root), &NoopWorkload), 7);
        // depths 0 and 1 hold the 3 internal nodes; leaves have nothing to fork
        assert_eq!(reducer.last_run().spawned, 3);
        destroy_tree(Some(root));
    }

    #[test]
    fn test_stats_reset_between_runs() {
        let reducer = ThreadSpawnReducer::new(SpawnPolicy::new(4));
        let root = build_tree(5, 1);

        reducer.reduce(Some(&*root), &NoopWorkload);
        reducer.reduce(Some(&*root), &NoopWorkload);
        assert_eq!(reducer.last_run().spawned, 3);
        destroy_tree(Some(root));
    }
}
