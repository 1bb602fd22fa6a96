//! Fork-join reduction over a fixed worker pool
//!
//! Per node: the left subtree is submitted as a task, the right subtree runs
//! on the current worker, and `join` is the barrier that waits for both
//! before the node's compute step. Tasks that no worker has picked up yet
//! stay queued; a waiting worker runs queued tasks itself instead of idling.

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use super::sequential::sequential_sum;
use super::{combine, Reducer};
use crate::tree::Node;
use crate::workload::Workload;

/// Pool size used when none is configured
pub const DEFAULT_WORKERS: usize = 20;

/// Worker pool parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads W
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Task-based fork-join reducer
///
/// Falls back to running every task inline on the submitting thread when the
/// pool could not be started.
#[derive(Debug)]
pub struct TaskPoolReducer {
    pool: Option<ThreadPool>,
}

impl TaskPoolReducer {
    /// Report name
    pub const NAME: &'static str = "task-pool";

    /// Start a pool of `config.workers` threads
    pub fn new(config: PoolConfig) -> Self {
        let built = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|index| format!("treesum-worker-{index}"))
            .build();

        match built {
            Ok(pool) => {
                debug!(workers = pool.current_num_threads(), "task pool started");
                Self { pool: Some(pool) }
            }
            Err(err) => {
                warn!(workers = config.workers, error = %err, "task pool failed to start; tasks will run inline");
                Self::inline()
            }
        }
    }

    /// Reducer without a pool: every task runs on the submitting thread
    pub fn inline() -> Self {
        Self { pool: None }
    }

    /// Whether tasks run inline because no pool is available
    pub fn is_degraded(&self) -> bool {
        self.pool.is_none()
    }

    /// Threads available to run tasks (1 when degraded)
    pub fn workers(&self) -> usize {
        self.pool.as_ref().map_or(1, ThreadPool::current_num_threads)
    }
}

impl Reducer for TaskPoolReducer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn reduce(&self, root: Option<&Node>, workload: &dyn Workload) -> i32 {
        match &self.pool {
            // The initial call runs on a worker, like a single producer
            // inside a parallel region.
            Some(pool) => pool.install(|| fork_join_sum(root, workload)),
            None => sequential_sum(root, workload),
        }
    }
}

fn fork_join_sum(node: Option<&Node>, workload: &dyn Workload) -> i32 {
    let Some(node) = node else {
        return 0;
    };

    let (left, right) = node.children();
    // join runs its first closure in place and queues the second as a task
    let (right_sum, left_sum) = rayon::join(
        || fork_join_sum(right, workload),
        || fork_join_sum(left, workload),
    );

    workload.compute(node);
    combine(node.value, left_sum, right_sum)
}
