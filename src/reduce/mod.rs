//! Tree-sum reduction strategies
//!
//! All three strategies share one per-node protocol:
//!   Dispatch → WaitChildren → Compute → Combine → Done
//! WaitChildren is the only suspension point, and Compute/Combine always run
//! after both children are Done. They differ only in how children run:
//! - [`SequentialReducer`]: depth-first on the calling thread
//! - [`TaskPoolReducer`]: left child forked as a task on a fixed worker pool
//! - [`ThreadSpawnReducer`]: left child on a fresh OS thread, depth-gated

mod sequential;
mod task_pool;
mod thread_spawn;

pub use sequential::SequentialReducer;
pub use task_pool::{PoolConfig, TaskPoolReducer, DEFAULT_WORKERS};
pub use thread_spawn::{SpawnPolicy, SpawnSnapshot, ThreadSpawnReducer, DEFAULT_THREAD_LIMIT};

use std::fmt;

use crate::tree::Node;
use crate::workload::Workload;

/// A strategy for summing every node value of a tree
pub trait Reducer: Send + Sync {
    /// Short name used in reports
    fn name(&self) -> &'static str;

    /// Sum all values under `root`, running `workload` once per node
    ///
    /// An empty tree sums to 0.
    fn reduce(&self, root: Option<&Node>, workload: &dyn Workload) -> i32;
}

/// Combine a node with its children's partial sums (wrapping 32-bit)
#[inline]
pub(crate) fn combine(value: i32, left: i32, right: i32) -> i32 {
    value.wrapping_add(left).wrapping_add(right)
}

/// Selectable reduction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// Single-threaded depth-first baseline
    Sequential,
    /// Fork-join over a fixed worker pool
    TaskPool,
    /// One OS thread per spawn decision, bounded by depth
    ThreadSpawn,
}

impl Strategy {
    /// Every strategy, in reporting order
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::TaskPool, Strategy::ThreadSpawn];

    /// Instantiate the reducer for this strategy
    pub fn reducer(self, pool: PoolConfig, policy: SpawnPolicy) -> Box<dyn Reducer> {
        match self {
            Strategy::Sequential => Box::new(SequentialReducer),
            Strategy::TaskPool => Box::new(TaskPoolReducer::new(pool)),
            Strategy::ThreadSpawn => Box::new(ThreadSpawnReducer::new(policy)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Sequential => SequentialReducer::NAME,
            Strategy::TaskPool => TaskPoolReducer::NAME,
            Strategy::ThreadSpawn => ThreadSpawnReducer::NAME,
        };
        f.write_str(name)
    }
}
