//! # Fork-Join Tree Sum Benchmark
//!
//! Sums a complete binary tree with three competing strategies and times
//! each one. Every node carries a simulated cost (a blocking delay of
//! `value` ms), so the tree stands in for an irregular divide-and-conquer
//! workload where task granularity and spawn overhead matter.
//!
//! ## Pipeline
//!
//! 1. **Build**: complete tree of depth D, 2^(D+1) − 1 nodes of equal value
//! 2. **Reduce**: sequential, task-pool fork-join, depth-gated thread spawn
//! 3. **Destroy**: post-order release, exactly once
//!
//! All reducers return the same wrapping 32-bit sum: value × (2^(D+1) − 1).
//!
//! ## Usage Example
//!
//! ```no_run
//! use treesum::{BenchConfig, Benchmark};
//!
//! let config = BenchConfig::new(10, 1)?;
//! let report = Benchmark::new(config).run();
//! assert!(report.all_agree());
//! # Ok::<(), treesum::TreeSumError>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod reduce; // Reduction strategies
pub mod tree; // Tree builder / destroyer
pub mod workload; // Simulated per-node compute step

// Re-exports for convenience
pub use reduce::{
    PoolConfig, Reducer, SequentialReducer, SpawnPolicy, SpawnSnapshot, Strategy,
    TaskPoolReducer, ThreadSpawnReducer,
};
pub use tree::{build_tree, destroy_tree, expected_sum, node_count, Node, MAX_SAFE_DEPTH};
pub use workload::{NoopWorkload, SleepWorkload, Workload};

use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};

/// Benchmark parameters, validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    /// Tree depth D (0 = single leaf)
    pub depth: u32,

    /// Value of every node, also its delay in ms
    pub value: i32,

    /// Task-pool parameters
    pub pool: PoolConfig,

    /// Thread-spawn budget
    pub policy: SpawnPolicy,
}

impl BenchConfig {
    /// Validate depth and value; pool and thread limit take their defaults
    pub fn new(depth: i64, value: i32) -> Result<Self, TreeSumError> {
        if depth < 0 {
            return Err(TreeSumError::InvalidDepth(depth));
        }
        if depth > i64::from(MAX_SAFE_DEPTH) {
            return Err(TreeSumError::DepthTooLarge {
                depth,
                max: MAX_SAFE_DEPTH,
            });
        }

        Ok(Self {
            depth: depth as u32,
            value,
            pool: PoolConfig::default(),
            policy: SpawnPolicy::default(),
        })
    }

    /// Set the worker pool size W (must be non-zero)
    pub fn with_workers(mut self, workers: usize) -> Result<Self, TreeSumError> {
        if workers == 0 {
            return Err(TreeSumError::InvalidWorkers(workers));
        }
        self.pool = PoolConfig { workers };
        Ok(self)
    }

    /// Set the thread-spawn limit L (must be non-zero)
    pub fn with_thread_limit(mut self, thread_limit: usize) -> Result<Self, TreeSumError> {
        if thread_limit == 0 {
            return Err(TreeSumError::InvalidThreadLimit(thread_limit));
        }
        self.policy = SpawnPolicy::new(thread_limit);
        Ok(self)
    }

    /// Ground-truth sum for this configuration
    pub fn expected_sum(&self) -> i32 {
        expected_sum(self.depth, self.value)
    }
}

/// Outcome of one reducer run
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    /// Reducer name
    pub name: &'static str,

    /// Wall-clock time of the reduction (monotonic clock)
    pub elapsed_ms: f64,

    /// Sum returned
    pub sum: i32,
}

impl fmt::Display for StrategyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} completed in {:.3} ms\nSum: {}", self.name, self.elapsed_ms, self.sum)
    }
}

/// Timings and sums of a full benchmark run
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// Configuration that produced this report
    pub config: BenchConfig,

    /// Time spent building the tree
    pub build_ms: f64,

    /// One entry per reducer, in run order
    pub results: Vec<StrategyResult>,

    /// Time spent destroying the tree
    pub destroy_ms: f64,
}

impl BenchReport {
    /// Check every reducer returned the expected sum
    pub fn all_agree(&self) -> bool {
        let expected = self.config.expected_sum();
        self.results.iter().all(|result| result.sum == expected)
    }

    /// Look up a reducer's result by name
    pub fn result(&self, name: &str) -> Option<&StrategyResult> {
        self.results.iter().find(|result| result.name == name)
    }
}

/// Errors surfaced before any tree is built
#[derive(Error, Debug)]
pub enum TreeSumError {
    /// Negative depth
    #[error("Invalid tree depth {0}: depth must be non-negative")]
    InvalidDepth(i64),

    /// Depth whose node count is too large to allocate safely
    #[error("Tree depth {depth} exceeds safe maximum {max}")]
    DepthTooLarge {
        /// Requested depth
        depth: i64,
        /// Largest accepted depth
        max: u32,
    },

    /// Empty worker pool
    #[error("Invalid worker count {0}: need at least one worker")]
    InvalidWorkers(usize),

    /// Zero thread limit
    #[error("Invalid thread limit {0}: must be at least 1")]
    InvalidThreadLimit(usize),

    /// Unparsable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Drives build → reduce (each strategy) → destroy and times every phase
pub struct Benchmark {
    config: BenchConfig,
    reducers: Vec<Box<dyn Reducer>>,
    workload: Box<dyn Workload>,
}

impl Benchmark {
    /// All three strategies with the sleeping compute step
    pub fn new(config: BenchConfig) -> Self {
        Self::with_strategies(config, &Strategy::ALL)
    }

    /// Only the given strategies, in the given order
    pub fn with_strategies(config: BenchConfig, strategies: &[Strategy]) -> Self {
        let reducers = strategies
            .iter()
            .map(|strategy| strategy.reducer(config.pool, config.policy))
            .collect();

        Self {
            config,
            reducers,
            workload: Box::new(SleepWorkload),
        }
    }

    /// Replace the compute step
    pub fn with_workload(mut self, workload: impl Workload + 'static) -> Self {
        self.workload = Box::new(workload);
        self
    }

    /// Names of the reducers that will run
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.reducers.iter().map(|reducer| reducer.name()).collect()
    }

    /// Run the whole pipeline once
    pub fn run(&self) -> BenchReport {
        let BenchConfig { depth, value, .. } = self.config;

        let start = Instant::now();
        let root = build_tree(depth, value);
        let build_ms = elapsed_ms(start);
        debug!(depth, value, nodes = node_count(depth), build_ms, "tree built");

        let results = self
            .reducers
            .iter()
            .map(|reducer| {
                let start = Instant::now();
                let sum = reducer.reduce(Some(&*root), self.workload.as_ref());
                let result = StrategyResult {
                    name: reducer.name(),
                    elapsed_ms: elapsed_ms(start),
                    sum,
                };
                info!(strategy = result.name, elapsed_ms = result.elapsed_ms, sum, "reduction finished");
                result
            })
            .collect();

        let start = Instant::now();
        destroy_tree(Some(root));
        let destroy_ms = elapsed_ms(start);
        debug!(destroy_ms, "tree destroyed");

        BenchReport {
            config: self.config,
            build_ms,
            results,
            destroy_ms,
        }
    }
}

impl fmt::Debug for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Benchmark")
            .field("config", &self.config)
            .field("strategies", &self.strategy_names())
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
