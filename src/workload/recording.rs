//! Instrumented workload for checking reducer ordering
//!
//! Each compute call is stamped on entry and exit from one global logical
//! clock, keyed by node address. Lets tests check that a node's compute
//! starts only after both children finished, and that no node runs twice.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::Workload;
use crate::tree::Node;

/// Logical-clock interval of one compute call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeSpan {
    /// Tick taken before the inner workload ran
    pub start: u64,
    /// Tick taken after the inner workload returned
    pub end: u64,
}

/// Wraps another workload and records a [`ComputeSpan`] per node
#[derive(Debug)]
pub struct RecordingWorkload<W> {
    inner: W,
    clock: AtomicU64,
    spans: Mutex<HashMap<usize, ComputeSpan>>,
    duplicates: AtomicU64,
}

impl<W: Workload> RecordingWorkload<W> {
    /// Record around `inner`
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            clock: AtomicU64::new(0),
            spans: Mutex::new(HashMap::new()),
            duplicates: AtomicU64::new(0),
        }
    }

    /// Span recorded for `node`, if it was computed
    pub fn span(&self, node: &Node) -> Option<ComputeSpan> {
        self.lock().get(&Self::key(node)).copied()
    }

    /// Number of distinct nodes computed
    pub fn computed(&self) -> usize {
        self.lock().len()
    }

    /// Number of compute calls for a node that had already been computed
    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::SeqCst)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }

    fn key(node: &Node) -> usize {
        node as *const Node as usize
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<usize, ComputeSpan>> {
        // A poisoned map still holds valid spans
        self.spans.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Workload> Workload for RecordingWorkload<W> {
    fn compute(&self, node: &Node) {
        let start = self.tick();
        self.inner.compute(node);
        let end = self.tick();

        if self.lock().insert(Self::key(node), ComputeSpan { start, end }).is_some() {
            self.duplicates.fetch_add(1, Ordering::SeqCst);
        }
    }
}
