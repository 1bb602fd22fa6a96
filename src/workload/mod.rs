//! Compute step: simulated node-local work
//!
//! Every reducer calls [`Workload::compute`] exactly once per visited node,
//! after both child partial sums are known. The step has no result; it only
//! costs time.

mod recording;

pub use recording::{ComputeSpan, RecordingWorkload};

use std::thread;
use std::time::Duration;

use crate::tree::Node;

/// Node-local work performed by a reducer
///
/// Implementations are shared by every worker thread of a reduction, hence
/// `Send + Sync`.
pub trait Workload: Send + Sync {
    /// Perform the work for `node`; the cost is driven by `node.value`
    fn compute(&self, node: &Node);
}

/// Block the calling thread for `value` milliseconds
///
/// Non-positive values cost nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepWorkload;

impl SleepWorkload {
    /// Delay applied for a node of `value`
    pub fn delay(value: i32) -> Duration {
        Duration::from_millis(u64::try_from(value).unwrap_or(0))
    }
}

impl Workload for SleepWorkload {
    fn compute(&self, node: &Node) {
        let delay = Self::delay(node.value);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// No work at all; isolates scheduling overhead
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWorkload;

impl Workload for NoopWorkload {
    #[inline]
    fn compute(&self, _node: &Node) {}
}
