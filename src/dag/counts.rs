// src/dag/counts.rs

//! Aggregate per-state node counts.

use crate::dag::node::NodeState;

/// Number of nodes per state in one liveness partition, plus the summed wait
/// count of those nodes.
///
/// The graph keeps one of these for live nodes and one for dead nodes and
/// updates them on every transition, so reading them is O(1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCounts {
    pub waiting: usize,
    pub pending: usize,
    pub running: usize,
    pub success: usize,
    pub error: usize,
    pub wait_count: usize,
}

impl NodeCounts {
    /// Number of nodes in the given state.
    pub fn of(&self, state: NodeState) -> usize {
        match state {
            NodeState::Waiting => self.waiting,
            NodeState::Pending => self.pending,
            NodeState::Running => self.running,
            NodeState::Success => self.success,
            NodeState::Error => self.error,
        }
    }

    /// Total number of nodes in this partition.
    pub fn total(&self) -> usize {
        self.waiting + self.pending + self.running + self.success + self.error
    }

    pub(crate) fn count(&mut self, state: NodeState, wait_count: usize) {
        *self.slot(state) += 1;
        self.wait_count += wait_count;
    }

    pub(crate) fn uncount(&mut self, state: NodeState, wait_count: usize) {
        let slot = self.slot(state);
        *slot = slot
            .checked_sub(1)
            .unwrap_or_else(|| panic!("node count underflow for state {state}"));
        self.wait_count = self
            .wait_count
            .checked_sub(wait_count)
            .unwrap_or_else(|| panic!("aggregate wait count underflow"));
    }

    pub(crate) fn add_wait(&mut self, delta: isize) {
        self.wait_count = self
            .wait_count
            .checked_add_signed(delta)
            .unwrap_or_else(|| panic!("aggregate wait count underflow"));
    }

    fn slot(&mut self, state: NodeState) -> &mut usize {
        match state {
            NodeState::Waiting => &mut self.waiting,
            NodeState::Pending => &mut self.pending,
            NodeState::Running => &mut self.running,
            NodeState::Success => &mut self.success,
            NodeState::Error => &mut self.error,
        }
    }
}
