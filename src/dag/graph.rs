// src/dag/graph.rs

use std::fmt;

use anyhow::{bail, Result};
use tracing::{debug, trace};

use crate::dag::counts::NodeCounts;
use crate::dag::node::{Edge, Node, NodeId, NodeState};
use crate::dag::queue::ReadyQueue;
use crate::dag::work::Work;

/// Incremental dependency graph of [`Work`] units.
///
/// The graph owns every node and keeps, at all times:
/// - each node's `wait_count` equal to its number of unsatisfied incoming
///   edges,
/// - exactly the PENDING nodes in the FIFO ready queue,
/// - live/dead aggregate [`NodeCounts`] in sync with the nodes.
///
/// Those invariants are maintained incrementally by completion
/// ([`run`](Self::run), [`mark_success`](Self::mark_success),
/// [`mark_error`](Self::mark_error)) and by [`invalidate`](Self::invalidate).
/// A broken invariant is a bug and panics.
///
/// The graph is single-threaded: callers must not mutate it while
/// [`run`](Self::run) is executing work.
#[derive(Default)]
pub struct WorkGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ready: ReadyQueue,
    live_nodes: NodeCounts,
    dead_nodes: NodeCounts,
}

impl fmt::Debug for WorkGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("ready", &self.ready.len())
            .field("live_nodes", &self.live_nodes)
            .field("dead_nodes", &self.dead_nodes)
            .finish()
    }
}

/// A node whose outgoing edges are being walked during invalidation.
struct InvalidateFrame {
    node: NodeId,
    next_edge: usize,
}

impl WorkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Construction
    // ---------------------------------------------------------------------

    /// Add a node for `work`. It starts WAITING and dead.
    pub fn create_node(&mut self, work: impl Work + 'static) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Box::new(work)));
        self.count_node(id);
        trace!(node = %id, "created node");
        id
    }

    /// Add the dependency `src -> dst` (`dst` depends on `src`).
    ///
    /// May be called at any point in either node's lifecycle: an edge that is
    /// unsatisfied under `src`'s current state is accounted for exactly as if
    /// `src` had just left a satisfying state.
    pub fn create_edge(&mut self, src: NodeId, dst: NodeId, order_only: bool) {
        let edge = Edge {
            src,
            dst,
            order_only,
        };
        let index = self.edges.len();
        self.edges.push(edge);
        self.nodes[src.0].dsts.push(index);
        self.nodes[dst.0].srcs.push(index);

        trace!(%src, %dst, order_only, "created edge");

        if !self.edge_satisfied(&edge) {
            self.adjust_wait_count(dst, 1);
        }
    }

    /// Declare `id` a root of interest.
    ///
    /// The node and everything it transitively depends on become live and
    /// therefore eligible for scheduling. Liveness never goes away.
    pub fn mark_live(&mut self, id: NodeId) {
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if self.nodes[current.0].live {
                continue;
            }

            self.set_live(current);
            self.adjust_pending(current);
            debug!(node = %current, state = %self.nodes[current.0].state, "node is live");

            // Reverse so the first source is visited first, matching a
            // depth-first walk in edge order.
            for &edge in self.nodes[current.0].srcs.iter().rev() {
                stack.push(self.edges[edge].src);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Invalidation
    // ---------------------------------------------------------------------

    /// Reset a completed node to WAITING, re-establishing its outgoing
    /// dependencies and invalidating hard dependents.
    ///
    /// Does nothing unless the node is SUCCESS or ERROR.
    ///
    /// For each outgoing edge, in order: if the edge was satisfied by the
    /// node's old state the destination waits on it again, and if the edge is
    /// not order-only the destination is invalidated too (depth first). Only
    /// after all of that does the node's work hear about the invalidation and
    /// the node itself go back to WAITING.
    pub fn invalidate(&mut self, id: NodeId) {
        if !self.nodes[id.0].state.is_complete() {
            trace!(node = %id, state = %self.nodes[id.0].state, "invalidate ignored");
            return;
        }

        let mut stack = vec![InvalidateFrame {
            node: id,
            next_edge: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;

            if let Some(&edge_index) = self.nodes[node.0].dsts.get(frame.next_edge) {
                frame.next_edge += 1;

                let edge = self.edges[edge_index];
                if self.edge_satisfied(&edge) {
                    self.adjust_wait_count(edge.dst, 1);
                }
                if !edge.order_only && self.nodes[edge.dst.0].state.is_complete() {
                    stack.push(InvalidateFrame {
                        node: edge.dst,
                        next_edge: 0,
                    });
                }
                continue;
            }

            stack.pop();
            debug!(node = %node, was = %self.nodes[node.0].state, "invalidating node");
            self.nodes[node.0].work.invalidated();
            self.set_state(node, NodeState::Waiting);
            self.adjust_pending(node);
        }
    }

    // ---------------------------------------------------------------------
    // Execution
    // ---------------------------------------------------------------------

    /// Run ready nodes one at a time, in queue order, until none are ready.
    pub fn run(&mut self) {
        while let Some(current) = self.ready.front() {
            self.begin_running(current);
            debug!(node = %current, "running node");

            let ok = self.nodes[current.0].work.run();
            let state = if ok {
                NodeState::Success
            } else {
                NodeState::Error
            };

            debug!(node = %current, %state, "node finished");
            self.mark_complete(current, state);
        }
    }

    /// Manually complete a PENDING or RUNNING node as successful, without
    /// running its work.
    pub fn mark_success(&mut self, id: NodeId) {
        self.mark_complete(id, NodeState::Success);
    }

    /// Manually complete a PENDING or RUNNING node as failed, without running
    /// its work.
    pub fn mark_error(&mut self, id: NodeId) {
        self.mark_complete(id, NodeState::Error);
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node handles in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn state(&self, id: NodeId) -> NodeState {
        self.nodes[id.0].state
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes[id.0].live
    }

    pub fn wait_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].wait_count
    }

    /// Incoming edges of `id`, in creation order.
    pub fn srcs(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.nodes[id.0].srcs.iter().map(|&e| self.edges[e])
    }

    /// Outgoing edges of `id`, in creation order.
    pub fn dsts(&self, id: NodeId) -> impl Iterator<Item = Edge> + '_ {
        self.nodes[id.0].dsts.iter().map(|&e| self.edges[e])
    }

    /// Whether any node is waiting in the ready queue.
    pub fn has_ready(&self) -> bool {
        self.ready.front().is_some()
    }

    /// Ready queue contents, head first.
    pub fn ready_nodes(&self) -> Vec<NodeId> {
        self.ready.iter(&self.nodes).collect()
    }

    /// Ready queue contents, tail first.
    pub fn ready_nodes_rev(&self) -> Vec<NodeId> {
        self.ready.iter_rev(&self.nodes).collect()
    }

    pub fn live_counts(&self) -> NodeCounts {
        self.live_nodes
    }

    pub fn dead_counts(&self) -> NodeCounts {
        self.dead_nodes
    }

    /// Recompute every bookkeeping invariant from scratch and report the
    /// first one that does not hold.
    ///
    /// This is a full scan meant for tests and diagnostics; the graph itself
    /// never relies on it.
    pub fn check_invariants(&self) -> Result<()> {
        let mut live = NodeCounts::default();
        let mut dead = NodeCounts::default();

        for id in self.node_ids() {
            let node = &self.nodes[id.0];

            let unsatisfied = self.srcs(id).filter(|e| !self.edge_satisfied(e)).count();
            if unsatisfied != node.wait_count {
                bail!(
                    "{id}: wait_count is {} but {unsatisfied} incoming edges are unsatisfied",
                    node.wait_count
                );
            }

            if node.state == NodeState::Pending && (!node.live || node.wait_count != 0) {
                bail!("{id}: pending while live={} wait_count={}", node.live, node.wait_count);
            }
            if node.state == NodeState::Waiting && node.live && node.wait_count == 0 {
                bail!("{id}: live with no outstanding dependencies but still waiting");
            }
            if (node.state == NodeState::Pending) != node.link.is_some() {
                bail!("{id}: state {} disagrees with queue link {:?}", node.state, node.link);
            }

            let bucket = if node.live { &mut live } else { &mut dead };
            bucket.count(node.state, node.wait_count);
        }

        if live != self.live_nodes {
            bail!("live counts {:?} do not match nodes {:?}", self.live_nodes, live);
        }
        if dead != self.dead_nodes {
            bail!("dead counts {:?} do not match nodes {:?}", self.dead_nodes, dead);
        }

        let forward = self.ready_nodes();
        let mut backward = self.ready_nodes_rev();
        backward.reverse();
        if forward != backward {
            bail!("ready queue is asymmetric: {forward:?} vs {backward:?}");
        }
        if forward.len() != self.ready.len() {
            bail!("ready queue holds {} nodes but records {}", forward.len(), self.ready.len());
        }
        if forward.len() != live.pending + dead.pending {
            bail!("ready queue holds {} nodes but {} are pending", forward.len(), live.pending + dead.pending);
        }
        if let Some(back) = self.ready.back() {
            if forward.last() != Some(&back) {
                bail!("ready queue tail {back} is not the last node reached from the head");
            }
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn edge_satisfied(&self, edge: &Edge) -> bool {
        edge.is_satisfied_by(self.nodes[edge.src.0].state)
    }

    fn counts_for(&mut self, live: bool) -> &mut NodeCounts {
        if live {
            &mut self.live_nodes
        } else {
            &mut self.dead_nodes
        }
    }

    fn count_node(&mut self, id: NodeId) {
        let (state, live, wait) = self.snapshot(id);
        self.counts_for(live).count(state, wait);
    }

    fn uncount_node(&mut self, id: NodeId) {
        let (state, live, wait) = self.snapshot(id);
        self.counts_for(live).uncount(state, wait);
    }

    fn snapshot(&self, id: NodeId) -> (NodeState, bool, usize) {
        let node = &self.nodes[id.0];
        (node.state, node.live, node.wait_count)
    }

    fn set_state(&mut self, id: NodeId, state: NodeState) {
        if self.nodes[id.0].state != state {
            self.uncount_node(id);
            self.nodes[id.0].state = state;
            self.count_node(id);
        }
    }

    fn set_live(&mut self, id: NodeId) {
        if !self.nodes[id.0].live {
            self.uncount_node(id);
            self.nodes[id.0].live = true;
            self.count_node(id);
        }
    }

    /// Re-evaluate queue membership after a wait count, state or liveness
    /// change.
    fn adjust_pending(&mut self, id: NodeId) {
        let (state, live, wait_count) = self.snapshot(id);
        match state {
            NodeState::Waiting if live && wait_count == 0 => {
                self.set_state(id, NodeState::Pending);
                self.ready.push_back(&mut self.nodes, id);
                trace!(node = %id, "enqueued");
            }
            NodeState::Pending if wait_count != 0 || !live => {
                self.ready.remove(&mut self.nodes, id);
                self.set_state(id, NodeState::Waiting);
                trace!(node = %id, "dequeued");
            }
            _ => {}
        }
    }

    /// The single place wait counts change.
    fn adjust_wait_count(&mut self, id: NodeId, delta: isize) {
        let live = self.nodes[id.0].live;
        self.counts_for(live).add_wait(delta);

        let node = &mut self.nodes[id.0];
        node.wait_count = node
            .wait_count
            .checked_add_signed(delta)
            .unwrap_or_else(|| panic!("{id}: wait count underflow"));

        self.adjust_pending(id);
    }

    fn begin_running(&mut self, id: NodeId) {
        self.ready.remove(&mut self.nodes, id);
        self.set_state(id, NodeState::Running);
    }

    fn mark_complete(&mut self, id: NodeId, state: NodeState) {
        if self.nodes[id.0].state == NodeState::Pending {
            self.begin_running(id);
        }

        let current = self.nodes[id.0].state;
        if current != NodeState::Running {
            panic!("{id}: cannot complete a node in state {current}");
        }

        self.set_state(id, state);

        for i in 0..self.nodes[id.0].dsts.len() {
            let edge = self.edges[self.nodes[id.0].dsts[i]];
            if self.edge_satisfied(&edge) {
                self.adjust_wait_count(edge.dst, -1);
            }
        }
    }
}
