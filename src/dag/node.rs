// src/dag/node.rs

//! Node and edge data structures for the work graph.

use std::fmt;

use crate::dag::queue::QueueLink;
use crate::dag::work::Work;

/// Handle to a node owned by a [`WorkGraph`](crate::dag::WorkGraph).
///
/// Handles are dense indices into the graph's node arena and stay valid for
/// the lifetime of the graph (nodes are never removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Not runnable: dead, or waiting on unsatisfied dependencies.
    Waiting,
    /// Runnable; sitting in the ready queue.
    Pending,
    /// Currently executing its work.
    Running,
    /// Work ran and reported success.
    Success,
    /// Work ran and reported failure.
    Error,
}

impl NodeState {
    /// `true` for the two terminal states a node can be invalidated from.
    pub fn is_complete(&self) -> bool {
        matches!(self, NodeState::Success | NodeState::Error)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Waiting => "waiting",
            NodeState::Pending => "pending",
            NodeState::Running => "running",
            NodeState::Success => "success",
            NodeState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Directed dependency `src -> dst`: `dst` depends on `src`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    /// Order-only edges are also satisfied by a failed source.
    pub order_only: bool,
}

impl Edge {
    /// Whether this edge is satisfied when its source is in `src_state`.
    ///
    /// SUCCESS always satisfies; ERROR satisfies only order-only edges.
    pub fn is_satisfied_by(&self, src_state: NodeState) -> bool {
        src_state == NodeState::Success || (src_state == NodeState::Error && self.order_only)
    }
}

/// One scheduled unit of work plus its bookkeeping.
pub(crate) struct Node {
    pub(crate) work: Box<dyn Work>,
    pub(crate) state: NodeState,
    pub(crate) live: bool,
    pub(crate) wait_count: usize,
    /// Incoming edges, as indices into the graph's edge table.
    pub(crate) srcs: Vec<usize>,
    /// Outgoing edges, as indices into the graph's edge table.
    pub(crate) dsts: Vec<usize>,
    /// Present iff the node is in the ready queue.
    pub(crate) link: Option<QueueLink>,
}

impl Node {
    pub(crate) fn new(work: Box<dyn Work>) -> Self {
        Self {
            work,
            state: NodeState::Waiting,
            live: false,
            wait_count: 0,
            srcs: Vec::new(),
            dsts: Vec::new(),
            link: None,
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("state", &self.state)
            .field("live", &self.live)
            .field("wait_count", &self.wait_count)
            .field("srcs", &self.srcs)
            .field("dsts", &self.dsts)
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}
