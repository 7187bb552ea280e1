// src/dag/mod.rs

//! Incremental dependency graph and scheduling.
//!
//! - [`work`] defines the [`Work`] trait the graph schedules.
//! - [`node`] holds node handles, states and edges.
//! - [`counts`] provides the live/dead aggregate [`NodeCounts`].
//! - [`queue`] is the intrusive FIFO ready queue.
//! - [`graph`] is the [`WorkGraph`] engine: construction, liveness,
//!   invalidation and the run loop.
//! - [`task_graph`] layers task names and path matchers on top of a
//!   `WorkGraph` and builds one from configuration.

pub mod counts;
pub mod graph;
pub mod node;
pub(crate) mod queue;
pub mod task_graph;
pub mod work;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

pub use counts::NodeCounts;
pub use graph::WorkGraph;
pub use node::{Edge, NodeId, NodeState};
pub use task_graph::TaskGraph;
pub use work::Work;
