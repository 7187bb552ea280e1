// src/dag/task_graph.rs

//! Named tasks on top of a [`WorkGraph`].

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::model::ConfigFile;
use crate::dag::{NodeCounts, NodeId, NodeState, TaskName, Work, WorkGraph};
use crate::errors::{CrankError, Result};
use crate::exec::command::CommandTask;
use crate::exec::log::TaskLog;
use crate::exec::sequence::SequenceTask;
use crate::exec::task::{TaskDecl, TaskWork};
use crate::watch::patterns::{task_matcher, PathMatcher};

#[derive(Debug)]
struct TaskEntry {
    name: TaskName,
    node: NodeId,
    matcher: PathMatcher,
}

/// A [`WorkGraph`] whose nodes have unique task names and path matchers.
#[derive(Debug, Default)]
pub struct TaskGraph {
    graph: WorkGraph,
    /// Declaration order.
    tasks: Vec<TaskEntry>,
    by_name: HashMap<TaskName, usize>,
    by_node: HashMap<NodeId, usize>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for a validated config.
    ///
    /// Tasks are created in name order, each with a [`TaskWork`] logging
    /// under `log.subtask(name)`. `after` becomes normal edges, `order_after`
    /// order-only edges; the effective targets are marked live.
    pub fn from_config(cfg: &ConfigFile, log: Arc<dyn TaskLog>) -> Result<Self> {
        let mut graph = TaskGraph::new();

        for (name, task) in cfg.tasks() {
            let decl: Box<dyn TaskDecl> = match &task.cmd {
                Some(cmd) => Box::new(CommandTask::from_spec(cmd)),
                None => {
                    let mut seq = SequenceTask::new();
                    for (i, step) in task.steps.iter().enumerate() {
                        seq.push(format!("step{}", i + 1), Box::new(CommandTask::from_spec(step)));
                    }
                    Box::new(seq)
                }
            };
            let work = TaskWork::new(name.clone(), decl, log.subtask(name));
            graph.add_task(name.clone(), work, task_matcher(cfg, name)?)?;
        }

        for (name, task) in cfg.tasks() {
            for dep in &task.after {
                graph.add_dependency(name, dep, false)?;
            }
            for dep in &task.order_after {
                graph.add_dependency(name, dep, true)?;
            }
        }

        for target in cfg.effective_targets() {
            graph.mark_target(&target)?;
        }

        Ok(graph)
    }

    pub fn add_task(
        &mut self,
        name: impl Into<TaskName>,
        work: impl Work + 'static,
        matcher: PathMatcher,
    ) -> Result<NodeId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(CrankError::ConfigError(format!("duplicate task '{name}'")));
        }

        let node = self.graph.create_node(work);
        let idx = self.tasks.len();
        debug!(task = %name, %node, "added task");

        self.by_name.insert(name.clone(), idx);
        self.by_node.insert(node, idx);
        self.tasks.push(TaskEntry {
            name,
            node,
            matcher,
        });
        Ok(node)
    }

    /// `task` runs after `on`. With `order_only`, a failed `on` still lets
    /// `task` run.
    pub fn add_dependency(&mut self, task: &str, on: &str, order_only: bool) -> Result<()> {
        let dst = self.require(task)?;
        let src = self.require(on)?;
        self.graph.create_edge(src, dst, order_only);
        Ok(())
    }

    /// Keep `name` (and everything it depends on) up to date.
    pub fn mark_target(&mut self, name: &str) -> Result<()> {
        let node = self.require(name)?;
        self.graph.mark_live(node);
        Ok(())
    }

    pub fn node_of(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).map(|&i| self.tasks[i].node)
    }

    pub fn name_of(&self, node: NodeId) -> Option<&str> {
        self.by_node.get(&node).map(|&i| self.tasks[i].name.as_str())
    }

    /// Task names in declaration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.tasks.iter().map(|t| t.name.as_str())
    }

    pub fn state_of(&self, name: &str) -> Option<NodeState> {
        self.node_of(name).map(|n| self.graph.state(n))
    }

    /// Invalidate every task whose matcher accepts `rel_path` and return
    /// their names, in declaration order.
    pub fn invalidate_matching(&mut self, rel_path: &str) -> Vec<TaskName> {
        let hits: Vec<(TaskName, NodeId)> = self
            .tasks
            .iter()
            .filter(|t| t.matcher.matches(rel_path))
            .map(|t| (t.name.clone(), t.node))
            .collect();

        for (name, node) in &hits {
            debug!(task = %name, path = rel_path, "invalidating task");
            self.graph.invalidate(*node);
        }

        hits.into_iter().map(|(name, _)| name).collect()
    }

    /// Run until nothing is ready and return the live counts.
    pub fn run(&mut self) -> NodeCounts {
        if !self.graph.has_ready() {
            return self.graph.live_counts();
        }

        self.graph.run();
        let counts = self.graph.live_counts();
        if counts.error > 0 {
            warn!(
                succeeded = counts.success,
                failed = counts.error,
                waiting = counts.waiting,
                "run finished with failures: {}",
                self.failed_tasks().join(", ")
            );
        } else {
            info!(
                succeeded = counts.success,
                waiting = counts.waiting,
                "run finished"
            );
        }
        counts
    }

    /// Live tasks whose last run failed, in declaration order.
    pub fn failed_tasks(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|t| self.graph.is_live(t.node) && self.graph.state(t.node) == NodeState::Error)
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn graph(&self) -> &WorkGraph {
        &self.graph
    }

    fn require(&self, name: &str) -> Result<NodeId> {
        self.node_of(name)
            .ok_or_else(|| CrankError::TaskNotFound(name.to_string()))
    }
}
