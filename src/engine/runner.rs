// src/engine/runner.rs

use std::path::Path;

use tracing::{debug, info};

use crate::dag::{NodeCounts, TaskGraph};
use crate::watch::observer::to_slash;
use crate::watch::{FileObserver, PathMatcher};

/// Observer that keeps a [`TaskGraph`] up to date.
///
/// Expects root-relative paths (wrap it in a `RelativeObserver`). A change
/// is accepted when it invalidates at least one task.
#[derive(Debug)]
pub struct IncrementalRunner {
    graph: TaskGraph,
    ignore: PathMatcher,
    last_counts: NodeCounts,
}

impl IncrementalRunner {
    pub fn new(graph: TaskGraph, ignore: PathMatcher) -> Self {
        Self {
            graph,
            ignore,
            last_counts: NodeCounts::default(),
        }
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Live counts after the most recent run.
    pub fn last_counts(&self) -> NodeCounts {
        self.last_counts
    }

    fn run_graph(&mut self) {
        self.last_counts = self.graph.run();
    }
}

impl FileObserver for IncrementalRunner {
    fn begin(&mut self) {
        info!("initial run");
        self.run_graph();
    }

    fn file_changed(&mut self, path: &Path) -> bool {
        let rel = to_slash(path);
        if self.ignore.matches(&rel) {
            debug!(path = %rel, "ignored path");
            return false;
        }

        let hits = self.graph.invalidate_matching(&rel);
        if hits.is_empty() {
            debug!(path = %rel, "no task watches this path");
            return false;
        }

        info!(path = %rel, tasks = ?hits, "change invalidated tasks");
        true
    }

    fn idle(&mut self) {
        self.run_graph();
    }
}
