// src/exec/task.rs

//! Task declarations and their adapter onto the work graph.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::dag::{TaskName, Work};
use crate::exec::log::TaskLog;

/// Something a task does when it runs: spawn a command, run several steps...
///
/// Implementations report failure by returning `false`, never by panicking.
pub trait TaskDecl {
    fn run(&self, log: &dyn TaskLog) -> bool;

    /// Short human-readable description.
    fn describe(&self) -> String;
}

/// [`Work`] implementation binding a task declaration to its log.
pub struct TaskWork {
    name: TaskName,
    task: Box<dyn TaskDecl>,
    log: Arc<dyn TaskLog>,
    runs: u64,
}

impl TaskWork {
    pub fn new(name: impl Into<TaskName>, task: Box<dyn TaskDecl>, log: Arc<dyn TaskLog>) -> Self {
        Self {
            name: name.into(),
            task,
            log,
            runs: 0,
        }
    }

    pub fn describe(&self) -> String {
        self.task.describe()
    }
}

impl Work for TaskWork {
    fn invalidated(&mut self) {
        debug!(task = %self.name, runs = self.runs, "task invalidated");
    }

    fn run(&mut self) -> bool {
        self.runs += 1;
        let started = Instant::now();
        self.log.begin();
        let ok = self.task.run(self.log.as_ref());
        self.log.end(started.elapsed(), ok);
        ok
    }
}
