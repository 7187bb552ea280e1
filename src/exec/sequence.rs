// src/exec/sequence.rs

use std::time::Instant;

use crate::exec::log::TaskLog;
use crate::exec::task::TaskDecl;

/// Runs named steps in order, stopping at the first failure.
///
/// Each step gets its own nested log (`task/step`).
#[derive(Default)]
pub struct SequenceTask {
    steps: Vec<(String, Box<dyn TaskDecl>)>,
}

impl SequenceTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, name: impl Into<String>, task: impl TaskDecl + 'static) -> Self {
        self.steps.push((name.into(), Box::new(task)));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, task: Box<dyn TaskDecl>) {
        self.steps.push((name.into(), task));
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl TaskDecl for SequenceTask {
    fn run(&self, log: &dyn TaskLog) -> bool {
        for (name, step) in &self.steps {
            let sub = log.subtask(name);
            let started = Instant::now();
            sub.begin();
            let ok = step.run(sub.as_ref());
            sub.end(started.elapsed(), ok);
            if !ok {
                return false;
            }
        }
        true
    }

    fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|(name, step)| format!("{name}: {}", step.describe()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
