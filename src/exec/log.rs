// src/exec/log.rs

//! Per-task logging collaborators.
//!
//! A [`TaskLog`] receives the lifecycle of one task invocation (begin/end),
//! free-form info and error lines, and the captured stdout/stderr of any
//! process the task spawns. Logs nest: [`TaskLog::subtask`] derives a log for
//! a named step, and [`MultiLog`] fans every call out to several sinks.
//!
//! The root log is created once per process (see `crate::run`) and handed
//! down explicitly; nothing here is global.

use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

/// Which process stream a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

pub trait TaskLog: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, message: &str);

    /// Capture sink for one line of process output (without the newline).
    fn output(&self, stream: OutputStream, line: &str);

    /// Log for a named step nested under this one.
    fn subtask(&self, name: &str) -> Arc<dyn TaskLog>;

    fn begin(&self);

    fn end(&self, elapsed: Duration, success: bool);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl TaskLog for NullLog {
    fn info(&self, _message: &str) {}

    fn error(&self, _message: &str) {}

    fn output(&self, _stream: OutputStream, _line: &str) {}

    fn subtask(&self, _name: &str) -> Arc<dyn TaskLog> {
        Arc::new(NullLog)
    }

    fn begin(&self) {}

    fn end(&self, _elapsed: Duration, _success: bool) {}
}

/// Console log.
///
/// Task output goes straight to this process's stdout/stderr, untouched, so
/// tool output stays readable. Lifecycle, info and error lines go through
/// `tracing` (and therefore to stderr) tagged with the task path, e.g.
/// `check/vet`.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    path: Vec<String>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slash-joined task path.
    pub fn path(&self) -> String {
        self.path.join("/")
    }
}

impl TaskLog for ConsoleLog {
    fn info(&self, message: &str) {
        info!(task = %self.path(), "{message}");
    }

    fn error(&self, message: &str) {
        error!(task = %self.path(), "{message}");
    }

    fn output(&self, stream: OutputStream, line: &str) {
        // Best effort: a closed terminal must not fail the task.
        let _ = match stream {
            OutputStream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            OutputStream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
    }

    fn subtask(&self, name: &str) -> Arc<dyn TaskLog> {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Arc::new(ConsoleLog { path })
    }

    fn begin(&self) {
        info!(task = %self.path(), ">>> {}", self.path());
    }

    fn end(&self, elapsed: Duration, success: bool) {
        if success {
            info!(task = %self.path(), ?elapsed, "<<< {}", self.path());
        } else {
            error!(task = %self.path(), ?elapsed, "<<< {} failed", self.path());
        }
    }
}

/// Forwards every call to each child log, in order.
#[derive(Clone, Default)]
pub struct MultiLog {
    children: Vec<Arc<dyn TaskLog>>,
}

impl fmt::Debug for MultiLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiLog")
            .field("children", &self.children.len())
            .finish()
    }
}

impl MultiLog {
    pub fn new(children: Vec<Arc<dyn TaskLog>>) -> Self {
        Self { children }
    }
}

impl TaskLog for MultiLog {
    fn info(&self, message: &str) {
        for child in &self.children {
            child.info(message);
        }
    }

    fn error(&self, message: &str) {
        for child in &self.children {
            child.error(message);
        }
    }

    fn output(&self, stream: OutputStream, line: &str) {
        for child in &self.children {
            child.output(stream, line);
        }
    }

    fn subtask(&self, name: &str) -> Arc<dyn TaskLog> {
        let children = self.children.iter().map(|c| c.subtask(name)).collect();
        Arc::new(MultiLog { children })
    }

    fn begin(&self) {
        for child in &self.children {
            child.begin();
        }
    }

    fn end(&self, elapsed: Duration, success: bool) {
        for child in &self.children {
            child.end(elapsed, success);
        }
    }
}
