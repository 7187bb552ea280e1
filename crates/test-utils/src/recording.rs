use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crank::exec::{OutputStream, TaskLog};
use crank::watch::FileObserver;

/// Task log that records every call as a line, e.g. `build/vet: begin`.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    path: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        let line = if self.path.is_empty() {
            entry
        } else {
            format!("{}: {}", self.path, entry)
        };
        self.lines.lock().unwrap().push(line);
    }
}

impl TaskLog for RecordingLog {
    fn info(&self, message: &str) {
        self.push(format!("info {message}"));
    }

    fn error(&self, message: &str) {
        self.push(format!("error {message}"));
    }

    fn output(&self, stream: OutputStream, line: &str) {
        self.push(format!("{stream} {line}"));
    }

    fn subtask(&self, name: &str) -> Arc<dyn TaskLog> {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.path, name)
        };
        Arc::new(RecordingLog {
            path,
            lines: Arc::clone(&self.lines),
        })
    }

    fn begin(&self) {
        self.push("begin".to_string());
    }

    fn end(&self, _elapsed: Duration, success: bool) {
        self.push(format!("end {}", if success { "ok" } else { "failed" }));
    }
}

/// Calls a [`RecordingObserver`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverCall {
    Begin,
    FileChanged(PathBuf),
    Idle,
}

/// Observer recording its calls. Accepts every change unless told otherwise.
#[derive(Debug, Clone)]
pub struct RecordingObserver {
    calls: Arc<Mutex<Vec<ObserverCall>>>,
    accept: bool,
}

impl Default for RecordingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            calls: Arc::default(),
            accept: true,
        }
    }

    /// An observer that rejects every change.
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<ObserverCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn idle_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == ObserverCall::Idle)
            .count()
    }

    pub fn changed_paths(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ObserverCall::FileChanged(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl FileObserver for RecordingObserver {
    fn begin(&mut self) {
        self.calls.lock().unwrap().push(ObserverCall::Begin);
    }

    fn file_changed(&mut self, path: &Path) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push(ObserverCall::FileChanged(path.to_path_buf()));
        self.accept
    }

    fn idle(&mut self) {
        self.calls.lock().unwrap().push(ObserverCall::Idle);
    }
}
