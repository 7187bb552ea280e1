// src/engine/mod.rs

//! Driving loop.
//!
//! [`Runtime`] owns the event channel and the quiet-period timer and drives a
//! [`FileObserver`](crate::watch::FileObserver). The observers that do real
//! work live here too:
//! - [`IncrementalRunner`] maps changed paths to task invalidations and runs
//!   the task graph;
//! - [`Restarter`] keeps one child process alive across changes
//!   (`crank stayfresh`).

use std::path::PathBuf;
use std::time::Duration;

pub mod debounce;
pub mod restart;
pub mod runner;
pub mod runtime;

pub use debounce::Debouncer;
pub use restart::Restarter;
pub use runner::IncrementalRunner;
pub use runtime::Runtime;

/// Events flowing into the runtime from the watcher and signal handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A path was created, modified or removed.
    FileChanged(PathBuf),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Quiet period after the last accepted change before `idle` fires.
    pub quiet_period: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(1000),
        }
    }
}
