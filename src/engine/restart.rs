// src/engine/restart.rs

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, error, info};

use crate::exec::blocking::block_on;
use crate::watch::FileObserver;

/// Keeps one child process running and restarts it after its executable
/// changes (`crank stayfresh`).
///
/// The child inherits this process's stdio. Only notifications for the
/// executable itself are accepted, so the parent directory can be watched.
#[derive(Debug)]
pub struct Restarter {
    executable: PathBuf,
    args: Vec<String>,
    child: Option<Child>,
    restarts: u64,
}

impl Restarter {
    pub fn new(executable: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
            child: None,
            restarts: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    fn printable(&self) -> String {
        std::iter::once(self.executable.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn start(&mut self) {
        info!("stayfresh run: {}", self.printable());
        let spawned = Command::new(&self.executable)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn();

        match spawned {
            Ok(child) => self.child = Some(child),
            Err(err) => {
                error!("failed to start {}: {err}", self.printable());
                self.child = None;
            }
        }
    }

    fn stop(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Err(err) = child.start_kill() {
            // Already exited.
            debug!(error = %err, "kill failed");
        }
        match block_on(child.wait()) {
            Ok(Ok(status)) => debug!(%status, "child exited"),
            Ok(Err(err)) => error!("waiting for child: {err}"),
            Err(err) => error!("waiting for child: {err:#}"),
        }
        info!("stayfresh kill: {}", self.printable());
    }
}

impl FileObserver for Restarter {
    fn begin(&mut self) {
        self.start();
    }

    fn file_changed(&mut self, path: &Path) -> bool {
        same_file_name(path, &self.executable)
    }

    fn idle(&mut self) {
        self.stop();
        self.restarts += 1;
        self.start();
    }
}

impl Drop for Restarter {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
    }
}

fn same_file_name(path: &Path, executable: &Path) -> bool {
    if path == executable {
        return true;
    }
    match (path.canonicalize(), executable.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        // Replaced by rename or deleted: compare by name within the directory.
        _ => path.file_name().is_some() && path.file_name() == executable.file_name(),
    }
}
