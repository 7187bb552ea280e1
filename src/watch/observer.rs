// src/watch/observer.rs

//! The driving-loop contract and its path-rewriting decorator.

use std::path::{Path, PathBuf};

use tracing::trace;

/// Receives file changes from the [`Runtime`](crate::engine::Runtime).
///
/// `file_changed` returns whether the change was accepted; only accepted
/// changes (re)arm the quiet-period timer, after which `idle` is called once.
pub trait FileObserver {
    /// Called once before the first event.
    fn begin(&mut self);

    fn file_changed(&mut self, path: &Path) -> bool;

    /// Called when the quiet period after an accepted change has passed.
    fn idle(&mut self);
}

impl<O: FileObserver + ?Sized> FileObserver for Box<O> {
    fn begin(&mut self) {
        (**self).begin();
    }

    fn file_changed(&mut self, path: &Path) -> bool {
        (**self).file_changed(path)
    }

    fn idle(&mut self) {
        (**self).idle();
    }
}

/// Hands `inner` paths relative to `root`, with forward slashes. Paths
/// outside `root` are dropped.
#[derive(Debug)]
pub struct RelativeObserver<O> {
    root: PathBuf,
    inner: O,
}

impl<O: FileObserver> RelativeObserver<O> {
    pub fn new(root: impl Into<PathBuf>, inner: O) -> Self {
        Self {
            root: root.into(),
            inner,
        }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

impl<O: FileObserver> FileObserver for RelativeObserver<O> {
    fn begin(&mut self) {
        self.inner.begin();
    }

    fn file_changed(&mut self, path: &Path) -> bool {
        match relative_str(&self.root, path) {
            Some(rel) if !rel.is_empty() => self.inner.file_changed(Path::new(&rel)),
            _ => {
                trace!(path = %path.display(), "ignoring path outside root");
                false
            }
        }
    }

    fn idle(&mut self) {
        self.inner.idle();
    }
}

/// `path` relative to `root` with forward slashes, or `None` when it is not
/// under `root`.
///
/// Relative inputs are taken as already relative. When the plain prefix
/// check fails both sides are canonicalized and compared again, which
/// catches symlinked prefixes such as macOS `/private/var`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if path.is_relative() {
        return Some(to_slash(path));
    }

    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root = root.canonicalize().ok()?;
    let path = path.canonicalize().ok()?;
    path.strip_prefix(&root).ok().map(to_slash)
}

pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
