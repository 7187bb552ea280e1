// src/watch/cache.rs

//! Content-hash filtering of change notifications (`[config].use_hash`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::watch::observer::FileObserver;

/// blake3 hash of a file's contents, or `None` when the file is gone or is
/// not a regular file.
pub fn compute_file_hash(path: &Path) -> Result<Option<blake3::Hash>> {
    if !path.is_file() {
        return Ok(None);
    }

    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("opening file for hashing: {path:?}"));
        }
    };

    let mut hasher = Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {path:?}"))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(hasher.finalize()))
}

/// Last seen content hash per path, in memory only.
#[derive(Debug, Default)]
pub struct FileCache {
    hashes: HashMap<PathBuf, blake3::Hash>,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current content of `path` without reporting a change.
    pub fn prime(&mut self, path: &Path) -> Result<()> {
        match compute_file_hash(path)? {
            Some(hash) => self.hashes.insert(path.to_path_buf(), hash),
            None => self.hashes.remove(path),
        };
        Ok(())
    }

    /// Re-hash `path` and report whether its content differs from the last
    /// recorded one. A path seen for the first time counts as changed, as
    /// does a deletion; a deleted path is forgotten. Directories never count:
    /// their children report their own changes.
    pub fn has_changed(&mut self, path: &Path) -> Result<bool> {
        let Some(hash) = compute_file_hash(path)? else {
            self.hashes.remove(path);
            return Ok(!path.is_dir());
        };
        let previous = self.hashes.insert(path.to_path_buf(), hash);
        Ok(previous != Some(hash))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Observer decorator that drops notifications for files whose content is
/// unchanged since the last notification.
///
/// Hashing errors let the notification through.
#[derive(Debug)]
pub struct ContentFilter<O> {
    cache: FileCache,
    inner: O,
}

impl<O: FileObserver> ContentFilter<O> {
    pub fn new(inner: O) -> Self {
        Self {
            cache: FileCache::new(),
            inner,
        }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }

    pub fn cache_mut(&mut self) -> &mut FileCache {
        &mut self.cache
    }
}

impl<O: FileObserver> FileObserver for ContentFilter<O> {
    fn begin(&mut self) {
        self.inner.begin();
    }

    fn file_changed(&mut self, path: &Path) -> bool {
        match self.cache.has_changed(path) {
            Ok(true) => self.inner.file_changed(path),
            Ok(false) => {
                debug!(path = %path.display(), "content unchanged; ignoring");
                false
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "hashing failed; passing change through");
                self.inner.file_changed(path)
            }
        }
    }

    fn idle(&mut self) {
        self.inner.idle();
    }
}
