// src/watch/mod.rs

//! File watching and change detection.
//!
//! - [`patterns`]: cascading glob rules mapping a changed path to tasks.
//! - [`observer`]: the [`FileObserver`] contract the runtime drives, and the
//!   root-relativizing decorator.
//! - [`cache`]: optional blake3 content filter.
//! - [`watcher`]: the `notify` watcher feeding `RuntimeEvent`s.
//!
//! Nothing here knows about the work graph; that is the job of
//! `engine::IncrementalRunner`.

pub mod cache;
pub mod observer;
pub mod patterns;
pub mod watcher;

pub use cache::{ContentFilter, FileCache};
pub use observer::{FileObserver, RelativeObserver};
pub use patterns::PathMatcher;
pub use watcher::{spawn_watcher, WatcherHandle};
