// tests/content_cache.rs

mod common;
use crate::common::RecordingObserver;

use std::error::Error;
use std::fs;

use crank::watch::cache::compute_file_hash;
use crank::watch::{ContentFilter, FileCache, FileObserver};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn hash_tracks_content_not_timestamps() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("a.txt");

    fs::write(&path, "one")?;
    let first = compute_file_hash(&path)?;
    fs::write(&path, "one")?;
    assert_eq!(compute_file_hash(&path)?, first);

    fs::write(&path, "two")?;
    assert_ne!(compute_file_hash(&path)?, first);

    fs::remove_file(&path)?;
    assert_eq!(compute_file_hash(&path)?, None);
    assert_eq!(compute_file_hash(dir.path())?, None);
    Ok(())
}

#[test]
fn cache_reports_changes_since_last_look() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("a.txt");
    fs::write(&path, "one")?;

    let mut cache = FileCache::new();
    assert!(cache.has_changed(&path)?, "first sighting counts as a change");
    assert!(!cache.has_changed(&path)?);

    fs::write(&path, "two")?;
    assert!(cache.has_changed(&path)?);

    assert_eq!(cache.len(), 1);

    fs::remove_file(&path)?;
    assert!(cache.has_changed(&path)?, "deletion counts as a change");
    assert!(cache.is_empty(), "deleted paths are forgotten");

    fs::write(&path, "two")?;
    assert!(cache.has_changed(&path)?, "recreated file is a first sighting");
    assert_eq!(cache.len(), 1);

    assert!(!cache.has_changed(dir.path())?, "directories carry no content");
    Ok(())
}

#[test]
fn filter_drops_unchanged_notifications() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("main.go");
    fs::write(&path, "package main")?;

    let inner = RecordingObserver::new();
    let mut filter = ContentFilter::new(inner.clone());
    filter.cache_mut().prime(&path)?;

    filter.begin();
    assert!(!filter.file_changed(&path), "touch without edit");

    fs::write(&path, "package main // edited")?;
    assert!(filter.file_changed(&path));
    assert!(!filter.file_changed(&path));

    filter.idle();

    assert_eq!(inner.changed_paths(), vec![path.clone()]);
    assert_eq!(inner.idle_count(), 1);
    Ok(())
}
