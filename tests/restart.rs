// tests/restart.rs

#![cfg(unix)]

mod common;
use crate::common::init_tracing;

use std::path::Path;

use crank::engine::Restarter;
use crank::watch::FileObserver;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn restarts_child_on_idle() {
    init_tracing();
    let mut restarter = Restarter::new("/bin/sleep", vec!["30".to_string()]);

    restarter.begin();
    assert!(restarter.is_running());

    assert!(restarter.file_changed(Path::new("/bin/sleep")));
    assert!(!restarter.file_changed(Path::new("/bin/other-tool")));

    restarter.idle();
    assert!(restarter.is_running());
    assert_eq!(restarter.restarts(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_executable_is_not_fatal() {
    let mut restarter = Restarter::new("/definitely/not/a/binary", Vec::new());

    restarter.begin();
    assert!(!restarter.is_running());

    restarter.idle();
    assert!(!restarter.is_running());
    assert_eq!(restarter.restarts(), 1);
}
