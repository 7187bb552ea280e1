// tests/task_log.rs

mod common;
use crate::common::RecordingLog;

use std::sync::Arc;
use std::time::Duration;

use crank::dag::Work;
use crank::exec::{ConsoleLog, MultiLog, NullLog, OutputStream, TaskDecl, TaskLog, TaskWork};

#[test]
fn multi_log_fans_out_every_call() {
    let a = RecordingLog::new();
    let b = RecordingLog::new();
    let children: Vec<Arc<dyn TaskLog>> = vec![Arc::new(a.clone()), Arc::new(b.clone())];
    let multi = MultiLog::new(children);

    multi.begin();
    multi.info("hello");
    multi.output(OutputStream::Stderr, "warning: x");
    multi.error("boom");
    multi.end(Duration::from_millis(5), false);

    let expected = vec![
        "begin".to_string(),
        "info hello".to_string(),
        "stderr warning: x".to_string(),
        "error boom".to_string(),
        "end failed".to_string(),
    ];
    assert_eq!(a.lines(), expected);
    assert_eq!(b.lines(), expected);
}

#[test]
fn multi_log_subtasks_fan_out_too() {
    let a = RecordingLog::new();
    let b = RecordingLog::new();
    let children: Vec<Arc<dyn TaskLog>> = vec![Arc::new(a.clone()), Arc::new(b.clone())];
    let multi = MultiLog::new(children);

    let sub = multi.subtask("build").subtask("vet");
    sub.info("ok");

    assert_eq!(a.lines(), vec!["build/vet: info ok".to_string()]);
    assert_eq!(b.lines(), vec!["build/vet: info ok".to_string()]);
}

#[test]
fn null_and_console_logs_accept_everything() {
    let null = NullLog;
    null.begin();
    null.output(OutputStream::Stdout, "dropped");
    null.subtask("x").end(Duration::ZERO, true);

    let console = ConsoleLog::new();
    assert_eq!(console.path(), "");
    let sub = console.subtask("check").subtask("vet");
    sub.info("console log smoke test");
}

struct Scripted(bool);

impl TaskDecl for Scripted {
    fn run(&self, log: &dyn TaskLog) -> bool {
        log.info("working");
        self.0
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

#[test]
fn task_work_brackets_runs_with_begin_and_end() {
    let log = RecordingLog::new();
    let mut work = TaskWork::new("lint", Box::new(Scripted(false)), log.subtask("lint"));

    assert_eq!(work.name(), "lint");
    assert_eq!(work.describe(), "scripted");
    assert!(!work.run());
    work.invalidated();

    assert_eq!(
        log.lines(),
        vec![
            "lint: begin".to_string(),
            "lint: info working".to_string(),
            "lint: end failed".to_string(),
        ]
    );
}
