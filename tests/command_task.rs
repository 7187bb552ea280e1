// tests/command_task.rs

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, RecordingLog};

use crank::config::CommandSpec;
use crank::exec::{CommandTask, SequenceTask, TaskDecl};

#[test]
fn successful_command_captures_output() {
    init_tracing();
    let log = RecordingLog::new();
    let task = CommandTask::shell("echo hello; echo oops >&2");

    assert!(task.run(&log));

    let lines = log.lines();
    assert_eq!(lines[0], "info Running: sh -c echo hello; echo oops >&2");
    assert!(lines.contains(&"stdout hello".to_string()), "{lines:?}");
    assert!(lines.contains(&"stderr oops".to_string()), "{lines:?}");
    assert!(!lines.iter().any(|l| l.starts_with("error")), "{lines:?}");
}

#[test]
fn non_zero_exit_is_failure() {
    let log = RecordingLog::new();
    let task = CommandTask::argv(["false"]);

    assert!(!task.run(&log));
    assert!(
        log.lines().iter().any(|l| l.starts_with("error Command failed")),
        "{:?}",
        log.lines()
    );
}

#[test]
fn missing_program_is_failure() {
    let log = RecordingLog::new();
    let task = CommandTask::argv(["crank-no-such-program-xyz"]);

    assert!(!task.run(&log));
    assert!(
        log.lines().iter().any(|l| l.contains("crank-no-such-program-xyz") && l.starts_with("error")),
        "{:?}",
        log.lines()
    );
}

#[test]
fn argv_is_passed_without_shell() {
    let log = RecordingLog::new();
    let task = CommandTask::argv(["echo", "a  b", "$HOME"]);

    assert!(task.run(&log));
    assert!(log.lines().contains(&"stdout a  b $HOME".to_string()), "{:?}", log.lines());
}

#[test]
fn non_utf8_output_does_not_fail_the_command() {
    let log = RecordingLog::new();
    let task = CommandTask::shell("printf 'bad \\377 byte\\n'; sleep 0.2; echo after; exit 0");

    assert!(task.run(&log), "{:?}", log.lines());

    let lines = log.lines();
    assert!(lines.contains(&"stdout bad \u{FFFD} byte".to_string()), "{lines:?}");
    assert!(lines.contains(&"stdout after".to_string()), "{lines:?}");
    assert!(!lines.iter().any(|l| l.starts_with("error")), "{lines:?}");
}

#[test]
fn crlf_line_endings_are_trimmed() {
    let log = RecordingLog::new();
    let task = CommandTask::shell("printf 'one\\r\\ntwo'");

    assert!(task.run(&log));
    let lines = log.lines();
    assert!(lines.contains(&"stdout one".to_string()), "{lines:?}");
    assert!(lines.contains(&"stdout two".to_string()), "{lines:?}");
}

#[test]
fn from_spec_picks_shell_or_argv() {
    let shell = CommandTask::from_spec(&CommandSpec::Shell("make all".into()));
    assert_eq!(shell.program(), "sh");
    assert_eq!(shell.args(), ["-c", "make all"]);

    let argv = CommandTask::from_spec(&CommandSpec::Argv(vec!["go".into(), "vet".into()]));
    assert_eq!(argv.program(), "go");
    assert_eq!(argv.args(), ["vet"]);
    assert_eq!(argv.describe(), "go vet");
}

#[test]
fn sequence_stops_at_first_failure() {
    let log = RecordingLog::new();
    let task = SequenceTask::new()
        .step("one", CommandTask::shell("echo first"))
        .step("two", CommandTask::argv(["false"]))
        .step("three", CommandTask::shell("echo never"));

    assert!(!task.run(&log));

    let lines = log.lines();
    assert!(lines.contains(&"one: begin".to_string()));
    assert!(lines.contains(&"one: stdout first".to_string()));
    assert!(lines.contains(&"one: end ok".to_string()));
    assert!(lines.contains(&"two: end failed".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("three")), "{lines:?}");
}

#[test]
fn sequence_of_successes_succeeds() {
    let log = RecordingLog::new();
    let task = SequenceTask::new()
        .step("a", CommandTask::argv(["true"]))
        .step("b", CommandTask::argv(["true"]));

    assert_eq!(task.len(), 2);
    assert!(task.run(&log));
    assert_eq!(task.describe(), "a: true; b: true");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runs_inside_a_multi_threaded_runtime() {
    let log = RecordingLog::new();
    let task = CommandTask::shell("echo from-runtime");

    assert!(task.run(&log));
    assert!(log.lines().contains(&"stdout from-runtime".to_string()));
}
