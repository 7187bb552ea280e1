// tests/task_graph.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};
use crate::common::{init_tracing, FakeWorkManager, RecordingLog};

use std::error::Error;
use std::sync::Arc;

use crank::dag::{NodeState, TaskGraph};
use crank::errors::CrankError;
use crank::watch::PathMatcher;

type TestResult = Result<(), Box<dyn Error>>;

fn matcher(patterns: &[&str]) -> PathMatcher {
    PathMatcher::new(patterns.iter().copied()).unwrap()
}

#[test]
fn names_map_to_nodes_and_back() -> TestResult {
    let m = FakeWorkManager::new();
    let mut tg = TaskGraph::new();
    let a = tg.add_task("a", m.create(true), PathMatcher::empty())?;
    let b = tg.add_task("b", m.create(true), PathMatcher::empty())?;

    assert_eq!(tg.node_of("a"), Some(a));
    assert_eq!(tg.node_of("b"), Some(b));
    assert_eq!(tg.node_of("c"), None);
    assert_eq!(tg.name_of(b), Some("b"));
    assert_eq!(tg.task_names().collect::<Vec<_>>(), vec!["a", "b"]);
    Ok(())
}

#[test]
fn duplicate_and_unknown_names_are_errors() -> TestResult {
    let m = FakeWorkManager::new();
    let mut tg = TaskGraph::new();
    tg.add_task("a", m.create(true), PathMatcher::empty())?;

    let dup = tg.add_task("a", m.create(true), PathMatcher::empty()).unwrap_err();
    assert!(matches!(dup, CrankError::ConfigError(_)));

    let unknown = tg.add_dependency("a", "ghost", false).unwrap_err();
    assert!(matches!(unknown, CrankError::TaskNotFound(ref n) if n == "ghost"));
    assert!(matches!(tg.mark_target("ghost"), Err(CrankError::TaskNotFound(_))));
    Ok(())
}

#[test]
fn invalidate_matching_reruns_affected_tasks_only() -> TestResult {
    init_tracing();
    let m = FakeWorkManager::new();
    let mut tg = TaskGraph::new();
    tg.add_task("gen", m.create(true), matcher(&["schema/**"]))?;
    tg.add_task("build", m.create(true), matcher(&["src/**/*.rs"]))?;
    tg.add_task("docs", m.create(true), matcher(&["docs/**", "src/**/*.rs"]))?;
    tg.add_dependency("build", "gen", false)?;
    tg.mark_target("build")?;
    tg.mark_target("docs")?;

    let counts = tg.run();
    assert_eq!(counts.success, 3);
    assert_eq!(m.runs(), vec![0, 2, 1]);

    m.clear();
    let hits = tg.invalidate_matching("src/main.rs");
    assert_eq!(hits, vec!["build".to_string(), "docs".to_string()]);
    tg.run();
    assert_eq!(m.runs(), vec![1, 2]);

    m.clear();
    let hits = tg.invalidate_matching("schema/api.json");
    assert_eq!(hits, vec!["gen".to_string()]);
    tg.run();
    assert_eq!(m.runs(), vec![0, 1]);

    assert!(tg.invalidate_matching("README.md").is_empty());
    tg.graph().check_invariants()?;
    Ok(())
}

#[test]
fn failed_tasks_lists_live_errors() -> TestResult {
    let m = FakeWorkManager::new();
    let mut tg = TaskGraph::new();
    tg.add_task("lint", m.create(false), PathMatcher::empty())?;
    tg.add_task("test", m.create(true), PathMatcher::empty())?;
    tg.add_task("unused", m.create(false), PathMatcher::empty())?;
    tg.add_dependency("test", "lint", true)?;
    tg.mark_target("test")?;

    let counts = tg.run();
    assert_eq!(counts.error, 1);
    assert_eq!(counts.success, 1);
    assert_eq!(tg.failed_tasks(), vec!["lint"]);
    assert_eq!(tg.state_of("unused"), Some(NodeState::Waiting));
    Ok(())
}

#[cfg(unix)]
#[test]
fn from_config_builds_runnable_graph() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_global_watch("**/*.txt")
        .with_task("vet", TaskConfigBuilder::argv(&["true"]).build())
        .with_task("test", TaskConfigBuilder::new("exit 3").order_after("vet").build())
        .with_task(
            "install",
            TaskConfigBuilder::steps(&["echo one", "echo two"]).after("vet").build(),
        )
        .build();

    let log = RecordingLog::new();
    let mut tg = TaskGraph::from_config(&cfg, Arc::new(log.clone()))?;

    assert_eq!(tg.task_names().collect::<Vec<_>>(), vec!["install", "test", "vet"]);
    let vet = tg.node_of("vet").ok_or("vet")?;
    assert!(tg.graph().is_live(vet));

    tg.run();

    assert_eq!(tg.state_of("vet"), Some(NodeState::Success));
    assert_eq!(tg.state_of("test"), Some(NodeState::Error));
    assert_eq!(tg.state_of("install"), Some(NodeState::Success));
    assert_eq!(tg.failed_tasks(), vec!["test"]);

    let lines = log.lines();
    assert!(lines.contains(&"install/step1: stdout one".to_string()), "{lines:?}");
    assert!(lines.contains(&"install/step2: stdout two".to_string()), "{lines:?}");
    assert!(lines.contains(&"vet: end ok".to_string()), "{lines:?}");
    assert!(lines.contains(&"test: end failed".to_string()), "{lines:?}");

    let hits = tg.invalidate_matching("notes/todo.txt");
    assert_eq!(hits.len(), 3);
    Ok(())
}

#[test]
fn from_config_honours_explicit_targets() -> TestResult {
    let cfg = ConfigFileBuilder::new()
        .with_target("a")
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_task("b", TaskConfigBuilder::new("true").after("a").build())
        .build();

    let tg = TaskGraph::from_config(&cfg, Arc::new(RecordingLog::new()))?;
    let a = tg.node_of("a").ok_or("a")?;
    let b = tg.node_of("b").ok_or("b")?;
    assert!(tg.graph().is_live(a));
    assert!(!tg.graph().is_live(b));
    Ok(())
}
