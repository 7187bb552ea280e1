// tests/patterns.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, TaskConfigBuilder};

use crank::errors::CrankError;
use crank::watch::patterns::{effective_patterns, ignore_matcher, task_matcher};
use crank::watch::PathMatcher;

#[test]
fn last_matching_rule_wins() {
    let m = PathMatcher::new(["**/*.go", "!**/*_test.go", "testdata/golden_test.go"]).unwrap();

    assert!(m.matches("main.go"));
    assert!(m.matches("pkg/util/strings.go"));
    assert!(!m.matches("pkg/util/strings_test.go"));
    assert!(m.matches("testdata/golden_test.go"));
    assert!(!m.matches("README.md"));
}

#[test]
fn star_does_not_cross_separators() {
    let m = PathMatcher::new(["src/*.rs"]).unwrap();
    assert!(m.matches("src/lib.rs"));
    assert!(!m.matches("src/dag/graph.rs"));

    let deep = PathMatcher::new(["src/**/*.rs"]).unwrap();
    assert!(deep.matches("src/dag/graph.rs"));
    assert!(deep.matches("src/lib.rs"));
}

#[test]
fn only_negative_rules_match_nothing() {
    let m = PathMatcher::new(["!**/*.tmp"]).unwrap();
    assert!(!m.matches("a.tmp"));
    assert!(!m.matches("a.txt"));
}

#[test]
fn empty_matcher_matches_nothing() {
    let m = PathMatcher::empty();
    assert!(m.is_empty());
    assert!(!m.matches("anything"));
}

#[test]
fn invalid_pattern_is_reported() {
    let err = PathMatcher::new(["src/[unclosed"]).unwrap_err();
    assert!(matches!(err, CrankError::Pattern(ref msg) if msg.contains("[unclosed")));
}

#[test]
fn task_rules_cascade_with_defaults() {
    let cfg = ConfigFileBuilder::new()
        .with_global_watch("**/*.rs")
        .with_task("inherits", TaskConfigBuilder::new("true").build())
        .with_task("replaces", TaskConfigBuilder::new("true").watch("docs/**").build())
        .with_task(
            "appends",
            TaskConfigBuilder::new("true")
                .watch("!src/generated/**")
                .append_default_watch(true)
                .build(),
        )
        .build();

    let tasks = cfg.tasks();
    let default_watch = &cfg.default_section().watch;
    assert_eq!(effective_patterns(&tasks["inherits"], default_watch), vec!["**/*.rs"]);
    assert_eq!(effective_patterns(&tasks["replaces"], default_watch), vec!["docs/**"]);
    assert_eq!(
        effective_patterns(&tasks["appends"], default_watch),
        vec!["!src/generated/**", "**/*.rs"]
    );

    let inherits = task_matcher(&cfg, "inherits").unwrap();
    assert!(inherits.matches("src/main.rs"));

    let replaces = task_matcher(&cfg, "replaces").unwrap();
    assert!(!replaces.matches("src/main.rs"));
    assert!(replaces.matches("docs/index.md"));

    // Appended defaults come last, so they win over the task's exclusion.
    let appends = task_matcher(&cfg, "appends").unwrap();
    assert!(appends.matches("src/generated/out.rs"));
}

#[test]
fn ignore_defaults_to_git_directory() {
    let cfg = ConfigFileBuilder::new()
        .with_ignore("target/**")
        .with_task("a", TaskConfigBuilder::new("true").build())
        .build();

    let ignore = ignore_matcher(&cfg).unwrap();
    assert!(ignore.matches("repo/.git/index"));
    assert!(ignore.matches("target/debug/crank"));
    assert!(!ignore.matches("src/lib.rs"));
}

#[test]
fn unknown_task_has_no_matcher() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .build();
    assert!(matches!(task_matcher(&cfg, "b"), Err(CrankError::TaskNotFound(_))));
}
