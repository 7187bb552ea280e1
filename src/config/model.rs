// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::dag::TaskName;
use crate::errors::{CrankError, Result};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// debounce_ms = 1000
/// targets = ["install"]
///
/// [default]
/// watch = ["**/*.go"]
///
/// [task.vet]
/// cmd = ["go", "vet", "./..."]
///
/// [task.install]
/// cmd = "go install ./..."
/// after = ["vet"]
/// ```
///
/// All sections except `[task.*]` are optional. This is the unvalidated shape;
/// see [`ConfigFile`] for the checked one.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// Keys are the task names.
    #[serde(default)]
    pub task: BTreeMap<TaskName, TaskConfig>,
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on: at least one task, known dependencies and targets,
/// an acyclic dependency graph.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    default: DefaultSection,
    task: BTreeMap<TaskName, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        default: DefaultSection,
        task: BTreeMap<TaskName, TaskConfig>,
    ) -> Self {
        Self {
            config,
            default,
            task,
        }
    }

    pub fn config_section(&self) -> &ConfigSection {
        &self.config
    }

    pub fn default_section(&self) -> &DefaultSection {
        &self.default
    }

    pub fn tasks(&self) -> &BTreeMap<TaskName, TaskConfig> {
        &self.task
    }

    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.task.get(name)
    }

    /// Replace `[config].targets`, e.g. from `--target` flags.
    ///
    /// An empty list leaves the configured targets untouched.
    pub fn override_targets(&mut self, targets: &[TaskName]) -> Result<()> {
        if targets.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = targets.iter().find(|t| !self.task.contains_key(*t)) {
            return Err(CrankError::TaskNotFound(unknown.clone()));
        }
        self.config.targets = targets.to_vec();
        Ok(())
    }

    /// Tasks the graph should keep up to date.
    ///
    /// `[config].targets` when given, otherwise every task no other task
    /// depends on (through `after` or `order_after`).
    pub fn effective_targets(&self) -> Vec<TaskName> {
        if !self.config.targets.is_empty() {
            return self.config.targets.clone();
        }

        self.task
            .keys()
            .filter(|name| {
                !self.task.values().any(|t| {
                    t.after.iter().any(|d| d == *name) || t.order_after.iter().any(|d| d == *name)
                })
            })
            .cloned()
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Quiet period after the last accepted change before the graph runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Roots of interest; empty means "every task nothing depends on".
    #[serde(default)]
    pub targets: Vec<TaskName>,

    /// Drop change notifications whose file content did not change.
    #[serde(default)]
    pub use_hash: bool,
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            targets: Vec::new(),
            use_hash: false,
        }
    }
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultSection {
    /// Cascading rules used by tasks that do not override `watch`.
    #[serde(default)]
    pub watch: Vec<String>,

    /// Paths that never invalidate anything.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

fn default_ignore() -> Vec<String> {
    vec!["**/.git/**".to_string()]
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            watch: Vec::new(),
            ignore: default_ignore(),
        }
    }
}

/// A command, either a shell line or an explicit argv.
///
/// ```toml
/// cmd = "go test ./..."          # Shell
/// cmd = ["go", "vet", "./..."]   # Argv
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Shell(String),
    Argv(Vec<String>),
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSpec::Shell(line) => f.write_str(line),
            CommandSpec::Argv(argv) => f.write_str(&argv.join(" ")),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Single command. Exactly one of `cmd` and `steps` must be given.
    #[serde(default)]
    pub cmd: Option<CommandSpec>,

    /// Commands run in order, stopping at the first failure.
    #[serde(default)]
    pub steps: Vec<CommandSpec>,

    /// Tasks that must succeed before this one runs.
    #[serde(default)]
    pub after: Vec<TaskName>,

    /// Tasks that must merely finish (success or failure) before this one.
    #[serde(default)]
    pub order_after: Vec<TaskName>,

    /// Task-local cascading rules. `None` uses `default.watch`.
    #[serde(default)]
    pub watch: Option<Vec<String>>,

    /// If true, `default.watch` is appended after `watch`.
    #[serde(default)]
    pub append_default_watch: bool,
}

impl TaskConfig {
    /// Commands in execution order (one for `cmd`, several for `steps`).
    pub fn commands(&self) -> Vec<&CommandSpec> {
        match &self.cmd {
            Some(cmd) => vec![cmd],
            None => self.steps.iter().collect(),
        }
    }
}
