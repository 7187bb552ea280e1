#![allow(dead_code)]

use std::collections::BTreeMap;

use crank::config::{CommandSpec, ConfigFile, ConfigSection, DefaultSection, RawConfigFile, TaskConfig};
use crank::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                default: DefaultSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_global_watch(mut self, pattern: &str) -> Self {
        self.config.default.watch.push(pattern.to_string());
        self
    }

    pub fn with_ignore(mut self, pattern: &str) -> Self {
        self.config.default.ignore.push(pattern.to_string());
        self
    }

    pub fn with_target(mut self, name: &str) -> Self {
        self.config.config.targets.push(name.to_string());
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.config.config.debounce_ms = ms;
        self
    }

    pub fn with_use_hash(mut self, val: bool) -> Self {
        self.config.config.use_hash = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// Task running `cmd` through the shell.
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(CommandSpec::Shell(cmd.to_string())),
                ..TaskConfig::default()
            },
        }
    }

    pub fn argv(argv: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(CommandSpec::Argv(argv.iter().map(|s| s.to_string()).collect())),
                ..TaskConfig::default()
            },
        }
    }

    /// Task with `steps` and no `cmd`.
    pub fn steps(steps: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                steps: steps
                    .iter()
                    .map(|s| CommandSpec::Shell(s.to_string()))
                    .collect(),
                ..TaskConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn order_after(mut self, dep: &str) -> Self {
        self.task.order_after.push(dep.to_string());
        self
    }

    pub fn watch(mut self, pattern: &str) -> Self {
        let watches = self.task.watch.get_or_insert(vec![]);
        watches.push(pattern.to_string());
        self
    }

    pub fn append_default_watch(mut self, val: bool) -> Self {
        self.task.append_default_watch = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
