// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{CommandSpec, ConfigFile, RawConfigFile, TaskConfig};
use crate::errors::{CrankError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CrankError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.default, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    for (name, task) in &cfg.task {
        validate_task_commands(name, task)?;
    }
    validate_task_dependencies(cfg)?;
    validate_targets(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(CrankError::ConfigError(
            "config must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.debounce_ms == 0 {
        return Err(CrankError::ConfigError(
            "[config].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_commands(name: &str, task: &TaskConfig) -> Result<()> {
    match (&task.cmd, task.steps.is_empty()) {
        (Some(_), false) => {
            return Err(CrankError::ConfigError(format!(
                "task '{name}' sets both `cmd` and `steps`"
            )));
        }
        (None, true) => {
            return Err(CrankError::ConfigError(format!(
                "task '{name}' needs either `cmd` or a non-empty `steps`"
            )));
        }
        _ => {}
    }

    for cmd in task.commands() {
        let empty = match cmd {
            CommandSpec::Shell(line) => line.trim().is_empty(),
            CommandSpec::Argv(argv) => argv.is_empty() || argv[0].is_empty(),
        };
        if empty {
            return Err(CrankError::ConfigError(format!(
                "task '{name}' has an empty command"
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in &cfg.task {
        let deps = task
            .after
            .iter()
            .map(|d| ("after", d))
            .chain(task.order_after.iter().map(|d| ("order_after", d)));

        for (field, dep) in deps {
            if !cfg.task.contains_key(dep) {
                return Err(CrankError::ConfigError(format!(
                    "task '{name}' has unknown dependency '{dep}' in `{field}`"
                )));
            }
            if dep == name {
                return Err(CrankError::ConfigError(format!(
                    "task '{name}' cannot depend on itself in `{field}`"
                )));
            }
        }
    }
    Ok(())
}

fn validate_targets(cfg: &RawConfigFile) -> Result<()> {
    for target in &cfg.config.targets {
        if !cfg.task.contains_key(target) {
            return Err(CrankError::ConfigError(format!(
                "[config].targets names unknown task '{target}'"
            )));
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> task. Order-only edges constrain ordering just
    // like normal ones, so both count.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in &cfg.task {
        for dep in task.after.iter().chain(task.order_after.iter()) {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(CrankError::DagCycle(format!(
            "cycle detected in task DAG involving task '{}'",
            cycle.node_id()
        ))),
    }
}
