// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::TaskGraph;
use crate::engine::{IncrementalRunner, Restarter, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::CrankError;
use crate::exec::log::{ConsoleLog, TaskLog};
use crate::watch::patterns::ignore_matcher;
use crate::watch::{ContentFilter, FileObserver, RelativeObserver};

/// High-level entry point used by `main.rs`.
///
/// Wires config loading, the task graph, the file watcher, Ctrl-C handling
/// and the runtime together.
pub async fn run(args: CliArgs) -> Result<()> {
    if let Some(Command::Stayfresh { executable, args }) = args.command.clone() {
        return run_stayfresh(executable, args).await;
    }

    let config_path = PathBuf::from(&args.config);
    let mut cfg = load_and_validate(&config_path)?;
    cfg.override_targets(&args.targets)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let log: Arc<dyn TaskLog> = Arc::new(ConsoleLog::new());
    let graph = TaskGraph::from_config(&cfg, log)?;

    if args.once {
        return run_once(graph);
    }

    let root = config_root_dir(&config_path);
    let root = root.canonicalize().unwrap_or(root);

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let _watcher_handle = crate::watch::spawn_watcher(&root, true, rt_tx.clone())?;
    spawn_ctrl_c_handler(rt_tx);

    let runner = IncrementalRunner::new(graph, ignore_matcher(&cfg)?);
    let relative = RelativeObserver::new(root, runner);
    let observer: Box<dyn FileObserver> = if cfg.config_section().use_hash {
        Box::new(ContentFilter::new(relative))
    } else {
        Box::new(relative)
    };

    let options = RuntimeOptions {
        quiet_period: Duration::from_millis(cfg.config_section().debounce_ms),
    };
    let mut runtime = Runtime::new(observer, rt_rx, options);
    runtime.run().await?;
    Ok(())
}

fn run_once(mut graph: TaskGraph) -> Result<()> {
    graph.run();
    let failed = graph.failed_tasks();
    if failed.is_empty() {
        return Ok(());
    }
    info!(tasks = ?failed, "failed tasks");
    Err(CrankError::TasksFailed(failed.len()).into())
}

async fn run_stayfresh(executable: PathBuf, args: Vec<String>) -> Result<()> {
    let executable = executable
        .canonicalize()
        .with_context(|| format!("executable not found: {}", executable.display()))?;
    let dir = executable
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    // Watch the directory, not the file: rebuilt binaries are often replaced
    // by rename.
    let _watcher_handle = crate::watch::spawn_watcher(dir, false, rt_tx.clone())?;
    spawn_ctrl_c_handler(rt_tx);

    let mut runtime = Runtime::new(
        Restarter::new(executable, args),
        rt_rx,
        RuntimeOptions::default(),
    );
    runtime.run().await?;
    Ok(())
}

fn spawn_ctrl_c_handler(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

/// Directory of the config file, or the working directory for a bare file
/// name.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print tasks, dependencies, commands and targets.
fn print_dry_run(cfg: &ConfigFile) {
    let section = cfg.config_section();
    println!("crank dry-run");
    println!("  config.debounce_ms = {}", section.debounce_ms);
    println!("  config.use_hash = {}", section.use_hash);
    println!("  targets = {:?}", cfg.effective_targets());
    println!();

    println!("tasks ({}):", cfg.tasks().len());
    for (name, task) in cfg.tasks() {
        println!("  - {name}");
        match &task.cmd {
            Some(cmd) => println!("      cmd: {cmd}"),
            None => {
                for (i, step) in task.steps.iter().enumerate() {
                    println!("      step{}: {step}", i + 1);
                }
            }
        }
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if !task.order_after.is_empty() {
            println!("      order_after: {:?}", task.order_after);
        }
        let watch = crate::watch::patterns::effective_patterns(task, &cfg.default_section().watch);
        if !watch.is_empty() {
            println!("      watch: {watch:?}");
        }
    }

    debug!("dry-run complete (no execution)");
}
