// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `crank`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "crank",
    version,
    about = "Incrementally re-run tasks when the files they watch change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML). Its directory is the project root.
    #[arg(long, value_name = "PATH", default_value = "Crank.toml")]
    pub config: String,

    /// Run the graph once to quiescence and exit; no watching.
    #[arg(long)]
    pub once: bool,

    /// Parse and validate the config, print the graph, run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CRANK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Task to keep up to date; repeatable. Overrides `[config].targets`.
    #[arg(long = "target", value_name = "NAME")]
    pub targets: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run an executable and restart it whenever the file changes.
    Stayfresh {
        /// Executable to run and watch.
        executable: PathBuf,

        /// Arguments passed through to the executable.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
