// src/exec/mod.rs

//! Units of work and their logs.
//!
//! - [`task`] defines [`TaskDecl`] and the [`TaskWork`] adapter that plugs a
//!   declaration into the work graph.
//! - [`command`] runs external processes via `tokio::process`.
//! - [`sequence`] chains named steps.
//! - [`log`] holds the [`TaskLog`] collaborators.
//! - [`blocking`] bridges the synchronous graph to async process I/O.

pub mod blocking;
pub mod command;
pub mod log;
pub mod sequence;
pub mod task;

pub use command::{run_command, CommandTask};
pub use log::{ConsoleLog, MultiLog, NullLog, OutputStream, TaskLog};
pub use sequence::SequenceTask;
pub use task::{TaskDecl, TaskWork};
