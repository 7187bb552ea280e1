// src/exec/command.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::config::model::CommandSpec;
use crate::exec::blocking::block_on;
use crate::exec::log::{OutputStream, TaskLog};
use crate::exec::task::TaskDecl;

/// Runs one external command; succeeds iff it exits with status zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTask {
    program: String,
    args: Vec<String>,
}

impl CommandTask {
    /// `argv[0]` is the program, the rest its arguments. No shell involved.
    pub fn argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv.next().unwrap_or_default();
        Self {
            program,
            args: argv.collect(),
        }
    }

    /// A command line run through the platform shell.
    pub fn shell(line: impl Into<String>) -> Self {
        if cfg!(windows) {
            Self::argv(["cmd".to_string(), "/C".to_string(), line.into()])
        } else {
            Self::argv(["sh".to_string(), "-c".to_string(), line.into()])
        }
    }

    pub fn from_spec(spec: &CommandSpec) -> Self {
        match spec {
            CommandSpec::Shell(line) => Self::shell(line.as_str()),
            CommandSpec::Argv(argv) => Self::argv(argv.iter().cloned()),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn printable(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TaskDecl for CommandTask {
    fn run(&self, log: &dyn TaskLog) -> bool {
        log.info(&format!("Running: {}", self.printable()));

        match block_on(run_command(&self.program, &self.args, log)) {
            Ok(Ok(true)) => true,
            Ok(Ok(false)) => false,
            Ok(Err(err)) | Err(err) => {
                log.error(&format!("Command failed: {err:#}"));
                false
            }
        }
    }

    fn describe(&self) -> String {
        self.printable()
    }
}

/// Spawn `program`, stream its output into `log` line by line, and wait for
/// it to exit.
///
/// Returns `Ok(true)` on exit status zero, `Ok(false)` on any other exit, and
/// an error if the process could not be spawned or waited on.
pub async fn run_command(program: &str, args: &[String], log: &dyn TaskLog) -> Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning '{program}'"))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    // Drain both pipes while waiting so a chatty child cannot block on a
    // full buffer.
    let (status, (), ()) = tokio::join!(
        child.wait(),
        forward_lines(stdout, OutputStream::Stdout, log),
        forward_lines(stderr, OutputStream::Stderr, log),
    );

    let status = status.with_context(|| format!("waiting for '{program}'"))?;
    debug!(program, exit_code = ?status.code(), success = status.success(), "process exited");

    if status.success() {
        Ok(true)
    } else {
        log.error(&format!("Command failed: {status}"));
        Ok(false)
    }
}

async fn forward_lines<R>(reader: Option<R>, stream: OutputStream, log: &dyn TaskLog)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    // Raw bytes, not `lines()`: output need not be UTF-8, and the pipe must
    // stay open until EOF or the child dies of SIGPIPE.
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => log.output(stream, &String::from_utf8_lossy(trim_line_end(&buf))),
            Err(err) => {
                debug!(%stream, error = %err, "error reading process output");
                if drain(&mut reader).await.is_err() {
                    break;
                }
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

async fn drain<R: AsyncRead + Unpin>(reader: &mut BufReader<R>) -> std::io::Result<u64> {
    tokio::io::copy(reader, &mut tokio::io::sink()).await
}
