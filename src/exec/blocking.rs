// src/exec/blocking.rs

//! Bridge from the synchronous work graph into async process I/O.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Handle};

/// Drive `fut` to completion from synchronous code.
///
/// - Inside a multi-threaded Tokio runtime (the normal `crank` case) the
///   current worker is handed over with `block_in_place` and the future runs
///   on the existing runtime.
/// - Outside any runtime (plain unit tests, library callers) a private
///   current-thread runtime is built for the call.
///
/// Calling this from inside a current-thread runtime panics, as
/// `block_in_place` does.
pub fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    match Handle::try_current() {
        Ok(handle) => Ok(tokio::task::block_in_place(|| handle.block_on(fut))),
        Err(_) => {
            let rt = Builder::new_current_thread()
                .enable_all()
                .build()
                .context("building runtime for blocking task")?;
            Ok(rt.block_on(fut))
        }
    }
}
