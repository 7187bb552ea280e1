// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::watch::FileObserver;

use super::debounce::Debouncer;
use super::{RuntimeEvent, RuntimeOptions};

/// Feeds `RuntimeEvent`s to a [`FileObserver`] and calls its `idle` once the
/// quiet period after the last accepted change has passed.
///
/// Everything runs on the calling task, so observer callbacks never overlap.
pub struct Runtime<O: FileObserver> {
    observer: O,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    debounce: Debouncer,
}

impl<O: FileObserver> fmt::Debug for Runtime<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl<O: FileObserver> Runtime<O> {
    pub fn new(observer: O, event_rx: mpsc::Receiver<RuntimeEvent>, options: RuntimeOptions) -> Self {
        Self {
            observer,
            event_rx,
            debounce: Debouncer::new(options.quiet_period),
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Main event loop.
    ///
    /// Returns on `ShutdownRequested` or when every sender is gone. A change
    /// still inside its quiet period when the channel closes is flushed with a
    /// final `idle`; a shutdown request drops it.
    pub async fn run(&mut self) -> Result<()> {
        info!("crank runtime started");
        self.observer.begin();

        loop {
            tokio::select! {
                maybe_event = self.event_rx.recv() => {
                    match maybe_event {
                        Some(RuntimeEvent::FileChanged(path)) => {
                            if self.observer.file_changed(&path) {
                                debug!(path = %path.display(), "change accepted; re-arming quiet period");
                                self.debounce.poke();
                            }
                        }
                        Some(RuntimeEvent::ShutdownRequested) => {
                            info!("shutdown requested; stopping runtime");
                            break;
                        }
                        None => {
                            info!("runtime event channel closed; exiting");
                            if self.debounce.is_armed() {
                                self.debounce.disarm();
                                self.observer.idle();
                            }
                            break;
                        }
                    }
                }
                () = self.debounce.elapsed(), if self.debounce.is_armed() => {
                    debug!("quiet period elapsed");
                    self.observer.idle();
                }
            }
        }

        info!("runtime exiting");
        Ok(())
    }
}
