// src/engine/debounce.rs

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Re-armable quiet-period timer.
///
/// Every [`poke`](Debouncer::poke) pushes the deadline out by the full quiet
/// period; [`elapsed`](Debouncer::elapsed) resolves once it passes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn poke(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Wait for the deadline and disarm. Never resolves while disarmed.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}
