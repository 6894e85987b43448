//! Debounced delivery of free-text input

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Coalesces rapid text input into a single delivery after a quiet period
///
/// Every `submit` reschedules the timer from zero, so only the most recent
/// text is ever delivered and at most one delivery is pending at a time.
/// Empty text cancels a pending delivery without firing; callers handle
/// "search cleared" through their own explicit path. Dropping the debouncer
/// cancels any pending delivery silently.
pub struct QueryDebouncer {
    input_tx: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl QueryDebouncer {
    /// Start a debouncer that calls `on_ready` with the settled text after
    /// `quiet` has elapsed without further input.
    pub fn new<F>(quiet: Duration, mut on_ready: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

        let worker = tokio::spawn(async move {
            let mut pending: Option<String> = None;
            let mut deadline = Instant::now();
            loop {
                tokio::select! {
                    submitted = input_rx.recv() => match submitted {
                        None => break,
                        Some(text) if text.is_empty() => pending = None,
                        Some(text) => {
                            pending = Some(text);
                            deadline = Instant::now() + quiet;
                        }
                    },
                    _ = tokio::time::sleep_until(deadline), if pending.is_some() => {
                        if let Some(text) = pending.take() {
                            on_ready(text);
                        }
                    }
                }
            }
        });

        Self { input_tx, worker }
    }

    /// Submit a raw text change; delivery happens after the quiet interval.
    pub fn submit(&self, raw: impl Into<String>) {
        let _ = self.input_tx.send(raw.into());
    }
}

impl Drop for QueryDebouncer {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
