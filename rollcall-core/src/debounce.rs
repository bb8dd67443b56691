//! SearchDebouncer - keystrokes in, rate-limited queries out
//!
//! Collapses a rapidly-changing query string into one effective-query
//! emission per quiet window. Clearing the query bypasses the window
//! entirely (an empty search means "show everything" and should feel
//! instant). Dropping the handle cancels the worker, so no stale
//! emission can fire after the consumer is gone.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Quiet window after the last keystroke
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Handle to a spawned debounce worker
pub struct SearchDebouncer {
    input_tx: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl SearchDebouncer {
    /// Spawn a worker emitting effective queries on `output` after the
    /// default window
    pub fn spawn(output: mpsc::UnboundedSender<String>) -> Self {
        Self::spawn_with_window(output, DEBOUNCE_WINDOW)
    }

    pub fn spawn_with_window(output: mpsc::UnboundedSender<String>, window: Duration) -> Self {
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let mut pending: Option<String> = None;
            let mut deadline: Option<Instant> = None;

            loop {
                let sleep_until =
                    deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

                tokio::select! {
                    _ = token.cancelled() => break,

                    _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                        if let Some(query) = pending.take() {
                            tracing::trace!(query = %query, "debounce window elapsed");
                            if output.send(query).is_err() {
                                break;
                            }
                        }
                        deadline = None;
                    }

                    raw = input_rx.recv() => {
                        match raw {
                            Some(raw) if raw.is_empty() => {
                                // cleared: emit immediately, drop anything pending
                                pending = None;
                                deadline = None;
                                if output.send(raw).is_err() {
                                    break;
                                }
                            }
                            Some(raw) => {
                                pending = Some(raw);
                                deadline = Some(Instant::now() + window);
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        Self { input_tx, cancel }
    }

    /// Feed one keystroke's worth of raw query
    pub fn on_query_changed(&self, raw: impl Into<String>) {
        let _ = self.input_tx.send(raw.into());
    }

    /// Stop the worker; any pending emission is discarded
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
