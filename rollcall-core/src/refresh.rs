//! PollingRefresher - periodic dashboard refresh
//!
//! Drives a [`RefreshTarget`] on a timer. Ticks that land while a
//! refresh is still running are dropped, not queued, and polling is
//! gated on the session being Active. The target owns the actual
//! in-flight guard so manual refreshes obey the same rule.

use crate::session::SessionState;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Default auto-refresh cadence
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// User-adjustable auto-refresh settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Something that can be refreshed.
///
/// `refresh` returns `false` when it declined to run because a prior
/// refresh was still in flight.
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    async fn refresh(&self) -> bool;
}

#[derive(Debug)]
enum Command {
    Start(Duration),
    Stop,
    SetInterval(Duration),
}

enum Event {
    Cancelled,
    Command(Option<Command>),
    SessionChanged(bool),
    Tick,
}

/// Handle to a spawned polling loop
pub struct PollingRefresher {
    cmd_tx: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

impl PollingRefresher {
    /// Spawn the polling loop over `target`, gated on `session_rx`
    pub fn spawn(
        target: Arc<dyn RefreshTarget>,
        session_rx: watch::Receiver<SessionState>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(run(target, session_rx, cmd_rx, token));

        Self { cmd_tx, cancel }
    }

    /// Begin (or restart) polling at the given cadence. The first tick
    /// fires one interval from now, not immediately.
    pub fn start(&self, interval: Duration) {
        let _ = self.cmd_tx.send(Command::Start(interval));
    }

    /// Halt polling; `start` resumes it
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(Command::Stop);
    }

    /// Change the cadence, taking effect from the next tick. No-op
    /// when polling is stopped.
    pub fn set_interval(&self, interval: Duration) {
        let _ = self.cmd_tx.send(Command::SetInterval(interval));
    }

    /// Tear down the polling task
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PollingRefresher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn make_ticker(interval: Duration) -> Interval {
    // interval_at so a Start/SetInterval never fires an immediate tick
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    // ticks missed while a refresh runs are dropped, not replayed
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

async fn run(
    target: Arc<dyn RefreshTarget>,
    mut session_rx: watch::Receiver<SessionState>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
) {
    let mut ticker: Option<Interval> = None;

    loop {
        let session_active = session_rx.borrow().is_active();

        let event = tokio::select! {
            _ = cancel.cancelled() => Event::Cancelled,

            cmd = cmd_rx.recv() => Event::Command(cmd),

            changed = session_rx.changed() => Event::SessionChanged(changed.is_ok()),

            _ = next_tick(&mut ticker), if session_active => Event::Tick,
        };

        match event {
            Event::Cancelled => break,
            Event::Command(None) => break,
            Event::Command(Some(Command::Start(interval))) => {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "polling started");
                ticker = Some(make_ticker(interval));
            }
            Event::Command(Some(Command::Stop)) => {
                tracing::debug!("polling stopped");
                ticker = None;
            }
            Event::Command(Some(Command::SetInterval(interval))) => {
                if ticker.is_some() {
                    tracing::debug!(
                        interval_ms = interval.as_millis() as u64,
                        "polling interval changed"
                    );
                    ticker = Some(make_ticker(interval));
                }
            }
            Event::SessionChanged(true) => {
                // gate re-evaluated at the top of the loop; reset the
                // cadence so a fresh Active session doesn't inherit a
                // half-elapsed tick
                if session_rx.borrow().is_active()
                    && let Some(t) = &ticker
                {
                    ticker = Some(make_ticker(t.period()));
                }
            }
            Event::SessionChanged(false) => break,
            Event::Tick => {
                if !target.refresh().await {
                    tracing::debug!("refresh tick skipped, previous refresh still in flight");
                }
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}
