//! NotificationQueue - transient user-facing messages
//!
//! Time-ordered queue with per-entry TTL expiry. Every push schedules
//! its own removal; dismiss and expiry race safely because removal is
//! by-id under one lock (the loser finds nothing to remove).

use shared::util::now_millis;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default time-to-live for a notification
pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);
/// How many entries the display layer shows at once
pub const VISIBLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One queued message
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    /// Unix millis
    pub created_at: i64,
    pub expires_at: i64,
}

struct Inner {
    entries: Mutex<Vec<Notification>>,
    next_id: AtomicU64,
}

/// Shared handle to the notification queue
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Inner>,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Append a message with the default TTL, returning its id
    pub fn push(&self, message: impl Into<String>, severity: Severity) -> u64 {
        self.push_with_ttl(message, severity, DEFAULT_TTL)
    }

    /// Append a message and schedule its removal after `ttl`
    pub fn push_with_ttl(&self, message: impl Into<String>, severity: Severity, ttl: Duration) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let now = now_millis();
        let entry = Notification {
            id,
            message: message.into(),
            severity,
            created_at: now,
            expires_at: now + ttl.as_millis() as i64,
        };
        tracing::debug!(id, severity = ?severity, "notification: {}", entry.message);
        self.inner
            .entries
            .lock()
            .expect("notification lock poisoned")
            .push(entry);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            remove(&inner, id);
        });

        id
    }

    /// Remove an entry early. Dismissing twice, or dismissing an id
    /// that already expired, is a no-op.
    pub fn dismiss(&self, id: u64) {
        remove(&self.inner, id);
    }

    /// The most recent [`VISIBLE_LIMIT`] entries, oldest first
    pub fn visible(&self) -> Vec<Notification> {
        let entries = self.inner.entries.lock().expect("notification lock poisoned");
        let start = entries.len().saturating_sub(VISIBLE_LIMIT);
        entries[start..].to_vec()
    }

    /// Every undismissed, unexpired entry in insertion order
    pub fn all(&self) -> Vec<Notification> {
        self.inner
            .entries
            .lock()
            .expect("notification lock poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner
            .entries
            .lock()
            .expect("notification lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn remove(inner: &Inner, id: u64) -> bool {
    let mut entries = inner.entries.lock().expect("notification lock poisoned");
    match entries.iter().position(|n| n.id == id) {
        Some(index) => {
            entries.remove(index);
            true
        }
        None => false,
    }
}
