//! Google-Sheets sync DTOs

use serde::{Deserialize, Serialize};

/// Result of a triggered sync (`POST /api/sync/google-sheets`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcome {
    #[serde(default)]
    pub message: String,
    pub attendance_logs: u64,
    pub employees: u64,
}

/// Current sync state (`GET /api/sync/status`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    pub attendance_logs_count: u64,
    pub employees_count: u64,
    /// RFC3339 timestamp of the newest synced log, if any
    #[serde(default)]
    pub last_sync: Option<String>,
}
