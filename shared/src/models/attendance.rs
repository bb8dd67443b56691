//! Attendance log model

use serde::{Deserialize, Serialize};

/// Punch direction, normalized from the log's `c1` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
    Unknown,
}

/// A single device punch record. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub id: String,
    pub user_id: String,
    pub device_id: String,
    pub log_date: String,
    /// Raw in/out marker from the device export
    #[serde(default)]
    pub c1: String,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub download_date: String,
    #[serde(default)]
    pub work_code: String,
    #[serde(default)]
    pub location_address: String,
    #[serde(default = "default_unapproved")]
    pub is_approved: i32,
}

fn default_unapproved() -> i32 {
    -1
}

impl AttendanceLog {
    /// Normalized punch direction
    pub fn punch_direction(&self) -> Direction {
        match self.c1.to_ascii_lowercase().as_str() {
            "in" => Direction::In,
            "out" => Direction::Out,
            _ => Direction::Unknown,
        }
    }

    pub fn approved(&self) -> bool {
        self.is_approved > 0
    }
}

/// One page of the attendance log listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLogPage {
    pub logs: Vec<AttendanceLog>,
    pub total_count: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl AttendanceLogPage {
    pub fn empty() -> Self {
        Self {
            logs: Vec::new(),
            total_count: 0,
            skip: 0,
            limit: 0,
        }
    }
}
