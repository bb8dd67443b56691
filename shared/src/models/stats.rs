//! Server-side stats aggregates
//!
//! All of these are derived by the backend and refreshed wholesale; the
//! client never recomputes them.

use serde::{Deserialize, Serialize};

/// Overall attendance snapshot (`/api/stats/attendance`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceStats {
    pub total_employees: u64,
    pub present: u64,
    pub absent: u64,
    #[serde(default)]
    pub present_percentage: f64,
    #[serde(default)]
    pub absent_percentage: f64,
}

/// Per-day snapshot (`/api/stats/daily-attendance?date=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyAttendanceStats {
    #[serde(default)]
    pub date: String,
    pub total_employees: u64,
    pub present: u64,
    pub absent: u64,
    #[serde(default)]
    pub half_day: u64,
    #[serde(default)]
    pub on_leave: u64,
    #[serde(default)]
    pub present_percentage: f64,
    #[serde(default)]
    pub absent_percentage: f64,
    #[serde(default)]
    pub half_day_percentage: f64,
    #[serde(default)]
    pub on_leave_percentage: f64,
}

/// Department breakdown row (`/api/stats/departments`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentStats {
    pub department: String,
    pub total_employees: u64,
    pub present: u64,
    pub absent: u64,
    #[serde(default)]
    pub present_percentage: f64,
    #[serde(default)]
    pub absent_percentage: f64,
}

/// Site breakdown row (`/api/stats/sites`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteStats {
    pub site: String,
    pub total_employees: u64,
    pub present: u64,
    pub absent: u64,
    #[serde(default)]
    pub present_percentage: f64,
    #[serde(default)]
    pub absent_percentage: f64,
}

/// Aggregate over the raw log table (`/api/attendance-logs/stats`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceLogStats {
    pub total_logs: u64,
    pub unique_users: u64,
    pub unique_devices: u64,
    pub in_logs: u64,
    pub out_logs: u64,
    #[serde(default)]
    pub recent_logs: u64,
}
