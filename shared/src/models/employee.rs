//! Employee model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attendance status as reported by the backend.
///
/// The wire values come from sheet data, so anything unrecognized maps
/// to `Unknown` instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[serde(rename = "On Leave")]
    OnLeave,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::OnLeave => "On Leave",
            AttendanceStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Employee record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub site: String,
    #[serde(default)]
    pub attendance_status: AttendanceStatus,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub attendance_status: AttendanceStatus,
    pub site: String,
}

/// Update employee payload (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance_status: Option<AttendanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

/// One page of the employee listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total_count: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

impl EmployeePage {
    pub fn empty() -> Self {
        Self {
            employees: Vec::new(),
            total_count: 0,
            skip: 0,
            limit: 0,
        }
    }
}

/// Autocomplete suggestion for the employee search box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeSuggestion {
    pub code: String,
    pub name: String,
    pub location: String,
    pub department: String,
}
