//! In-memory backend state and seed data

use shared::auth::UserInfo;
use shared::models::{AttendanceLog, AttendanceStatus, Employee};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Credentials accepted by the mock login endpoint
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct AppState {
    pub data: RwLock<MockData>,
}

#[derive(Default)]
pub struct MockData {
    pub employees: Vec<Employee>,
    pub logs: Vec<AttendanceLog>,
    /// Bearer tokens issued by `/api/auth/login`
    pub tokens: HashSet<String>,
    pub last_sync: Option<String>,
}

impl AppState {
    /// State pre-populated with a small fixed dataset
    pub fn seeded() -> Self {
        Self {
            data: RwLock::new(MockData::seeded()),
        }
    }

    /// State with no employees or logs (login still works)
    pub fn empty() -> Self {
        Self {
            data: RwLock::new(MockData::default()),
        }
    }
}

impl MockData {
    pub fn seeded() -> Self {
        let employees = vec![
            employee("4051", "John Carter", "Engineering", "HQ", AttendanceStatus::Present),
            employee("4052", "Priya Nair", "Engineering", "HQ", AttendanceStatus::Absent),
            employee("4053", "Miguel Santos", "Operations", "Plant 2", AttendanceStatus::Present),
            employee("4054", "Aisha Khan", "Operations", "Plant 2", AttendanceStatus::HalfDay),
            employee("4055", "Wei Chen", "Finance", "HQ", AttendanceStatus::OnLeave),
        ];

        let logs = vec![
            log("4051", "dev-hq-1", "08/29/2026 09:02", "in"),
            log("4051", "dev-hq-1", "08/29/2026 18:10", "out"),
            log("4053", "dev-p2-1", "08/29/2026 08:55", "in"),
            log("4054", "dev-p2-1", "08/29/2026 09:15", "in"),
            log("4054", "dev-p2-1", "08/29/2026 13:05", "out"),
        ];

        Self {
            employees,
            logs,
            tokens: HashSet::new(),
            last_sync: None,
        }
    }
}

pub fn admin_user() -> UserInfo {
    UserInfo {
        username: ADMIN_USERNAME.to_string(),
        role: "admin".to_string(),
        email: "admin@rollcall.local".to_string(),
    }
}

fn employee(
    employee_id: &str,
    name: &str,
    department: &str,
    site: &str,
    attendance_status: AttendanceStatus,
) -> Employee {
    Employee {
        id: uuid::Uuid::new_v4().to_string(),
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        site: site.to_string(),
        attendance_status,
        mobile: None,
        email: None,
    }
}

fn log(user_id: &str, device_id: &str, log_date: &str, c1: &str) -> AttendanceLog {
    AttendanceLog {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        device_id: device_id.to_string(),
        log_date: log_date.to_string(),
        c1: c1.to_string(),
        direction: c1.to_string(),
        download_date: log_date.split_whitespace().next().unwrap_or("").to_string(),
        work_code: String::new(),
        location_address: String::new(),
        is_approved: 1,
    }
}
