//! Programmable in-memory gateway for dashboard and session tests
#![allow(dead_code)]

use async_trait::async_trait;
use rollcall_client::{DataGateway, EmployeeQuery, GatewayError, GatewayResult, LogQuery};
use shared::auth::{LoginResponse, UserInfo};
use shared::models::{
    AttendanceLogPage, AttendanceLogStats, AttendanceStats, DailyAttendanceStats, DepartmentStats,
    Employee, EmployeeCreate, EmployeePage, EmployeeSuggestion, EmployeeUpdate, SiteStats,
    SyncOutcome, SyncStatus,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub fn employee(employee_id: &str, name: &str) -> Employee {
    Employee {
        id: format!("id-{employee_id}"),
        employee_id: employee_id.to_string(),
        name: name.to_string(),
        department: "IT".to_string(),
        site: "HQ".to_string(),
        attendance_status: Default::default(),
        mobile: None,
        email: None,
    }
}

pub fn admin_login_response() -> LoginResponse {
    LoginResponse {
        access_token: "t1".to_string(),
        token_type: "bearer".to_string(),
        user: UserInfo {
            username: "admin".to_string(),
            role: "admin".to_string(),
            email: String::new(),
        },
    }
}

pub fn server_down() -> GatewayError {
    GatewayError::Server {
        status: 503,
        message: "backend down".to_string(),
    }
}

/// Scriptable [`DataGateway`]: per-operation forced failures, per-call
/// delays and a call log, over a small in-memory employee list.
#[derive(Default)]
pub struct StubGateway {
    employees: Mutex<Vec<Employee>>,
    failing: Mutex<HashSet<&'static str>>,
    rejecting: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<&'static str, VecDeque<Duration>>>,
    calls: Mutex<Vec<String>>,
    login_script: Mutex<VecDeque<GatewayResult<LoginResponse>>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: Mutex::new(employees),
            ..Self::default()
        }
    }

    /// Force `op` to fail with a 503 until [`clear_failures`] is called
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
        self.rejecting.lock().unwrap().clear();
    }

    /// Force `op` to answer 401, as a backend does for an expired token
    pub fn reject_token_on(&self, op: &'static str) {
        self.rejecting.lock().unwrap().insert(op);
    }

    /// Queue a delay applied to the next call of `op` (FIFO per op)
    pub fn push_delay(&self, op: &'static str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    /// Queue an explicit outcome for the next `login` call. When the
    /// script runs out, logins fall back to admin/admin123.
    pub fn push_login(&self, result: GatewayResult<LoginResponse>) {
        self.login_script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many logged calls were to exactly this operation
    pub fn calls_matching(&self, op: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(op))
            .count()
    }

    async fn enter(&self, op: &'static str, detail: String) -> GatewayResult<()> {
        let entry = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op}:{detail}")
        };
        self.calls.lock().unwrap().push(entry);

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(|queue| queue.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(op) {
            return Err(server_down());
        }
        if self.rejecting.lock().unwrap().contains(op) {
            return Err(GatewayError::Unauthorized("Token expired".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataGateway for StubGateway {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse> {
        self.enter("login", username.to_string()).await?;
        if let Some(scripted) = self.login_script.lock().unwrap().pop_front() {
            return scripted;
        }
        if username == "admin" && password == "admin123" {
            Ok(admin_login_response())
        } else {
            Err(GatewayError::Unauthorized(
                "Incorrect username or password".to_string(),
            ))
        }
    }

    async fn list_employees(&self, query: &EmployeeQuery) -> GatewayResult<EmployeePage> {
        self.enter(
            "list_employees",
            query.search.clone().unwrap_or_default(),
        )
        .await?;
        let all = self.employees.lock().unwrap().clone();
        let matching: Vec<Employee> = match &query.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                all.into_iter()
                    .filter(|e| {
                        e.name.to_lowercase().contains(&needle)
                            || e.employee_id.contains(needle.as_str())
                    })
                    .collect()
            }
            None => all,
        };
        Ok(EmployeePage {
            total_count: matching.len() as u64,
            employees: matching,
            skip: query.skip,
            limit: query.limit,
        })
    }

    async fn employee_by_code(&self, code: &str) -> GatewayResult<Employee> {
        self.enter("employee_by_code", code.to_string()).await?;
        self.employees
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.employee_id == code)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Employee not found".to_string()))
    }

    async fn employee_suggestions(
        &self,
        query: &str,
        limit: u64,
    ) -> GatewayResult<Vec<EmployeeSuggestion>> {
        self.enter("employee_suggestions", query.to_string()).await?;
        if query.len() < 2 {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        Ok(self
            .employees
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .take(limit as usize)
            .map(|e| EmployeeSuggestion {
                code: e.employee_id.clone(),
                name: e.name.clone(),
                location: e.site.clone(),
                department: e.department.clone(),
            })
            .collect())
    }

    async fn create_employee(&self, employee: &EmployeeCreate) -> GatewayResult<Employee> {
        self.enter("create_employee", employee.employee_id.clone())
            .await?;
        let mut employees = self.employees.lock().unwrap();
        if employees.iter().any(|e| e.employee_id == employee.employee_id) {
            return Err(GatewayError::Validation {
                status: 400,
                message: "Employee ID already exists".to_string(),
            });
        }
        let created = Employee {
            id: format!("id-{}", employee.employee_id),
            employee_id: employee.employee_id.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
            site: employee.site.clone(),
            attendance_status: employee.attendance_status,
            mobile: None,
            email: None,
        };
        employees.push(created.clone());
        Ok(created)
    }

    async fn update_employee(&self, id: &str, update: &EmployeeUpdate) -> GatewayResult<Employee> {
        self.enter("update_employee", id.to_string()).await?;
        let mut employees = self.employees.lock().unwrap();
        let found = employees
            .iter_mut()
            .find(|e| e.id == id || e.employee_id == id)
            .ok_or_else(|| GatewayError::NotFound("Employee not found".to_string()))?;
        if let Some(name) = &update.name {
            found.name = name.clone();
        }
        if let Some(department) = &update.department {
            found.department = department.clone();
        }
        if let Some(site) = &update.site {
            found.site = site.clone();
        }
        if let Some(status) = update.attendance_status {
            found.attendance_status = status;
        }
        Ok(found.clone())
    }

    async fn delete_employee(&self, id: &str) -> GatewayResult<()> {
        self.enter("delete_employee", id.to_string()).await?;
        let mut employees = self.employees.lock().unwrap();
        let before = employees.len();
        employees.retain(|e| e.id != id && e.employee_id != id);
        if employees.len() == before {
            return Err(GatewayError::NotFound("Employee not found".to_string()));
        }
        Ok(())
    }

    async fn attendance_logs(&self, _query: &LogQuery) -> GatewayResult<AttendanceLogPage> {
        self.enter("attendance_logs", String::new()).await?;
        Ok(AttendanceLogPage::empty())
    }

    async fn attendance_log_stats(&self) -> GatewayResult<AttendanceLogStats> {
        self.enter("attendance_log_stats", String::new()).await?;
        Ok(AttendanceLogStats::default())
    }

    async fn attendance_stats(&self) -> GatewayResult<AttendanceStats> {
        self.enter("attendance_stats", String::new()).await?;
        Ok(AttendanceStats {
            total_employees: self.employees.lock().unwrap().len() as u64,
            ..Default::default()
        })
    }

    async fn daily_attendance_stats(
        &self,
        date: Option<&str>,
    ) -> GatewayResult<DailyAttendanceStats> {
        self.enter("daily_attendance_stats", date.unwrap_or_default().to_string())
            .await?;
        Ok(DailyAttendanceStats::default())
    }

    async fn department_stats(&self) -> GatewayResult<Vec<DepartmentStats>> {
        self.enter("department_stats", String::new()).await?;
        Ok(Vec::new())
    }

    async fn site_stats(&self) -> GatewayResult<Vec<SiteStats>> {
        self.enter("site_stats", String::new()).await?;
        Ok(Vec::new())
    }

    async fn trigger_sync(&self) -> GatewayResult<SyncOutcome> {
        self.enter("trigger_sync", String::new()).await?;
        Ok(SyncOutcome {
            message: "Data synced successfully".to_string(),
            attendance_logs: 10,
            employees: self.employees.lock().unwrap().len() as u64,
        })
    }

    async fn sync_status(&self) -> GatewayResult<SyncStatus> {
        self.enter("sync_status", String::new()).await?;
        Ok(SyncStatus::default())
    }
}
