//! Typed gateway over the attendance REST API
//!
//! One method per backend operation. The [`DataGateway`] trait is the
//! seam the dashboard core is written against; tests substitute a
//! programmable stub, production wires in [`HttpGateway`].
//!
//! No method here retries or mutates shared state - callers own both.

use crate::{GatewayConfig, GatewayResult, HttpClient, TokenCell};
use async_trait::async_trait;
use shared::auth::LoginResponse;
use shared::models::{
    AttendanceLogPage, AttendanceLogStats, AttendanceStats, DailyAttendanceStats, DepartmentStats,
    Employee, EmployeeCreate, EmployeePage, EmployeeSuggestion, EmployeeUpdate, SiteStats,
    SyncOutcome, SyncStatus,
};

/// Filters for the employee listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub site: Option<String>,
    pub attendance_status: Option<String>,
    pub skip: u64,
    pub limit: u64,
}

impl EmployeeQuery {
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("skip", self.skip.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(department) = &self.department {
            params.push(("department", department.clone()));
        }
        if let Some(site) = &self.site {
            params.push(("site", site.clone()));
        }
        if let Some(status) = &self.attendance_status {
            params.push(("attendance_status", status.clone()));
        }
        params
    }
}

/// Filters for the attendance log listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogQuery {
    pub user_id: Option<String>,
    pub device_id: Option<String>,
    pub date: Option<String>,
    pub skip: u64,
    pub limit: u64,
}

impl LogQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("skip", self.skip.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(user_id) = &self.user_id {
            params.push(("user_id", user_id.clone()));
        }
        if let Some(device_id) = &self.device_id {
            params.push(("device_id", device_id.clone()));
        }
        if let Some(date) = &self.date {
            params.push(("date", date.clone()));
        }
        params
    }
}

/// The fixed set of backend operations the dashboard needs
#[async_trait]
pub trait DataGateway: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse>;

    async fn list_employees(&self, query: &EmployeeQuery) -> GatewayResult<EmployeePage>;
    async fn employee_by_code(&self, code: &str) -> GatewayResult<Employee>;
    async fn employee_suggestions(
        &self,
        query: &str,
        limit: u64,
    ) -> GatewayResult<Vec<EmployeeSuggestion>>;
    async fn create_employee(&self, employee: &EmployeeCreate) -> GatewayResult<Employee>;
    async fn update_employee(&self, id: &str, update: &EmployeeUpdate) -> GatewayResult<Employee>;
    async fn delete_employee(&self, id: &str) -> GatewayResult<()>;

    async fn attendance_logs(&self, query: &LogQuery) -> GatewayResult<AttendanceLogPage>;
    async fn attendance_log_stats(&self) -> GatewayResult<AttendanceLogStats>;

    async fn attendance_stats(&self) -> GatewayResult<AttendanceStats>;
    async fn daily_attendance_stats(&self, date: Option<&str>)
    -> GatewayResult<DailyAttendanceStats>;
    async fn department_stats(&self) -> GatewayResult<Vec<DepartmentStats>>;
    async fn site_stats(&self) -> GatewayResult<Vec<SiteStats>>;

    async fn trigger_sync(&self) -> GatewayResult<SyncOutcome>;
    async fn sync_status(&self) -> GatewayResult<SyncStatus>;
}

/// Network implementation of [`DataGateway`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: HttpClient,
}

impl HttpGateway {
    /// Create a gateway from configuration and a shared token cell
    pub fn new(config: &GatewayConfig, token: TokenCell) -> Self {
        Self {
            http: HttpClient::new(config, token),
        }
    }

    pub fn token(&self) -> &TokenCell {
        self.http.token()
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn login(&self, username: &str, password: &str) -> GatewayResult<LoginResponse> {
        let request = shared::auth::LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.http.post("/api/auth/login", &request).await
    }

    async fn list_employees(&self, query: &EmployeeQuery) -> GatewayResult<EmployeePage> {
        self.http.get("/api/employees", &query.to_params()).await
    }

    async fn employee_by_code(&self, code: &str) -> GatewayResult<Employee> {
        self.http
            .get("/api/employees/search", &[("code", code.to_string())])
            .await
    }

    async fn employee_suggestions(
        &self,
        query: &str,
        limit: u64,
    ) -> GatewayResult<Vec<EmployeeSuggestion>> {
        self.http
            .get(
                "/api/employees/suggestions",
                &[("query", query.to_string()), ("limit", limit.to_string())],
            )
            .await
    }

    async fn create_employee(&self, employee: &EmployeeCreate) -> GatewayResult<Employee> {
        self.http.post("/api/employees", employee).await
    }

    async fn update_employee(&self, id: &str, update: &EmployeeUpdate) -> GatewayResult<Employee> {
        self.http.put(&format!("/api/employees/{id}"), update).await
    }

    async fn delete_employee(&self, id: &str) -> GatewayResult<()> {
        // The backend answers with a confirmation message we don't need
        let _: serde_json::Value = self.http.delete(&format!("/api/employees/{id}")).await?;
        Ok(())
    }

    async fn attendance_logs(&self, query: &LogQuery) -> GatewayResult<AttendanceLogPage> {
        self.http
            .get("/api/attendance-logs", &query.to_params())
            .await
    }

    async fn attendance_log_stats(&self) -> GatewayResult<AttendanceLogStats> {
        self.http.get("/api/attendance-logs/stats", &[]).await
    }

    async fn attendance_stats(&self) -> GatewayResult<AttendanceStats> {
        self.http.get("/api/stats/attendance", &[]).await
    }

    async fn daily_attendance_stats(
        &self,
        date: Option<&str>,
    ) -> GatewayResult<DailyAttendanceStats> {
        let params = match date {
            Some(d) => vec![("date", d.to_string())],
            None => Vec::new(),
        };
        self.http.get("/api/stats/daily-attendance", &params).await
    }

    async fn department_stats(&self) -> GatewayResult<Vec<DepartmentStats>> {
        self.http.get("/api/stats/departments", &[]).await
    }

    async fn site_stats(&self) -> GatewayResult<Vec<SiteStats>> {
        self.http.get("/api/stats/sites", &[]).await
    }

    async fn trigger_sync(&self) -> GatewayResult<SyncOutcome> {
        self.http.post_empty("/api/sync/google-sheets").await
    }

    async fn sync_status(&self) -> GatewayResult<SyncStatus> {
        self.http.get("/api/sync/status", &[]).await
    }
}
