//! Mock REST surface
//!
//! Mirrors the attendance backend closely enough for gateway and
//! dashboard integration tests: same routes, same field names, same
//! `{"detail": ...}` error bodies, bearer-token auth on everything
//! except login.

use crate::state::{ADMIN_PASSWORD, ADMIN_USERNAME, AppState, admin_user};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::auth::{LoginRequest, LoginResponse};
use shared::models::{
    AttendanceLogPage, AttendanceLogStats, AttendanceStats, DailyAttendanceStats, DepartmentStats,
    Employee, EmployeeCreate, EmployeePage, EmployeeSuggestion, EmployeeUpdate, SiteStats,
    SyncOutcome, SyncStatus,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

type ApiError = (StatusCode, Json<Value>);

fn detail(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "detail": message })))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/employees", get(list_employees).post(create_employee))
        .route("/api/employees/search", get(search_employee))
        .route("/api/employees/suggestions", get(employee_suggestions))
        .route(
            "/api/employees/{id}",
            put(update_employee).delete(delete_employee),
        )
        .route("/api/attendance-logs", get(attendance_logs))
        .route("/api/attendance-logs/stats", get(attendance_log_stats))
        .route("/api/stats/attendance", get(attendance_stats))
        .route("/api/stats/daily-attendance", get(daily_attendance_stats))
        .route("/api/stats/departments", get(department_stats))
        .route("/api/stats/sites", get(site_stats))
        .route("/api/sync/google-sheets", post(trigger_sync))
        .route("/api/sync/status", get(sync_status))
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

async fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "Not authenticated"))?;
    let data = state.data.read().await;
    if data.tokens.contains(token) {
        Ok(())
    } else {
        Err(detail(
            StatusCode::UNAUTHORIZED,
            "Could not validate credentials",
        ))
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if req.username != ADMIN_USERNAME || req.password != ADMIN_PASSWORD {
        return Err(detail(
            StatusCode::UNAUTHORIZED,
            "Incorrect username or password",
        ));
    }

    let token = uuid::Uuid::new_v4().to_string();
    state.data.write().await.tokens.insert(token.clone());
    tracing::debug!(username = %req.username, "mock login");

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: admin_user(),
    }))
}

#[derive(Debug, Deserialize)]
struct EmployeeParams {
    #[serde(default)]
    skip: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    search: Option<String>,
    department: Option<String>,
    site: Option<String>,
    attendance_status: Option<String>,
}

fn default_limit() -> usize {
    100
}

async fn list_employees(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<EmployeeParams>,
) -> Result<Json<EmployeePage>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    let matches: Vec<&Employee> = data
        .employees
        .iter()
        .filter(|e| {
            if let Some(search) = &params.search {
                let s = search.to_lowercase();
                if !e.name.to_lowercase().contains(&s) && !e.employee_id.to_lowercase().contains(&s)
                {
                    return false;
                }
            }
            if let Some(department) = &params.department
                && &e.department != department
            {
                return false;
            }
            if let Some(site) = &params.site
                && &e.site != site
            {
                return false;
            }
            if let Some(status) = &params.attendance_status
                && &e.attendance_status.to_string() != status
            {
                return false;
            }
            true
        })
        .collect();

    let total_count = matches.len() as u64;
    let employees = matches
        .into_iter()
        .skip(params.skip)
        .take(params.limit)
        .cloned()
        .collect();

    Ok(Json(EmployeePage {
        employees,
        total_count,
        skip: params.skip as u64,
        limit: params.limit as u64,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    code: String,
}

async fn search_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Employee>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    data.employees
        .iter()
        .find(|e| e.employee_id == params.code)
        .cloned()
        .map(Json)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Employee not found"))
}

#[derive(Debug, Deserialize)]
struct SuggestionParams {
    #[serde(default)]
    query: String,
    #[serde(default = "default_suggestion_limit")]
    limit: usize,
}

fn default_suggestion_limit() -> usize {
    10
}

async fn employee_suggestions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<Vec<EmployeeSuggestion>>, ApiError> {
    require_auth(&state, &headers).await?;

    if params.query.len() < 2 {
        return Ok(Json(Vec::new()));
    }

    let q = params.query.to_lowercase();
    let data = state.data.read().await;
    let suggestions = data
        .employees
        .iter()
        .filter(|e| {
            e.employee_id.to_lowercase().contains(&q) || e.name.to_lowercase().contains(&q)
        })
        .take(params.limit)
        .map(|e| EmployeeSuggestion {
            code: e.employee_id.clone(),
            name: e.name.clone(),
            location: e.site.clone(),
            department: e.department.clone(),
        })
        .collect();

    Ok(Json(suggestions))
}

async fn create_employee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<EmployeeCreate>,
) -> Result<Json<Employee>, ApiError> {
    require_auth(&state, &headers).await?;

    let mut data = state.data.write().await;
    if data.employees.iter().any(|e| e.employee_id == req.employee_id) {
        return Err(detail(StatusCode::BAD_REQUEST, "Employee ID already exists"));
    }

    let employee = Employee {
        id: uuid::Uuid::new_v4().to_string(),
        employee_id: req.employee_id,
        name: req.name,
        department: req.department,
        site: req.site,
        attendance_status: req.attendance_status,
        mobile: None,
        email: None,
    };
    data.employees.push(employee.clone());
    Ok(Json(employee))
}

async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<EmployeeUpdate>,
) -> Result<Json<Employee>, ApiError> {
    require_auth(&state, &headers).await?;

    let mut data = state.data.write().await;
    let employee = data
        .employees
        .iter_mut()
        .find(|e| e.id == id || e.employee_id == id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Employee not found"))?;

    if let Some(name) = req.name {
        employee.name = name;
    }
    if let Some(department) = req.department {
        employee.department = department;
    }
    if let Some(status) = req.attendance_status {
        employee.attendance_status = status;
    }
    if let Some(site) = req.site {
        employee.site = site;
    }

    Ok(Json(employee.clone()))
}

async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers).await?;

    let mut data = state.data.write().await;
    let before = data.employees.len();
    data.employees.retain(|e| e.id != id && e.employee_id != id);
    if data.employees.len() == before {
        return Err(detail(StatusCode::NOT_FOUND, "Employee not found"));
    }
    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}

#[derive(Debug, Deserialize)]
struct LogParams {
    #[serde(default)]
    skip: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    user_id: Option<String>,
    device_id: Option<String>,
    date: Option<String>,
}

async fn attendance_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<LogParams>,
) -> Result<Json<AttendanceLogPage>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    let matches: Vec<_> = data
        .logs
        .iter()
        .filter(|l| {
            params.user_id.as_ref().is_none_or(|u| &l.user_id == u)
                && params.device_id.as_ref().is_none_or(|d| &l.device_id == d)
                && params.date.as_ref().is_none_or(|d| &l.download_date == d)
        })
        .collect();

    let total_count = matches.len() as u64;
    let logs = matches
        .into_iter()
        .skip(params.skip)
        .take(params.limit)
        .cloned()
        .collect();

    Ok(Json(AttendanceLogPage {
        logs,
        total_count,
        skip: params.skip as u64,
        limit: params.limit as u64,
    }))
}

async fn attendance_log_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AttendanceLogStats>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    let users: HashSet<&str> = data.logs.iter().map(|l| l.user_id.as_str()).collect();
    let devices: HashSet<&str> = data.logs.iter().map(|l| l.device_id.as_str()).collect();
    let in_logs = data.logs.iter().filter(|l| l.c1 == "in").count() as u64;
    let out_logs = data.logs.iter().filter(|l| l.c1 == "out").count() as u64;

    Ok(Json(AttendanceLogStats {
        total_logs: data.logs.len() as u64,
        unique_users: users.len() as u64,
        unique_devices: devices.len() as u64,
        in_logs,
        out_logs,
        recent_logs: data.logs.len() as u64,
    }))
}

fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

async fn attendance_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AttendanceStats>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    let total = data.employees.len() as u64;
    let present = count_status(&data.employees, "Present");
    let absent = count_status(&data.employees, "Absent");

    Ok(Json(AttendanceStats {
        total_employees: total,
        present,
        absent,
        present_percentage: pct(present, total),
        absent_percentage: pct(absent, total),
    }))
}

#[derive(Debug, Deserialize)]
struct DailyParams {
    date: Option<String>,
}

async fn daily_attendance_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<DailyParams>,
) -> Result<Json<DailyAttendanceStats>, ApiError> {
    require_auth(&state, &headers).await?;

    let date = params
        .date
        .unwrap_or_else(|| chrono::Local::now().format("%m/%d/%Y").to_string());

    let data = state.data.read().await;
    let total = data.employees.len() as u64;
    let present = count_status(&data.employees, "Present");
    let absent = count_status(&data.employees, "Absent");
    let half_day = count_status(&data.employees, "Half Day");
    let on_leave = count_status(&data.employees, "On Leave");

    Ok(Json(DailyAttendanceStats {
        date,
        total_employees: total,
        present,
        absent,
        half_day,
        on_leave,
        present_percentage: pct(present, total),
        absent_percentage: pct(absent, total),
        half_day_percentage: pct(half_day, total),
        on_leave_percentage: pct(on_leave, total),
    }))
}

fn count_status(employees: &[Employee], status: &str) -> u64 {
    employees
        .iter()
        .filter(|e| e.attendance_status.to_string() == status)
        .count() as u64
}

async fn department_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<DepartmentStats>>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    let rows = group_stats(&data.employees, |e| e.department.clone())
        .into_iter()
        .map(|(department, (total, present, absent))| DepartmentStats {
            department,
            total_employees: total,
            present,
            absent,
            present_percentage: pct(present, total),
            absent_percentage: pct(absent, total),
        })
        .collect();
    Ok(Json(rows))
}

async fn site_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<SiteStats>>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    let rows = group_stats(&data.employees, |e| e.site.clone())
        .into_iter()
        .map(|(site, (total, present, absent))| SiteStats {
            site,
            total_employees: total,
            present,
            absent,
            present_percentage: pct(present, total),
            absent_percentage: pct(absent, total),
        })
        .collect();
    Ok(Json(rows))
}

fn group_stats(
    employees: &[Employee],
    key: impl Fn(&Employee) -> String,
) -> BTreeMap<String, (u64, u64, u64)> {
    let mut groups: BTreeMap<String, (u64, u64, u64)> = BTreeMap::new();
    for e in employees {
        let entry = groups.entry(key(e)).or_default();
        entry.0 += 1;
        match e.attendance_status.to_string().as_str() {
            "Present" => entry.1 += 1,
            "Absent" => entry.2 += 1,
            _ => {}
        }
    }
    groups
}

async fn trigger_sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SyncOutcome>, ApiError> {
    require_auth(&state, &headers).await?;

    let mut data = state.data.write().await;
    data.last_sync = Some(chrono::Utc::now().to_rfc3339());
    tracing::info!(
        employees = data.employees.len(),
        logs = data.logs.len(),
        "mock sync triggered"
    );

    Ok(Json(SyncOutcome {
        message: "Data synced successfully".to_string(),
        attendance_logs: data.logs.len() as u64,
        employees: data.employees.len() as u64,
    }))
}

async fn sync_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SyncStatus>, ApiError> {
    require_auth(&state, &headers).await?;

    let data = state.data.read().await;
    Ok(Json(SyncStatus {
        attendance_logs_count: data.logs.len() as u64,
        employees_count: data.employees.len() as u64,
        last_sync: data.last_sync.clone(),
    }))
}
