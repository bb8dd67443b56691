//! DashboardViewModel - orchestration of loads, filters, mutations
//!
//! Composes the gateway, session store and notification queue into the
//! state a view layer renders. All writes to dashboard state happen
//! through methods here; consumers watch the revision channel and read
//! snapshots.
//!
//! Two guards keep overlapping async work honest:
//! - `refresh_gate`: at most one full refresh in flight; later requests
//!   (manual or timer) are no-ops, not queued.
//! - `list_seq`: every employee-list fetch carries a sequence number;
//!   a response only lands if its number is still the latest, so a slow
//!   stale response can never overwrite a newer one.

use crate::debounce::SearchDebouncer;
use crate::error::CoreError;
use crate::export::{DashboardSnapshot, ExportFile, ExportFormat, Exporter};
use crate::notify::{NotificationQueue, Severity};
use crate::refresh::{PollingRefresher, RefreshTarget};
use crate::session::SessionStore;
use async_trait::async_trait;
use rollcall_client::{DataGateway, EmployeeQuery, GatewayError, LogQuery};
use shared::models::{
    AttendanceLogPage, AttendanceLogStats, AttendanceStats, DailyAttendanceStats, DepartmentStats,
    Employee, EmployeeCreate, EmployeePage, EmployeeSuggestion, EmployeeUpdate, SiteStats,
    SyncOutcome,
};
use shared::util::now_millis;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, mpsc, watch};

/// Page size for the employee and log listings
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Maximum autocomplete suggestions requested per query
pub const SUGGESTION_LIMIT: u64 = 10;

/// Everything the view layer renders
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub employees: EmployeePage,
    pub logs: AttendanceLogPage,
    pub stats: Option<AttendanceStats>,
    pub daily_stats: Option<DailyAttendanceStats>,
    pub department_stats: Vec<DepartmentStats>,
    pub site_stats: Vec<SiteStats>,
    pub log_stats: Option<AttendanceLogStats>,
    pub sync_status: Option<shared::models::SyncStatus>,
    pub filters: EmployeeQuery,
    /// True until the first load settles
    pub loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            employees: EmployeePage::empty(),
            logs: AttendanceLogPage::empty(),
            stats: None,
            daily_stats: None,
            department_stats: Vec::new(),
            site_stats: Vec::new(),
            log_stats: None,
            sync_status: None,
            filters: EmployeeQuery::with_limit(DEFAULT_PAGE_SIZE),
            loading: false,
        }
    }
}

pub struct DashboardViewModel {
    gateway: Arc<dyn DataGateway>,
    session: Arc<SessionStore>,
    notifications: NotificationQueue,
    state: RwLock<DashboardState>,
    revision: watch::Sender<u64>,
    /// Stale-response guard for the employee list query class
    list_seq: AtomicU64,
    /// Bumped on teardown and on session downgrade; a full-refresh
    /// result only lands if the epoch it started under is still current
    epoch: AtomicU64,
    /// At-most-one-refresh-in-flight gate
    refresh_gate: Mutex<()>,
    /// Background-failure latch: notify only on the first failure after
    /// a success
    refresh_failed: AtomicBool,
    torn_down: AtomicBool,
}

impl DashboardViewModel {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        session: Arc<SessionStore>,
        notifications: NotificationQueue,
    ) -> Arc<Self> {
        let (revision, _) = watch::channel(0);
        let vm = Arc::new(Self {
            gateway,
            session,
            notifications,
            state: RwLock::new(DashboardState::default()),
            revision,
            list_seq: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            refresh_gate: Mutex::new(()),
            refresh_failed: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
        });
        vm.spawn_session_watcher();
        vm
    }

    /// Invalidate in-flight fetches whenever the session drops out of
    /// Active (logout or a rejected token), so a response that started
    /// under the old session cannot land on the dashboard afterwards.
    fn spawn_session_watcher(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut session_rx = self.session.subscribe();
        tokio::spawn(async move {
            let mut was_active = session_rx.borrow().is_active();
            while session_rx.changed().await.is_ok() {
                let active = session_rx.borrow().is_active();
                if was_active && !active {
                    let Some(vm) = weak.upgrade() else { break };
                    tracing::debug!("session downgraded, invalidating in-flight fetches");
                    vm.invalidate_inflight();
                }
                was_active = active;
            }
        });
    }

    fn invalidate_inflight(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.next_list_seq();
    }

    /// Watch the state revision; bump means "re-read the snapshot"
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Forward a 401 from an authenticated call to the session store
    fn note_gateway_error(&self, error: &GatewayError) {
        if matches!(error, GatewayError::Unauthorized(_)) {
            self.session.handle_unauthorized();
        }
    }

    // ========== Loading and refresh ==========

    /// First load after session activation. Fetches every slice in
    /// parallel; partial data is fine, one error notification sums up
    /// whatever failed.
    pub async fn initial_load(&self) {
        let _guard = self.refresh_gate.lock().await;
        self.state.write().await.loading = true;
        self.bump();

        let failures = self.fetch_all().await;

        self.state.write().await.loading = false;
        self.bump();
        self.notify_failures(&failures);
    }

    /// User-triggered refresh. No-op (returns false) when a refresh is
    /// already in flight.
    pub async fn refresh_now(&self) -> bool {
        self.run_refresh(false).await
    }

    async fn run_refresh(&self, background: bool) -> bool {
        let Ok(_guard) = self.refresh_gate.try_lock() else {
            tracing::debug!("refresh skipped, one already in flight");
            return false;
        };

        let failures = self.fetch_all().await;

        if failures.is_empty() {
            self.refresh_failed.store(false, Ordering::SeqCst);
        } else if background {
            // only the success->failure edge notifies, so a flapping
            // backend doesn't spam the queue every tick
            if !self.refresh_failed.swap(true, Ordering::SeqCst) {
                self.notify_failures(&failures);
            }
        } else {
            self.notify_failures(&failures);
        }
        true
    }

    fn notify_failures(&self, failures: &[&'static str]) {
        if failures.is_empty() {
            return;
        }
        self.notifications.push(
            format!("Failed to load: {}", failures.join(", ")),
            Severity::Error,
        );
    }

    /// Fetch every slice concurrently and apply each independently.
    /// Returns the names of the slices that failed.
    async fn fetch_all(&self) -> Vec<&'static str> {
        let filters = self.state.read().await.filters.clone();
        let epoch = self.epoch.load(Ordering::SeqCst);
        let seq = self.next_list_seq();
        let log_query = LogQuery {
            limit: DEFAULT_PAGE_SIZE,
            ..Default::default()
        };

        let (employees, logs, stats, daily, departments, sites, log_stats, sync_status) = tokio::join!(
            self.gateway.list_employees(&filters),
            self.gateway.attendance_logs(&log_query),
            self.gateway.attendance_stats(),
            self.gateway.daily_attendance_stats(None),
            self.gateway.department_stats(),
            self.gateway.site_stats(),
            self.gateway.attendance_log_stats(),
            self.gateway.sync_status(),
        );

        if self.is_torn_down() || self.epoch.load(Ordering::SeqCst) != epoch {
            return Vec::new();
        }

        let mut failures = Vec::new();
        let mut state = self.state.write().await;

        match employees {
            Ok(page) => {
                if self.list_seq_is_latest(seq) {
                    state.employees = page;
                }
            }
            Err(e) => {
                self.note_gateway_error(&e);
                tracing::warn!("employees fetch failed: {e}");
                failures.push("employees");
            }
        }
        apply_slice(logs, &mut state.logs, "attendance logs", &mut failures, |e| {
            self.note_gateway_error(e)
        });
        apply_opt_slice(stats, &mut state.stats, "stats", &mut failures, |e| {
            self.note_gateway_error(e)
        });
        apply_opt_slice(daily, &mut state.daily_stats, "daily stats", &mut failures, |e| {
            self.note_gateway_error(e)
        });
        apply_slice(
            departments,
            &mut state.department_stats,
            "department stats",
            &mut failures,
            |e| self.note_gateway_error(e),
        );
        apply_slice(sites, &mut state.site_stats, "site stats", &mut failures, |e| {
            self.note_gateway_error(e)
        });
        apply_opt_slice(log_stats, &mut state.log_stats, "log stats", &mut failures, |e| {
            self.note_gateway_error(e)
        });
        apply_opt_slice(
            sync_status,
            &mut state.sync_status,
            "sync status",
            &mut failures,
            |e| self.note_gateway_error(e),
        );

        drop(state);
        self.bump();
        failures
    }

    // ========== Search and filters ==========

    /// Effective-query handler; this is what the debouncer drives.
    /// Empty means "show everything".
    pub async fn search(&self, query: &str) {
        {
            let mut state = self.state.write().await;
            state.filters.search = if query.is_empty() {
                None
            } else {
                Some(query.to_string())
            };
            state.filters.skip = 0;
        }
        self.reload_employees(true).await;
    }

    /// Replace the whole filter set and re-fetch the employee list
    pub async fn set_filters(&self, filters: EmployeeQuery) {
        self.state.write().await.filters = filters;
        self.reload_employees(true).await;
    }

    /// Re-fetch the employee list under the current filters. The
    /// previous list stays put on failure; a stale response (superseded
    /// by a newer request) is discarded on arrival.
    async fn reload_employees(&self, notify: bool) {
        let filters = self.state.read().await.filters.clone();
        let seq = self.next_list_seq();

        match self.gateway.list_employees(&filters).await {
            Ok(page) => {
                if self.list_seq_is_latest(seq) {
                    self.state.write().await.employees = page;
                    self.bump();
                } else {
                    tracing::debug!(seq, "stale employee list response discarded");
                }
            }
            Err(e) => {
                self.note_gateway_error(&e);
                if self.list_seq_is_latest(seq) && notify {
                    self.notifications
                        .push(format!("Failed to load employees: {e}"), Severity::Error);
                } else {
                    tracing::debug!(seq, "stale employee list failure ignored: {e}");
                }
            }
        }
    }

    fn next_list_seq(&self) -> u64 {
        self.list_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn list_seq_is_latest(&self, seq: u64) -> bool {
        !self.is_torn_down() && self.list_seq.load(Ordering::SeqCst) == seq
    }

    /// Autocomplete passthrough; results go straight to the caller and
    /// never touch dashboard state
    pub async fn suggestions(&self, query: &str) -> Result<Vec<EmployeeSuggestion>, CoreError> {
        self.gateway
            .employee_suggestions(query, SUGGESTION_LIMIT)
            .await
            .map_err(|e| {
                self.note_gateway_error(&e);
                e.into()
            })
    }

    /// Employee lookup by code; a 404 here is normal flow, not an error
    /// notification
    pub async fn employee_by_code(&self, code: &str) -> Result<Employee, CoreError> {
        self.gateway.employee_by_code(code).await.map_err(|e| {
            self.note_gateway_error(&e);
            e.into()
        })
    }

    // ========== Mutations ==========

    /// Create an employee, then bring the list and stats back in sync
    pub async fn add_employee(&self, employee: EmployeeCreate) -> Result<Employee, CoreError> {
        match self.gateway.create_employee(&employee).await {
            Ok(created) => {
                self.notifications
                    .push(format!("Employee {} added", created.name), Severity::Success);
                self.reload_after_mutation().await;
                Ok(created)
            }
            Err(e) => {
                self.note_gateway_error(&e);
                self.notifications
                    .push(format!("Failed to add employee: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    pub async fn update_employee(
        &self,
        id: &str,
        update: EmployeeUpdate,
    ) -> Result<Employee, CoreError> {
        match self.gateway.update_employee(id, &update).await {
            Ok(updated) => {
                self.notifications
                    .push(format!("Employee {} updated", updated.name), Severity::Success);
                self.reload_after_mutation().await;
                Ok(updated)
            }
            Err(e) => {
                self.note_gateway_error(&e);
                self.notifications
                    .push(format!("Failed to update employee: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    pub async fn delete_employee(&self, id: &str) -> Result<(), CoreError> {
        match self.gateway.delete_employee(id).await {
            Ok(()) => {
                self.notifications.push("Employee deleted", Severity::Success);
                self.reload_after_mutation().await;
                Ok(())
            }
            Err(e) => {
                self.note_gateway_error(&e);
                self.notifications
                    .push(format!("Failed to delete employee: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Kick a backend sync from the source sheet, then refresh
    pub async fn trigger_sync(&self) -> Result<SyncOutcome, CoreError> {
        match self.gateway.trigger_sync().await {
            Ok(outcome) => {
                self.notifications.push(
                    format!(
                        "Synced {} employees and {} attendance logs",
                        outcome.employees, outcome.attendance_logs
                    ),
                    Severity::Success,
                );
                self.refresh_now().await;
                Ok(outcome)
            }
            Err(e) => {
                self.note_gateway_error(&e);
                self.notifications
                    .push(format!("Sync failed: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Post-mutation re-fetch of the list and stat slices. Quiet on
    /// failure: the mutation already produced its one notification.
    async fn reload_after_mutation(&self) {
        let epoch = self.epoch.load(Ordering::SeqCst);
        self.reload_employees(false).await;

        let (stats, daily) = tokio::join!(
            self.gateway.attendance_stats(),
            self.gateway.daily_attendance_stats(None),
        );
        if self.is_torn_down() || self.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
        let mut state = self.state.write().await;
        match stats {
            Ok(s) => state.stats = Some(s),
            Err(e) => {
                self.note_gateway_error(&e);
                tracing::warn!("stats reload failed: {e}");
            }
        }
        match daily {
            Ok(s) => state.daily_stats = Some(s),
            Err(e) => {
                self.note_gateway_error(&e);
                tracing::warn!("daily stats reload failed: {e}");
            }
        }
        drop(state);
        self.bump();
    }

    // ========== Export ==========

    /// Hand the current dataset to an exporter
    pub async fn export(
        &self,
        format: ExportFormat,
        exporter: &dyn Exporter,
    ) -> Result<ExportFile, CoreError> {
        let snapshot = {
            let state = self.state.read().await;
            DashboardSnapshot {
                employees: state.employees.employees.clone(),
                logs: state.logs.logs.clone(),
                stats: state.stats.clone(),
                generated_at: now_millis(),
            }
        };

        match exporter.export(&snapshot, format).await {
            Ok(file) => {
                self.notifications.push(
                    format!(
                        "Exported {} employees as {}",
                        snapshot.employees.len(),
                        format.label()
                    ),
                    Severity::Success,
                );
                Ok(file)
            }
            Err(e) => {
                self.notifications
                    .push(format!("Export failed: {e}"), Severity::Error);
                Err(e.into())
            }
        }
    }

    // ========== Wiring ==========

    /// Spawn a debouncer whose effective queries drive [`search`]
    pub fn spawn_search_pipeline(self: &Arc<Self>) -> SearchDebouncer {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let vm = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(query) = rx.recv().await {
                vm.search(&query).await;
            }
        });
        SearchDebouncer::spawn(tx)
    }

    /// Spawn the auto-refresh poller, gated on this dashboard's session
    pub fn spawn_poller(self: &Arc<Self>) -> PollingRefresher {
        PollingRefresher::spawn(Arc::clone(self) as Arc<dyn RefreshTarget>, self.session.subscribe())
    }

    /// Invalidate in-flight work; late completions become no-ops. The
    /// debouncer and poller handles cancel themselves on drop.
    pub fn teardown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        self.invalidate_inflight();
        tracing::debug!("dashboard torn down");
    }
}

#[async_trait]
impl RefreshTarget for DashboardViewModel {
    async fn refresh(&self) -> bool {
        self.run_refresh(true).await
    }
}

fn apply_slice<T>(
    result: Result<T, GatewayError>,
    slot: &mut T,
    name: &'static str,
    failures: &mut Vec<&'static str>,
    mut on_error: impl FnMut(&GatewayError),
) {
    match result {
        Ok(value) => *slot = value,
        Err(e) => {
            on_error(&e);
            tracing::warn!("{name} fetch failed: {e}");
            failures.push(name);
        }
    }
}

fn apply_opt_slice<T>(
    result: Result<T, GatewayError>,
    slot: &mut Option<T>,
    name: &'static str,
    failures: &mut Vec<&'static str>,
    on_error: impl FnMut(&GatewayError),
) {
    apply_slice(result.map(Some), slot, name, failures, on_error)
}
