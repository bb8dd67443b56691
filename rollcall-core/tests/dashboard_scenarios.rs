//! Dashboard orchestration: loads, search, refresh, mutations, export

mod support;

use async_trait::async_trait;
use rollcall_client::{DataGateway, TokenCell};
use rollcall_core::{
    DashboardSnapshot, DashboardViewModel, ExportError, ExportFile, ExportFormat, Exporter,
    MemorySessionStorage, NotificationQueue, RefreshTarget, SessionStore, Severity,
};
use shared::models::{AttendanceStatus, EmployeeCreate};
use std::sync::Arc;
use std::time::Duration;
use support::{StubGateway, employee};

fn harness(
    stub: &Arc<StubGateway>,
) -> (Arc<DashboardViewModel>, Arc<SessionStore>, NotificationQueue) {
    let gateway: Arc<dyn DataGateway> = stub.clone();
    let session = Arc::new(SessionStore::new(
        gateway.clone(),
        Box::new(MemorySessionStorage::new()),
        TokenCell::new(),
    ));
    let notifications = NotificationQueue::new();
    let vm = DashboardViewModel::new(gateway, session.clone(), notifications.clone());
    (vm, session, notifications)
}

/// Let spawned tasks make progress without advancing the clock
async fn drain() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn initial_load_populates_every_slice() {
    let stub = Arc::new(StubGateway::with_employees(vec![
        employee("4051", "John Smith"),
        employee("4052", "Jane Roe"),
    ]));
    let (vm, _session, notifications) = harness(&stub);
    let mut revision = vm.subscribe();

    vm.initial_load().await;

    let state = vm.snapshot().await;
    assert_eq!(state.employees.employees.len(), 2);
    assert_eq!(state.stats.unwrap().total_employees, 2);
    assert!(state.sync_status.is_some());
    assert!(!state.loading);
    assert!(notifications.is_empty());
    assert!(revision.has_changed().unwrap());
}

#[tokio::test]
async fn partial_failure_keeps_the_healthy_slices() {
    let stub = Arc::new(StubGateway::with_employees(vec![employee(
        "4051",
        "John Smith",
    )]));
    stub.fail_on("list_employees");
    let (vm, _session, notifications) = harness(&stub);

    vm.initial_load().await;

    let state = vm.snapshot().await;
    assert!(state.employees.employees.is_empty());
    assert_eq!(state.stats.unwrap().total_employees, 1);

    let shown = notifications.all();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].message.contains("employees"));
    assert_eq!(shown[0].severity, Severity::Error);
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_produce_one_fetch() {
    let stub = Arc::new(StubGateway::with_employees(vec![
        employee("4051", "John Smith"),
        employee("4052", "Jane Roe"),
    ]));
    let (vm, _session, _notifications) = harness(&stub);
    let debouncer = vm.spawn_search_pipeline();

    debouncer.on_query_changed("j");
    debouncer.on_query_changed("jo");
    debouncer.on_query_changed("john");
    drain().await;

    tokio::time::advance(Duration::from_millis(400)).await;
    drain().await;

    assert_eq!(stub.calls(), vec!["list_employees:john"]);
    let state = vm.snapshot().await;
    assert_eq!(state.filters.search.as_deref(), Some("john"));
    assert_eq!(state.employees.employees.len(), 1);
    assert_eq!(state.employees.employees[0].name, "John Smith");
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_cannot_overwrite_a_newer_one() {
    let stub = Arc::new(StubGateway::with_employees(vec![
        employee("4051", "Old One"),
        employee("4052", "New Two"),
    ]));
    // first fetch lands after the second
    stub.push_delay("list_employees", Duration::from_millis(300));
    stub.push_delay("list_employees", Duration::from_millis(50));
    let (vm, _session, notifications) = harness(&stub);

    let vm1 = vm.clone();
    tokio::spawn(async move { vm1.search("old").await });
    drain().await;
    let vm2 = vm.clone();
    tokio::spawn(async move { vm2.search("new").await });
    drain().await;

    tokio::time::advance(Duration::from_millis(60)).await;
    drain().await;
    tokio::time::advance(Duration::from_millis(300)).await;
    drain().await;

    let state = vm.snapshot().await;
    assert_eq!(state.filters.search.as_deref(), Some("new"));
    assert_eq!(state.employees.employees.len(), 1);
    assert_eq!(state.employees.employees[0].name, "New Two");
    assert!(notifications.is_empty());
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_is_a_noop_while_one_is_in_flight() {
    let stub = Arc::new(StubGateway::new());
    stub.push_delay("list_employees", Duration::from_secs(5));
    let (vm, _session, _notifications) = harness(&stub);

    let running = vm.clone();
    let handle = tokio::spawn(async move { running.refresh_now().await });
    drain().await;

    assert!(!vm.refresh_now().await);
    assert_eq!(stub.calls_matching("list_employees"), 1);

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(handle.await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn background_failures_notify_once_until_recovery() {
    let stub = Arc::new(StubGateway::new());
    let (vm, _session, notifications) = harness(&stub);

    stub.fail_on("attendance_stats");
    assert!(vm.refresh().await);
    assert_eq!(notifications.len(), 1);
    assert!(notifications.all()[0].message.contains("stats"));

    // still failing: no second notification
    assert!(vm.refresh().await);
    assert_eq!(notifications.len(), 1);

    // recovery resets the latch silently
    stub.clear_failures();
    assert!(vm.refresh().await);
    assert_eq!(notifications.len(), 1);

    // the next failure is news again
    stub.fail_on("attendance_stats");
    assert!(vm.refresh().await);
    assert_eq!(notifications.len(), 2);
}

#[tokio::test]
async fn add_employee_notifies_and_refetches() {
    let stub = Arc::new(StubGateway::with_employees(vec![employee(
        "4051",
        "John Smith",
    )]));
    let (vm, _session, notifications) = harness(&stub);

    let create = EmployeeCreate {
        employee_id: "4060".into(),
        name: "Jane Roe".into(),
        department: "IT".into(),
        attendance_status: AttendanceStatus::Present,
        site: "HQ".into(),
    };
    let created = vm.add_employee(create.clone()).await.unwrap();
    assert_eq!(created.name, "Jane Roe");

    let shown = notifications.all();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].severity, Severity::Success);
    assert!(shown[0].message.contains("Jane Roe"));
    // the list and stats came back in sync
    assert_eq!(stub.calls_matching("list_employees"), 1);
    assert_eq!(stub.calls_matching("attendance_stats"), 1);
    assert_eq!(vm.snapshot().await.employees.employees.len(), 2);

    // duplicated id is rejected with exactly one error notification
    let err = vm.add_employee(create).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
    let shown = notifications.all();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[1].severity, Severity::Error);
}

#[tokio::test]
async fn delete_employee_notifies_and_shrinks_the_list() {
    let stub = Arc::new(StubGateway::with_employees(vec![
        employee("4051", "John Smith"),
        employee("4052", "Jane Roe"),
    ]));
    let (vm, _session, notifications) = harness(&stub);

    vm.delete_employee("id-4051").await.unwrap();
    assert_eq!(notifications.all()[0].message, "Employee deleted");
    assert_eq!(vm.snapshot().await.employees.employees.len(), 1);
}

#[tokio::test]
async fn trigger_sync_reports_counts_and_refreshes() {
    let stub = Arc::new(StubGateway::with_employees(vec![
        employee("4051", "John Smith"),
        employee("4052", "Jane Roe"),
    ]));
    let (vm, _session, notifications) = harness(&stub);

    let outcome = vm.trigger_sync().await.unwrap();
    assert_eq!(outcome.employees, 2);

    let shown = notifications.all();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].message, "Synced 2 employees and 10 attendance logs");
    assert_eq!(shown[0].severity, Severity::Success);
    // the sync kicked a full refresh
    assert_eq!(stub.calls_matching("list_employees"), 1);
}

struct CsvExporter;

#[async_trait]
impl Exporter for CsvExporter {
    async fn export(
        &self,
        dataset: &DashboardSnapshot,
        format: ExportFormat,
    ) -> Result<ExportFile, ExportError> {
        if format != ExportFormat::Csv {
            return Err(ExportError::Unsupported(format.label()));
        }
        let mut out = String::from("employee_id,name,department,site\n");
        for e in &dataset.employees {
            out.push_str(&format!(
                "{},{},{},{}\n",
                e.employee_id, e.name, e.department, e.site
            ));
        }
        Ok(ExportFile {
            file_name: format!("attendance_{}.{}", dataset.generated_at, format.extension()),
            contents: out.into_bytes(),
        })
    }
}

#[tokio::test]
async fn export_snapshots_the_current_dataset() {
    let stub = Arc::new(StubGateway::with_employees(vec![employee(
        "4051",
        "John Smith",
    )]));
    let (vm, _session, notifications) = harness(&stub);
    vm.initial_load().await;

    let file = vm.export(ExportFormat::Csv, &CsvExporter).await.unwrap();
    assert!(file.file_name.ends_with(".csv"));
    assert!(String::from_utf8(file.contents).unwrap().contains("John Smith"));
    assert!(
        notifications
            .all()
            .iter()
            .any(|n| n.message.contains("Exported 1 employees as CSV"))
    );

    let err = vm.export(ExportFormat::Pdf, &CsvExporter).await.unwrap_err();
    assert!(err.to_string().contains("not supported"));
    assert!(
        notifications
            .all()
            .iter()
            .any(|n| n.severity == Severity::Error && n.message.contains("Export failed"))
    );
}

#[tokio::test(start_paused = true)]
async fn logout_invalidates_in_flight_fetches() {
    let stub = Arc::new(StubGateway::with_employees(vec![employee(
        "4051",
        "John Smith",
    )]));
    stub.push_delay("list_employees", Duration::from_millis(500));
    let (vm, session, _notifications) = harness(&stub);

    session.login("admin", "admin123").await.unwrap();

    let searching = vm.clone();
    tokio::spawn(async move { searching.search("john").await });
    drain().await;

    // the fetch is still in flight when the user logs out
    session.logout();
    drain().await;
    tokio::time::advance(Duration::from_millis(600)).await;
    drain().await;

    let state = vm.snapshot().await;
    assert!(state.employees.employees.is_empty());
    assert_eq!(stub.calls_matching("list_employees"), 1);
}

#[tokio::test]
async fn rejected_token_during_refresh_downgrades_the_session() {
    let stub = Arc::new(StubGateway::new());
    let (vm, session, _notifications) = harness(&stub);

    session.login("admin", "admin123").await.unwrap();
    assert!(session.is_active());

    stub.reject_token_on("attendance_stats");
    vm.refresh_now().await;

    assert!(!session.is_active());
}
