//! Rollcall Core - client-side session and data-synchronization core
//!
//! The logic layer of the attendance dashboard: session lifecycle,
//! typed data fetching orchestration, search debouncing, polling
//! refresh and transient notifications. Rendering is somebody else's
//! job; any view layer can subscribe to the watch channels exposed
//! here.

pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod export;
pub mod notify;
pub mod refresh;
pub mod session;

pub use dashboard::{DashboardState, DashboardViewModel};
pub use debounce::SearchDebouncer;
pub use error::CoreError;
pub use export::{DashboardSnapshot, ExportError, ExportFile, ExportFormat, Exporter};
pub use notify::{Notification, NotificationQueue, Severity};
pub use refresh::{PollingRefresher, RefreshConfig, RefreshTarget};
pub use session::{
    FileSessionStorage, MemorySessionStorage, Session, SessionState, SessionStorage, SessionStore,
    StorageError,
};
