//! In-memory mock of the attendance backend
//!
//! Serves the same REST surface the real backend exposes, backed by a
//! seeded in-memory dataset. Integration tests spawn it on an ephemeral
//! port; `main.rs` runs it standalone for manual poking.

pub mod api;
pub mod state;

pub use api::router;
pub use state::{ADMIN_PASSWORD, ADMIN_USERNAME, AppState};

use std::sync::Arc;

/// A mock backend bound to an ephemeral local port.
///
/// The server task is aborted when this handle is dropped.
pub struct MockServer {
    pub base_url: String,
    pub state: Arc<AppState>,
    task: tokio::task::JoinHandle<()>,
}

impl MockServer {
    /// Spawn a seeded mock backend on 127.0.0.1:0
    pub async fn spawn() -> std::io::Result<Self> {
        Self::spawn_with(Arc::new(AppState::seeded())).await
    }

    /// Spawn a mock backend over the given state
    pub async fn spawn_with(state: Arc<AppState>) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(state.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("mock backend stopped: {e}");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        })
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
