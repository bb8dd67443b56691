//! SessionStore - authentication state and persistence
//!
//! Owns the login/logout/restore transitions and is the single writer
//! of the shared token cell. State changes are published on a watch
//! channel so the view layer and the polling refresher can react.
//!
//! State machine: `Anonymous -> Restoring -> {Anonymous, Active}` on
//! startup, `Anonymous -> Active` on login, `Active -> Anonymous` on
//! logout or on a rejected token (`handle_unauthorized`).

use crate::error::CoreError;
use rollcall_client::{DataGateway, EmployeeQuery, GatewayError, TokenCell};
use serde::{Deserialize, Serialize};
use shared::auth::UserInfo;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Login retries on transient failures (network / 5xx)
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;
/// Delay between login attempts
pub const LOGIN_RETRY_DELAY: Duration = Duration::from_secs(1);

/// An authenticated identity. Token and user always travel together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
}

/// Current authentication state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    /// A persisted token is being verified against the backend
    Restoring,
    Active(Session),
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client-local persistent storage for the session.
///
/// Synchronous by design: logout must clear state without awaiting
/// anything.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>, StorageError>;
    fn save(&self, session: &Session) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON file persistence under a data directory
pub struct FileSessionStorage {
    file_path: PathBuf,
}

impl FileSessionStorage {
    /// Store the session as `{data_dir}/session.json`
    pub fn new(data_dir: &Path) -> Self {
        Self {
            file_path: data_dir.join("session.json"),
        }
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        if !self.file_path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.file_path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.file_path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if self.file_path.exists() {
            std::fs::remove_file(&self.file_path)?;
        }
        Ok(())
    }
}

/// In-memory storage, for tests and embedded use
#[derive(Default)]
pub struct MemorySessionStorage {
    slot: std::sync::Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: std::sync::Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.slot.lock().expect("storage lock poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.slot.lock().expect("storage lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().expect("storage lock poisoned") = None;
        Ok(())
    }
}

/// Owns authentication state, token persistence and the login retry
/// policy
pub struct SessionStore {
    gateway: Arc<dyn DataGateway>,
    storage: Box<dyn SessionStorage>,
    token: TokenCell,
    state_tx: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(
        gateway: Arc<dyn DataGateway>,
        storage: Box<dyn SessionStorage>,
        token: TokenCell,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Anonymous);
        Self {
            gateway,
            storage,
            token,
            state_tx,
        }
    }

    /// Subscribe to session state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.state_tx.borrow().is_active()
    }

    /// Load the persisted session and verify its token with a cheap
    /// authenticated probe. Returns whether a session was restored.
    ///
    /// Any probe failure (401, network, server) clears the persisted
    /// state rather than keeping a token of unknown validity around.
    pub async fn restore(&self) -> Result<bool, CoreError> {
        self.state_tx.send_replace(SessionState::Restoring);

        let session = match self.storage.load() {
            Ok(Some(session)) => session,
            Ok(None) => {
                self.state_tx.send_replace(SessionState::Anonymous);
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!("failed to read persisted session: {e}");
                self.state_tx.send_replace(SessionState::Anonymous);
                return Ok(false);
            }
        };

        self.token.set(&session.token);
        match self.gateway.list_employees(&EmployeeQuery::with_limit(1)).await {
            Ok(_) => {
                tracing::info!(username = %session.user.username, "session restored");
                self.state_tx.send_replace(SessionState::Active(session));
                Ok(true)
            }
            Err(e) => {
                tracing::info!("persisted session rejected, clearing: {e}");
                self.token.clear();
                if let Err(e) = self.storage.clear() {
                    tracing::warn!("failed to clear persisted session: {e}");
                }
                self.state_tx.send_replace(SessionState::Anonymous);
                Ok(false)
            }
        }
    }

    /// Authenticate against the backend.
    ///
    /// Transient failures are retried up to [`MAX_LOGIN_ATTEMPTS`] with
    /// a fixed [`LOGIN_RETRY_DELAY`]; credential rejections (4xx) are
    /// surfaced immediately. On success the session is persisted and
    /// the state goes Active.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, CoreError> {
        let mut attempt = 1;
        loop {
            match self.gateway.login(username, password).await {
                Ok(response) => {
                    let session = Session {
                        token: response.access_token,
                        user: response.user,
                    };
                    self.token.set(&session.token);
                    if let Err(e) = self.storage.save(&session) {
                        tracing::warn!("failed to persist session: {e}");
                    }
                    tracing::debug!(username = %session.user.username, "logged in");
                    self.state_tx.send_replace(SessionState::Active(session.clone()));
                    return Ok(session);
                }
                Err(e) if e.is_transient() && attempt < MAX_LOGIN_ATTEMPTS => {
                    tracing::warn!(attempt, "login attempt failed, retrying: {e}");
                    attempt += 1;
                    tokio::time::sleep(LOGIN_RETRY_DELAY).await;
                }
                Err(e) => {
                    tracing::debug!(username = %username, "login rejected: {e}");
                    return Err(CoreError::LoginFailed(login_error_message(&e)));
                }
            }
        }
    }

    /// Clear the session everywhere. Never fails and touches no
    /// network; callable in any state.
    pub fn logout(&self) {
        self.token.clear();
        if let Err(e) = self.storage.clear() {
            tracing::warn!("failed to clear persisted session: {e}");
        }
        self.state_tx.send_replace(SessionState::Anonymous);
        tracing::debug!("logged out");
    }

    /// Downgrade an Active session whose token was rejected by an
    /// authenticated call. No-op when not Active, so a 401 from the
    /// login endpoint itself never lands here.
    pub fn handle_unauthorized(&self) {
        if self.is_active() {
            tracing::warn!("session token rejected by the backend, logging out");
            self.logout();
        }
    }
}

/// User-facing message for a failed login: server-provided when there
/// is one, generic otherwise.
fn login_error_message(error: &GatewayError) -> String {
    let message = match error {
        GatewayError::Unauthorized(m) | GatewayError::NotFound(m) => m.as_str(),
        GatewayError::Validation { message, .. } | GatewayError::Server { message, .. } => {
            message.as_str()
        }
        GatewayError::Network(_) | GatewayError::InvalidResponse(_) => "",
    };
    if message.is_empty() {
        "Login failed".to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path());
        assert!(storage.load().unwrap().is_none());

        let session = Session {
            token: "t1".into(),
            user: UserInfo {
                username: "admin".into(),
                role: "admin".into(),
                email: String::new(),
            },
        };
        storage.save(&session).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn login_error_message_prefers_server_text() {
        assert_eq!(
            login_error_message(&GatewayError::Unauthorized(
                "Incorrect username or password".into()
            )),
            "Incorrect username or password"
        );
        assert_eq!(
            login_error_message(&GatewayError::Unauthorized(String::new())),
            "Login failed"
        );
        assert_eq!(
            login_error_message(&GatewayError::InvalidResponse("bad json".into())),
            "Login failed"
        );
    }
}
