//! Core error types

use crate::export::ExportError;
use crate::session::StorageError;
use rollcall_client::GatewayError;
use thiserror::Error;

/// Error type for core operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend call failed
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Session persistence failed
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),

    /// Login rejected after exhausting retries, with the user-facing message
    #[error("{0}")]
    LoginFailed(String),

    /// Export implementation failed or declined the format
    #[error(transparent)]
    Export(#[from] ExportError),
}
