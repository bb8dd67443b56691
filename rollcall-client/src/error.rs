//! Gateway error types

use thiserror::Error;

/// Normalized error for every backend operation.
///
/// HTTP status classes map onto variants; transport failures carry no
/// status at all. The message is taken from the server's error body
/// (`detail` or `message` field) when one exists.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response at all (DNS, connect, timeout, broken transfer)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401 - missing, expired or rejected credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 404 on a lookup
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other 4xx (400 conflict, 422 field validation, ...)
    #[error("validation error ({status}): {message}")]
    Validation { status: u16, message: String },

    /// 5xx
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 2xx with a body we could not decode
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// HTTP status code, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Network(_) | GatewayError::InvalidResponse(_) => None,
            GatewayError::Unauthorized(_) => Some(401),
            GatewayError::NotFound(_) => Some(404),
            GatewayError::Validation { status, .. } | GatewayError::Server { status, .. } => {
                Some(*status)
            }
        }
    }

    /// Whether a retry could plausibly succeed (network / 5xx).
    ///
    /// Credential rejections and validation failures are not transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Server { .. })
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
