//! Gateway configuration

/// Environment variable selecting the backend base URL
pub const BACKEND_URL_ENV: &str = "ROLLCALL_BACKEND_URL";

const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Configuration for connecting to the attendance backend
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Server base URL (e.g., "http://localhost:8001")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl GatewayConfig {
    /// Create a new configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
        }
    }

    /// Read the base URL from `ROLLCALL_BACKEND_URL`, falling back to
    /// the local default
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BACKEND_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
