//! HTTP plumbing for the attendance backend
//!
//! Thin wrapper over `reqwest` that attaches the current bearer token,
//! renders query parameters and normalizes every non-2xx response into
//! a [`GatewayError`].

use crate::{GatewayConfig, GatewayError, GatewayResult, TokenCell};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client for making network requests to the backend
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: TokenCell,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &GatewayConfig, token: TokenCell) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Read-only handle to the token cell
    pub fn token(&self) -> &TokenCell {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.get().map(|t| format!("Bearer {t}"))
    }

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> GatewayResult<T> {
        let mut request = self.client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let mut request = self.client.post(self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let mut request = self.client.put(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let mut request = self.client.delete(self.url(path));
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text)
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

            return Err(match status {
                StatusCode::UNAUTHORIZED => GatewayError::Unauthorized(message),
                StatusCode::NOT_FOUND => GatewayError::NotFound(message),
                s if s.is_client_error() => GatewayError::Validation {
                    status: s.as_u16(),
                    message,
                },
                s => GatewayError::Server {
                    status: s.as_u16(),
                    message,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend is FastAPI-shaped (`{"detail": ...}`), but `message` is
/// accepted too. Structured `detail` values (422 field errors) are kept
/// as compact JSON.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail").or_else(|| value.get("message"))?;
    let message = match detail {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if message.is_empty() { None } else { Some(message) }
}
