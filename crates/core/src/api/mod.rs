//! QKart backend REST client.
//!
//! Thin `reqwest` wrapper with a client-wide timeout; a request that hangs
//! degrades into the generic connectivity error instead of leaving the UI
//! loading forever. Interpretation of each response (status plus body into
//! a typed result) lives in free functions per endpoint so it can be unit
//! tested without a live backend.

mod auth;
mod cart;
mod catalog;

pub use auth::LoginResponse;
pub use catalog::SearchOutcome;

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{config::AppConfig, error::ApiError};

/// Client for the QKart backend REST API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: Client,
    endpoint: String,
}

impl ApiClient {
    /// Build a client against the configured endpoint.
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.endpoint)
    }

    fn http(&self) -> &Client {
        &self.inner.client
    }
}

/// Error body shape shared by every failing endpoint:
/// `{"success": false, "message": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Map a non-success response onto the error taxonomy: 4xx surfaces the
/// backend message verbatim, everything else is a server error that users
/// see as the generic connectivity message.
fn error_from_response(status: StatusCode, body: &str) -> ApiError {
    if status.is_client_error() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|parsed| parsed.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("Request failed with HTTP {}", status.as_u16()));
        ApiError::Client {
            status: status.as_u16(),
            message,
        }
    } else {
        ApiError::Server {
            status: status.as_u16(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_uses_backend_message() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            r#"{"success": false, "message": "Username is already taken"}"#,
        );
        match err {
            ApiError::Client { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Username is already taken");
            }
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[test]
    fn client_error_without_body_falls_back_to_status_text() {
        let err = error_from_response(StatusCode::FORBIDDEN, "");
        assert_eq!(err.to_string(), "Request failed with HTTP 403");
    }

    #[test]
    fn server_error_ignores_the_body() {
        let err = error_from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"success": false, "message": "Something went wrong. Check the backend console for more details"}"#,
        );
        assert!(matches!(err, ApiError::Server { status: 500 }));
    }
}
