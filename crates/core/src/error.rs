//! Error taxonomy for backend interactions.

use thiserror::Error;

use crate::validate::ValidationError;

/// Generic message shown when the backend cannot be reached or replies
/// with something unusable. The underlying cause stays on the error for
/// logging but is never shown to the user.
pub const CONNECTIVITY_MESSAGE: &str =
    "Something went wrong. Check that the backend is running, reachable and returns valid JSON.";

/// Errors surfaced by the QKart API client and the flows built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected locally before any network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Backend rejected the request (4xx); the backend-provided message is
    /// surfaced verbatim.
    #[error("{message}")]
    Client {
        /// HTTP status code of the rejection.
        status: u16,
        /// Message from the backend response body.
        message: String,
    },

    /// Backend replied with a server error (5xx).
    #[error("server error: HTTP {status}")]
    Server {
        /// HTTP status code.
        status: u16,
    },

    /// Transport-level failure (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape the contract promises.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// The message to show the user. Validation and 4xx errors carry their
    /// own text; everything else collapses to the generic connectivity
    /// message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::Client { message, .. } => message.clone(),
            Self::Server { .. } | Self::Http(_) | Self::Parse(_) => {
                CONNECTIVITY_MESSAGE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_surfaces_backend_message_verbatim() {
        let err = ApiError::Client {
            status: 400,
            message: "Password is incorrect".to_string(),
        };
        assert_eq!(err.to_string(), "Password is incorrect");
        assert_eq!(err.user_message(), "Password is incorrect");
    }

    #[test]
    fn server_errors_collapse_to_the_generic_message() {
        let err = ApiError::Server { status: 500 };
        assert_eq!(err.to_string(), "server error: HTTP 500");
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn validation_errors_pass_their_message_through() {
        let err = ApiError::from(ValidationError::UsernameRequired);
        assert_eq!(err.user_message(), "Username is a required field");
    }

    #[test]
    fn parse_errors_are_suppressed_from_the_user() {
        let cause = serde_json::from_str::<Vec<i32>>("<html>").unwrap_err();
        let err = ApiError::from(cause);
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
    }
}
