//! Authentication endpoints.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{error_from_response, ApiClient};
use crate::error::ApiError;

#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful login payload from `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Username as confirmed by the backend.
    pub username: String,
    /// Wallet balance at login time.
    pub balance: i64,
}

impl ApiClient {
    /// Exchange credentials for a session token via `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// 4xx responses carry the backend message (e.g. "Password is
    /// incorrect"); transport and server failures map to the generic
    /// connectivity message.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        debug!(username, "logging in");
        let response = self
            .http()
            .post(self.url("/auth/login"))
            .json(&CredentialsBody { username, password })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_login(status, &body)
    }

    /// Create an account via `POST /auth/register`. A fresh account holds
    /// no session; the user logs in afterwards.
    ///
    /// # Errors
    ///
    /// Same surfacing rules as [`ApiClient::login`].
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        debug!(username, "registering");
        let response = self
            .http()
            .post(self.url("/auth/register"))
            .json(&CredentialsBody { username, password })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        interpret_register(status, &body)
    }
}

fn interpret_login(status: StatusCode, body: &str) -> Result<LoginResponse, ApiError> {
    if !status.is_success() {
        return Err(error_from_response(status, body));
    }
    Ok(serde_json::from_str(body)?)
}

fn interpret_register(status: StatusCode, body: &str) -> Result<(), ApiError> {
    if !status.is_success() {
        return Err(error_from_response(status, body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CONNECTIVITY_MESSAGE;

    #[test]
    fn login_parses_the_documented_success_payload() {
        let body = r#"{"success": true, "token": "testtoken", "username": "criodo", "balance": 5000}"#;
        let parsed = interpret_login(StatusCode::CREATED, body).expect("valid payload");
        assert_eq!(parsed.token, "testtoken");
        assert_eq!(parsed.username, "criodo");
        assert_eq!(parsed.balance, 5000);
    }

    #[test]
    fn login_surfaces_backend_rejections_verbatim() {
        let body = r#"{"success": false, "message": "Password is incorrect"}"#;
        let err = interpret_login(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.user_message(), "Password is incorrect");
    }

    #[test]
    fn login_hides_malformed_bodies_behind_the_generic_message() {
        let err = interpret_login(StatusCode::CREATED, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        assert_eq!(err.user_message(), CONNECTIVITY_MESSAGE);
    }

    #[test]
    fn register_accepts_a_bare_success_body() {
        assert!(interpret_register(StatusCode::CREATED, r#"{"success": true}"#).is_ok());
    }

    #[test]
    fn register_surfaces_duplicate_username_message() {
        let body = r#"{"success": false, "message": "Username is already taken"}"#;
        let err = interpret_register(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.user_message(), "Username is already taken");
    }
}
