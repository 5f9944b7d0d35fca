//! Persisted session state.
//!
//! The single session provider for the whole client: an in-memory handle
//! over the JSON document persisted between runs. Written only by login
//! and logout; everything else reads through the shared handle.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{api::ApiClient, error::ApiError, models::Session, validate};

/// File under the user config root holding the persisted session.
const SESSION_FILE: &str = "session.json";

/// Shared handle over the current session. Cheap to clone; clones share
/// state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Create a store persisting to the given file, restoring any session
    /// already on disk. An unreadable file is discarded with a warning;
    /// the user simply logs in again.
    pub fn new(api: ApiClient, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_session(&path) {
            Ok(session) => session,
            Err(err) => {
                warn!("Discarding unreadable session file {}: {err:#}", path.display());
                None
            }
        };
        Self {
            inner: Arc::new(Inner {
                api,
                path,
                current: RwLock::new(current),
            }),
        }
    }

    /// Default session file under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::config::CONFIG_DIR)
            .join(SESSION_FILE)
    }

    /// Current session, if logged in.
    pub fn current(&self) -> Option<Session> {
        self.inner.current.read().clone()
    }

    /// Bearer token of the current session, if any.
    pub fn token(&self) -> Option<String> {
        self.inner.current.read().as_ref().map(|s| s.token.clone())
    }

    /// Whether a user is logged in.
    pub fn is_authenticated(&self) -> bool {
        self.inner.current.read().is_some()
    }

    /// Validate locally, then exchange credentials via the backend. On
    /// success the session is persisted and becomes current.
    ///
    /// # Errors
    ///
    /// Validation failures never reach the network; 4xx responses carry
    /// the backend message; other failures map to the generic
    /// connectivity message.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        validate::validate_login(username, password)?;
        let response = self.inner.api.login(username, password).await?;
        let session = Session {
            token: response.token,
            username: response.username,
            balance: response.balance,
            logged_in_at: Utc::now(),
        };
        if let Err(err) = write_session(&self.inner.path, &session) {
            // A session that outlives the process is a convenience, not a
            // requirement; the login itself succeeded.
            warn!("Failed to persist session: {err:#}");
        }
        info!(username = %session.username, "logged in");
        *self.inner.current.write() = Some(session.clone());
        Ok(session)
    }

    /// Validate locally, then create an account via the backend. Never
    /// persists a session; the user logs in afterwards.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), ApiError> {
        validate::validate_register(username, password, confirm_password)?;
        self.inner.api.register(username, password).await?;
        info!(username, "registered");
        Ok(())
    }

    /// Clear the in-memory and persisted session unconditionally.
    /// Idempotent: logging out twice is fine.
    pub fn logout(&self) {
        *self.inner.current.write() = None;
        if let Err(err) = remove_session(&self.inner.path) {
            warn!("Failed to remove session file: {err:#}");
        }
        info!("logged out");
    }
}

fn read_session(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let session = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(session))
}

fn write_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialized = serde_json::to_vec_pretty(session)?;
    fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))
}

fn remove_session(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to remove {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tempfile::tempdir;

    fn offline_client() -> ApiClient {
        let config = AppConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 1,
            search_debounce_ms: 500,
            session_file: None,
        };
        ApiClient::new(&config).expect("client builds")
    }

    fn sample_session() -> Session {
        Session {
            token: "testtoken".to_string(),
            username: "criodo".to_string(),
            balance: 5000,
            logged_in_at: Utc::now(),
        }
    }

    #[test]
    fn session_round_trips_through_disk() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        write_session(&path, &sample_session())?;

        let store = SessionStore::new(offline_client(), &path);
        let restored = store.current().expect("session restored");
        assert_eq!(restored.username, "criodo");
        assert_eq!(restored.balance, 5000);
        assert_eq!(store.token().as_deref(), Some("testtoken"));
        assert!(store.is_authenticated());
        Ok(())
    }

    #[test]
    fn logout_clears_disk_and_memory_and_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        write_session(&path, &sample_session())?;

        let store = SessionStore::new(offline_client(), &path);
        store.logout();
        assert!(!store.is_authenticated());
        assert!(!path.exists());

        // Second logout with nothing to remove.
        store.logout();
        assert!(store.current().is_none());
        Ok(())
    }

    #[test]
    fn corrupt_session_file_starts_as_guest() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all")?;

        let store = SessionStore::new(offline_client(), &path);
        assert!(store.current().is_none());
        assert!(store.token().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_login_input_never_reaches_the_network() {
        let dir = tempdir().expect("tempdir");
        let store = SessionStore::new(offline_client(), dir.path().join("session.json"));

        // The endpoint is unreachable, so any network attempt would error
        // with an HTTP failure instead of a validation failure.
        let err = store.login("abc", "secret123").await.unwrap_err();
        assert_eq!(err.user_message(), "Username must be at least 6 characters");

        let err = store
            .register("crio-user", "abcdef", "abcdee")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Passwords do not match");
    }
}
