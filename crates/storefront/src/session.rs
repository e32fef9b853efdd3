//! Session gate: authentication state derived from a persisted token.
//!
//! Exactly one opaque token is persisted under a well-known location. The
//! gate mirrors its presence as an in-memory [`AuthState`] that the
//! navigation controller consumes. Presence checks are cheap and idempotent;
//! a failing store reads as unauthenticated (fail closed), never as a
//! permanently unknown state.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the token store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage is unavailable or failed.
    #[error("token storage unavailable: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent storage for the single session token.
///
/// This is the seam to the platform's key-value storage. Implementations
/// must treat "no token stored" as `Ok(None)`, reserving errors for storage
/// that is actually unavailable.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    async fn load(&self) -> Result<Option<SecretString>, StoreError>;

    /// Persist the token, replacing any previous one.
    async fn save(&self, token: &SecretString) -> Result<(), StoreError>;

    /// Remove the stored token. Removing an absent token is not an error.
    async fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// Token store implementations
// =============================================================================

/// File-backed token store: one token in one file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<SecretString>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_owned())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn save(&self, token: &SecretString) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token.expose_secret()).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// In-memory token store for tests and platforms without durable storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a token.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_owned())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<SecretString>, StoreError> {
        Ok(self.lock().clone().map(SecretString::from))
    }

    async fn save(&self, token: &SecretString) -> Result<(), StoreError> {
        *self.lock() = Some(token.expose_secret().to_owned());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.lock() = None;
        Ok(())
    }
}

// =============================================================================
// Session gate
// =============================================================================

/// Authentication state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Token presence has not been checked yet (cold start).
    #[default]
    Unknown,
    /// No token is present.
    Unauthenticated,
    /// A token is present.
    Authenticated,
}

impl AuthState {
    /// Whether this state counts as authenticated.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Gate deriving the authenticated flag from token presence.
///
/// Cheaply cloneable; all clones share the same state and store.
#[derive(Clone)]
pub struct SessionGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    store: Arc<dyn TokenStore>,
    state: Mutex<AuthState>,
}

impl SessionGate {
    /// Create a gate over a token store. The state starts [`AuthState::Unknown`].
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(GateInner {
                store,
                state: Mutex::new(AuthState::Unknown),
            }),
        }
    }

    /// Current state without touching storage.
    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.lock_state()
    }

    /// Whether the session is currently authenticated.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Resolve the initial `Unknown` state by reading token presence.
    ///
    /// A storage failure resolves to `Unauthenticated` (fail closed) rather
    /// than leaving the gate unknown forever.
    pub async fn resolve(&self) -> AuthState {
        let state = self.read_presence().await;
        *self.lock_state() = state;
        state
    }

    /// Re-read token presence and update the state.
    ///
    /// Cheap and idempotent; meant to run after every navigation state
    /// change. Returns whether the authenticated flag actually changed so
    /// callers can avoid redundant remounts.
    pub async fn recheck(&self) -> bool {
        let next = self.read_presence().await;
        let mut state = self.lock_state();
        let changed = state.is_authenticated() != next.is_authenticated()
            || matches!(*state, AuthState::Unknown);
        *state = next;
        changed
    }

    /// Persist a freshly issued token and mark the session authenticated.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the token cannot be persisted; the state
    /// is left untouched in that case.
    pub async fn establish(&self, token: SecretString) -> Result<(), StoreError> {
        self.inner.store.save(&token).await?;
        *self.lock_state() = AuthState::Authenticated;
        debug!("session established");
        Ok(())
    }

    /// Clear the persisted token and mark the session unauthenticated.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the token cannot be removed.
    pub async fn clear_session(&self) -> Result<(), StoreError> {
        self.inner.store.clear().await?;
        *self.lock_state() = AuthState::Unauthenticated;
        debug!("session cleared");
        Ok(())
    }

    async fn read_presence(&self) -> AuthState {
        match self.inner.store.load().await {
            Ok(Some(_)) => AuthState::Authenticated,
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                // Fail closed: unreadable storage never grants access.
                warn!(error = %e, "token store unreadable, treating as unauthenticated");
                AuthState::Unauthenticated
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Store whose reads always fail, for the fail-closed path.
    struct BrokenStore;

    #[async_trait]
    impl TokenStore for BrokenStore {
        async fn load(&self) -> Result<Option<SecretString>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("storage offline")))
        }

        async fn save(&self, _token: &SecretString) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("storage offline")))
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("storage offline")))
        }
    }

    #[tokio::test]
    async fn test_resolve_without_token_is_unauthenticated() {
        let gate = SessionGate::new(Arc::new(MemoryTokenStore::new()));
        assert_eq!(gate.state(), AuthState::Unknown);
        assert_eq!(gate.resolve().await, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_resolve_with_token_is_authenticated() {
        let gate = SessionGate::new(Arc::new(MemoryTokenStore::with_token("tok")));
        assert_eq!(gate.resolve().await, AuthState::Authenticated);
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn test_storage_failure_fails_closed() {
        let gate = SessionGate::new(Arc::new(BrokenStore));
        assert_eq!(gate.resolve().await, AuthState::Unauthenticated);
        assert_ne!(gate.state(), AuthState::Unknown);
    }

    #[tokio::test]
    async fn test_establish_persists_and_authenticates() {
        let store = Arc::new(MemoryTokenStore::new());
        let gate = SessionGate::new(store.clone());
        gate.resolve().await;

        gate.establish(SecretString::from("tok".to_owned()))
            .await
            .unwrap();
        assert!(gate.is_authenticated());
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_establish_failure_leaves_state_untouched() {
        let gate = SessionGate::new(Arc::new(BrokenStore));
        gate.resolve().await;

        let result = gate.establish(SecretString::from("tok".to_owned())).await;
        assert!(result.is_err());
        assert!(!gate.is_authenticated());
    }

    #[tokio::test]
    async fn test_recheck_reports_changes_only() {
        let store = Arc::new(MemoryTokenStore::new());
        let gate = SessionGate::new(store.clone());
        gate.resolve().await;

        // No change: still unauthenticated.
        assert!(!gate.recheck().await);

        // External token arrival flips the flag.
        store
            .save(&SecretString::from("tok".to_owned()))
            .await
            .unwrap();
        assert!(gate.recheck().await);
        assert!(gate.is_authenticated());

        // Idempotent re-read.
        assert!(!gate.recheck().await);
    }

    #[tokio::test]
    async fn test_clear_session_logs_out() {
        let store = Arc::new(MemoryTokenStore::with_token("tok"));
        let gate = SessionGate::new(store.clone());
        gate.resolve().await;
        assert!(gate.is_authenticated());

        gate.clear_session().await.unwrap();
        assert!(!gate.is_authenticated());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("doorstep-test-{}", std::process::id()));
        let store = FileTokenStore::new(dir.join("token"));

        assert!(store.load().await.unwrap().is_none());

        store
            .save(&SecretString::from("tok".to_owned()))
            .await
            .unwrap();
        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), "tok");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing an absent token is fine.
        store.clear().await.unwrap();

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
