//! Session state driven by an external identity provider.
//!
//! The provider (a popup sign-in flow in the browser, a local profile file
//! in the CLI) is behind the [`IdentityGateway`] trait. State transitions
//! are driven only by gateway notifications: `sign_in()` asks the gateway
//! to run its flow, and the resulting notification moves the state, never
//! the call result itself.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

/// Identity claims for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

/// The session as screens see it. `Indeterminate` means the provider has
/// not yet reported anything; protected content must not render in it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Indeterminate,
    SignedOut,
    SignedIn(Identity),
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SessionState::SignedIn(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::SignedIn(identity) => Some(identity),
            _ => None,
        }
    }
}

/// What the upstream provider currently reports. `Unknown` until the
/// provider has restored (or failed to restore) the session once.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProviderStatus {
    #[default]
    Unknown,
    Session(Option<Identity>),
}

// ==================== Ошибки аутентификации ====================

/// Sign-in failures, each with its own user-facing message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    #[error("Sign-in window was closed before completing")]
    PopupClosed,

    #[error("Sign-in popup was blocked by the browser")]
    PopupBlocked,

    #[error("This domain is not authorized for sign-in")]
    UnauthorizedOrigin,

    #[error("Sign-in with this provider is disabled")]
    ProviderDisabled,

    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Map the provider's error codes onto the categorized variants;
    /// anything unrecognized keeps the upstream message verbatim.
    pub fn from_provider(code: &str, message: &str) -> Self {
        match code {
            "auth/popup-closed-by-user" | "auth/cancelled-popup-request" => AuthError::PopupClosed,
            "auth/popup-blocked" => AuthError::PopupBlocked,
            "auth/unauthorized-domain" => AuthError::UnauthorizedOrigin,
            "auth/operation-not-allowed" => AuthError::ProviderDisabled,
            _ => AuthError::Other(message.to_string()),
        }
    }
}

// ==================== Шлюз провайдера ====================

/// Seam to the external identity provider.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Run the interactive sign-in flow. The new session arrives through
    /// [`IdentityGateway::subscribe`], not through the return value.
    async fn sign_in(&self) -> Result<(), AuthError>;

    /// Request session termination upstream.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Current provider status plus every subsequent change.
    fn subscribe(&self) -> watch::Receiver<ProviderStatus>;
}

// ==================== Провайдер сессии ====================

/// Re-publishes gateway notifications as [`SessionState`] transitions.
pub struct SessionProvider {
    gateway: Arc<dyn IdentityGateway>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionProvider {
    pub fn new(gateway: Arc<dyn IdentityGateway>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Indeterminate);

        let mut provider_rx = gateway.subscribe();
        let tx = state_tx.clone();
        tokio::spawn(async move {
            loop {
                let next = match provider_rx.borrow_and_update().clone() {
                    ProviderStatus::Unknown => SessionState::Indeterminate,
                    ProviderStatus::Session(None) => SessionState::SignedOut,
                    ProviderStatus::Session(Some(identity)) => SessionState::SignedIn(identity),
                };
                // send_replace: the state must advance even while nobody
                // is subscribed yet
                tx.send_replace(next);
                if provider_rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { gateway, state_tx }
    }

    /// Current state; starts `Indeterminate`.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub async fn sign_in(&self) -> Result<(), AuthError> {
        tracing::debug!("starting interactive sign-in");
        self.gateway.sign_in().await
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        tracing::debug!("requesting sign-out");
        self.gateway.sign_out().await
    }
}

// ==================== Локальный шлюз ====================

/// Development gateway that keeps the session as a JSON profile file,
/// standing in for the browser popup flow. Signing in writes the
/// configured account to disk; signing out removes it.
pub struct FileGateway {
    path: PathBuf,
    account: Option<Identity>,
    status_tx: watch::Sender<ProviderStatus>,
}

impl FileGateway {
    pub fn new(path: impl Into<PathBuf>, account: Option<Identity>) -> Self {
        let path = path.into();
        let restored = Self::read_profile(&path);
        let (status_tx, _) = watch::channel(ProviderStatus::Session(restored));
        Self {
            path,
            account,
            status_tx,
        }
    }

    fn read_profile(path: &PathBuf) -> Option<Identity> {
        let contents = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

#[async_trait]
impl IdentityGateway for FileGateway {
    async fn sign_in(&self) -> Result<(), AuthError> {
        let account = self
            .account
            .clone()
            .ok_or_else(|| AuthError::Other("No local account configured".to_string()))?;

        let contents = serde_json::to_string_pretty(&account)
            .map_err(|e| AuthError::Other(e.to_string()))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| AuthError::Other(e.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Ok(metadata) = std::fs::metadata(&self.path) {
                let mut perms = metadata.permissions();
                perms.set_mode(0o600);
                let _ = std::fs::set_permissions(&self.path, perms);
            }
        }

        let _ = self.status_tx.send(ProviderStatus::Session(Some(account)));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AuthError::Other(e.to_string())),
        }
        let _ = self.status_tx.send(ProviderStatus::Session(None));
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<ProviderStatus> {
        self.status_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn identity(name: &str) -> Identity {
        Identity {
            display_name: name.to_string(),
            email: format!("{}@example.com", name),
            photo_url: None,
        }
    }

    /// Gateway whose notifications the test controls directly.
    struct ScriptedGateway {
        status_tx: watch::Sender<ProviderStatus>,
        sign_in_result: Result<Option<Identity>, AuthError>,
    }

    impl ScriptedGateway {
        fn new(sign_in_result: Result<Option<Identity>, AuthError>) -> Self {
            let (status_tx, _) = watch::channel(ProviderStatus::Unknown);
            Self {
                status_tx,
                sign_in_result,
            }
        }

        fn publish(&self, session: Option<Identity>) {
            let _ = self.status_tx.send(ProviderStatus::Session(session));
        }
    }

    #[async_trait]
    impl IdentityGateway for ScriptedGateway {
        async fn sign_in(&self) -> Result<(), AuthError> {
            match &self.sign_in_result {
                Ok(session) => {
                    self.publish(session.clone());
                    Ok(())
                }
                Err(e) => Err(e.clone()),
            }
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.publish(None);
            Ok(())
        }

        fn subscribe(&self) -> watch::Receiver<ProviderStatus> {
            self.status_tx.subscribe()
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<SessionState>,
        expected: impl Fn(&SessionState) -> bool,
    ) -> SessionState {
        timeout(Duration::from_secs(1), rx.wait_for(|s| expected(s)))
            .await
            .expect("timed out waiting for session state")
            .expect("session provider dropped")
            .clone()
    }

    #[tokio::test]
    async fn starts_indeterminate_then_follows_first_notification() {
        let gateway = Arc::new(ScriptedGateway::new(Ok(None)));
        let provider = SessionProvider::new(gateway.clone());

        assert_eq!(provider.state(), SessionState::Indeterminate);

        let mut rx = provider.subscribe();
        gateway.publish(None);
        let state = wait_for(&mut rx, |s| *s == SessionState::SignedOut).await;
        assert_eq!(state, SessionState::SignedOut);
    }

    #[tokio::test]
    async fn sign_in_transitions_via_notification() {
        let gateway = Arc::new(ScriptedGateway::new(Ok(Some(identity("jane")))));
        let provider = SessionProvider::new(gateway.clone());
        let mut rx = provider.subscribe();

        gateway.publish(None);
        wait_for(&mut rx, |s| *s == SessionState::SignedOut).await;

        provider.sign_in().await.unwrap();
        let state = wait_for(&mut rx, |s| s.is_signed_in()).await;
        assert_eq!(state.identity().unwrap().display_name, "jane");

        provider.sign_out().await.unwrap();
        wait_for(&mut rx, |s| *s == SessionState::SignedOut).await;
    }

    #[tokio::test]
    async fn dismissed_popup_is_a_distinct_error() {
        let gateway = Arc::new(ScriptedGateway::new(Err(AuthError::PopupClosed)));
        let provider = SessionProvider::new(gateway);

        let err = provider.sign_in().await.unwrap_err();
        assert_eq!(err, AuthError::PopupClosed);
        assert_eq!(
            err.to_string(),
            "Sign-in window was closed before completing"
        );
        assert_ne!(err.to_string(), AuthError::Other("failed".into()).to_string());
    }

    #[test]
    fn provider_codes_map_to_categories() {
        assert_eq!(
            AuthError::from_provider("auth/popup-closed-by-user", "x"),
            AuthError::PopupClosed
        );
        assert_eq!(
            AuthError::from_provider("auth/popup-blocked", "x"),
            AuthError::PopupBlocked
        );
        assert_eq!(
            AuthError::from_provider("auth/unauthorized-domain", "x"),
            AuthError::UnauthorizedOrigin
        );
        assert_eq!(
            AuthError::from_provider("auth/operation-not-allowed", "x"),
            AuthError::ProviderDisabled
        );
        assert_eq!(
            AuthError::from_provider("auth/network-request-failed", "network down"),
            AuthError::Other("network down".to_string())
        );
    }

    #[tokio::test]
    async fn file_gateway_round_trips_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let gateway = Arc::new(FileGateway::new(&path, Some(identity("local"))));
        let provider = SessionProvider::new(gateway.clone());
        let mut rx = provider.subscribe();

        wait_for(&mut rx, |s| *s == SessionState::SignedOut).await;

        provider.sign_in().await.unwrap();
        wait_for(&mut rx, |s| s.is_signed_in()).await;
        assert!(path.exists());

        // a fresh gateway restores the persisted session
        let restored = FileGateway::new(&path, None);
        assert_eq!(
            *restored.subscribe().borrow(),
            ProviderStatus::Session(Some(identity("local")))
        );

        provider.sign_out().await.unwrap();
        wait_for(&mut rx, |s| *s == SessionState::SignedOut).await;
        assert!(!path.exists());
    }
}
