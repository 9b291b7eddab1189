//! Identity service contract
//!
//! The identity provider hands out anonymous sessions whose mutable
//! display-name field carries the study token. Auth-state changes
//! (sign-in, session restore, sign-out) are observed through a `watch`
//! subscription; handlers racing that subscription against user actions is
//! exactly the ordering hazard the controllers have to tolerate.

use crate::error::IdentityError;
use parking_lot::RwLock;
use tokio::sync::watch;

/// An authenticated (anonymous) session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider-assigned user id
    pub uid: String,
    /// Mutable display name; the flow stores the study token here
    pub display_name: Option<String>,
}

impl Session {
    /// Study token carried in the display name, if any
    #[inline]
    #[must_use]
    pub fn study_token(&self) -> Option<&str> {
        self.display_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Auth-state snapshot delivered through the subscription
pub type AuthState = Option<Session>;

/// Identity provider contract
#[async_trait::async_trait]
pub trait Identity: Send + Sync + std::fmt::Debug {
    /// Sign in anonymously, creating a session if none exists
    async fn sign_in_anonymously(&self) -> Result<Session, IdentityError>;

    /// Current session, if one is established
    fn current(&self) -> AuthState;

    /// Set the display name of the current session
    async fn set_display_name(&self, name: &str) -> Result<(), IdentityError>;

    /// Subscribe to auth-state changes; the receiver holds the latest state
    fn watch(&self) -> watch::Receiver<AuthState>;
}

/// Wait for an authenticated session, bounded
///
/// The auth-state subscription may fire only after the page has loaded
/// (session restore), so an immediate miss is retried through the watch
/// channel for at most `wait` before giving up with `None`. Callers treat
/// `None` as "not signed in" and fall back to rendering rather than block
/// indefinitely on the provider.
pub async fn await_session(identity: &dyn Identity, wait: std::time::Duration) -> AuthState {
    if let Some(session) = identity.current() {
        return Some(session);
    }
    let mut rx = identity.watch();
    let waited = tokio::time::timeout(wait, async {
        loop {
            if rx.changed().await.is_err() {
                return None;
            }
            let state = rx.borrow_and_update().clone();
            if state.is_some() {
                return state;
            }
        }
    })
    .await;
    waited.ok().flatten()
}

/// Deterministic in-memory identity provider
#[derive(Debug)]
pub struct MemoryIdentity {
    session: RwLock<AuthState>,
    tx: watch::Sender<AuthState>,
    /// When set, sign-in fails with this reason
    deny_sign_in: RwLock<Option<String>>,
    counter: RwLock<u64>,
}

impl MemoryIdentity {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            session: RwLock::new(None),
            tx,
            deny_sign_in: RwLock::new(None),
            counter: RwLock::new(0),
        }
    }

    /// Refuse subsequent sign-ins (missing-identity tests)
    pub fn deny_sign_in(&self, reason: impl Into<String>) {
        *self.deny_sign_in.write() = Some(reason.into());
    }

    /// Drop the current session, as a provider-side sign-out would
    pub fn sign_out(&self) {
        *self.session.write() = None;
        let _ = self.tx.send(None);
    }

    /// Restore a pre-existing session, as the provider does on page load
    pub fn restore(&self, session: Session) {
        *self.session.write() = Some(session.clone());
        let _ = self.tx.send(Some(session));
    }
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Identity for MemoryIdentity {
    async fn sign_in_anonymously(&self) -> Result<Session, IdentityError> {
        if let Some(reason) = self.deny_sign_in.read().clone() {
            return Err(IdentityError::SignInFailed(reason));
        }
        if let Some(existing) = self.session.read().clone() {
            return Ok(existing);
        }
        let uid = {
            let mut counter = self.counter.write();
            *counter += 1;
            format!("anon-{counter}")
        };
        let session = Session {
            uid,
            display_name: None,
        };
        *self.session.write() = Some(session.clone());
        let _ = self.tx.send(Some(session.clone()));
        tracing::debug!(uid = %session.uid, "anonymous sign-in");
        Ok(session)
    }

    fn current(&self) -> AuthState {
        self.session.read().clone()
    }

    async fn set_display_name(&self, name: &str) -> Result<(), IdentityError> {
        let mut guard = self.session.write();
        let session = guard.as_mut().ok_or(IdentityError::NoSession)?;
        session.display_name = Some(name.to_string());
        let updated = session.clone();
        drop(guard);
        let _ = self.tx.send(Some(updated));
        Ok(())
    }

    fn watch(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }
}
