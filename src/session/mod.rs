//! Session management.
//!
//! [`SessionManager`] is the single source of truth for "is the current
//! user authenticated" and "what are the user's claims". It owns the bearer
//! token lifecycle end to end: decode, validate, expire, store, clear.
//!
//! The manager is fail-closed: a token that cannot be decoded, or whose
//! expiry has passed, is treated exactly like an absent token and is
//! deleted from storage on sight (lazy cleanup), so one bad token never
//! causes repeated failure loops.

pub mod store;
pub mod token;

use chrono::Utc;
use tracing::{info, warn};

use crate::context::ClientContext;
use store::{KEY_TOKEN, KEY_USER_ID, StoreResult};
use token::{Claims, TokenDecode, decode_claims};

/// How close to expiry a token is considered "expiring soon", in seconds.
pub const EXPIRY_WARNING_SECS: i64 = 300;

/// Authentication state of the logical session.
///
/// Transitions: login or signup success moves to `Authenticated`; explicit
/// logout, a 401 response, or local expiry detection moves back to
/// `Unauthenticated`. Re-authentication always re-enters via login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable token is stored.
    Unauthenticated,
    /// A structurally valid, unexpired token is stored.
    Authenticated,
}

/// The authentication predicate and token lifecycle owner.
///
/// All storage access goes through the context's [`store::TokenStore`];
/// the manager is the sole writer of the session keys.
#[derive(Clone)]
pub struct SessionManager {
    context: ClientContext,
}

impl SessionManager {
    /// Create a manager over the given context.
    pub fn new(context: ClientContext) -> Self {
        Self { context }
    }

    /// The shared context this manager operates on.
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// The stored token, or `None` when absent or blank.
    ///
    /// Storage read failures are logged and treated as "no token".
    pub async fn token(&self) -> Option<String> {
        self.stored_token().await
    }

    /// Store a new bearer token.
    ///
    /// Empty or whitespace-only input is rejected as a logged no-op, so a
    /// bad login response can never wipe a working session. Otherwise the
    /// trimmed value is stored and the redirect latch is re-armed.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backing store cannot be written.
    pub async fn set_token(&self, token: &str) -> StoreResult<()> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            warn!("ignoring attempt to store an empty token");
            return Ok(());
        }
        self.context.store().set(KEY_TOKEN, trimmed).await?;
        self.context.arm_redirect();
        Ok(())
    }

    /// Delete the stored token. Idempotent; storage failures are logged
    /// and swallowed.
    pub async fn remove_token(&self) {
        if let Err(e) = self.context.store().remove(KEY_TOKEN).await {
            warn!(error = %e, "token removal failed");
        }
    }

    /// Whether the current session is authenticated.
    ///
    /// False when no token is stored, the token fails structural decode,
    /// or its expiry is at or past the current time (whole seconds; the
    /// boundary counts as expired). Invalid and expired tokens are removed
    /// from storage as a side effect.
    pub async fn is_authenticated(&self) -> bool {
        let Some(stored) = self.stored_token().await else {
            return false;
        };
        match decode_claims(&stored) {
            TokenDecode::Decoded(claims) => {
                if claims.is_expired(Utc::now().timestamp()) {
                    info!("stored token is expired; clearing it");
                    self.remove_token().await;
                    false
                } else {
                    true
                }
            }
            TokenDecode::Invalid(failure) => {
                warn!(%failure, "removing undecodable stored token");
                self.remove_token().await;
                false
            }
        }
    }

    /// Decoded claims of the stored token, or `None`.
    ///
    /// Pure read: expired tokens still yield their claims here, and
    /// nothing is removed. Use [`is_authenticated`](Self::is_authenticated)
    /// for the validity decision.
    pub async fn user_info(&self) -> Option<Claims> {
        let token = self.stored_token().await?;
        decode_claims(&token).into_claims()
    }

    /// Whether the stored token expires within [`EXPIRY_WARNING_SECS`].
    ///
    /// False when no token is stored, it cannot be decoded, or it carries
    /// no expiry.
    pub async fn is_token_expiring_soon(&self) -> bool {
        match self.user_info().await {
            Some(claims) => claims.expires_within(Utc::now().timestamp(), EXPIRY_WARNING_SECS),
            None => false,
        }
    }

    /// The persisted owner id, or `None`.
    pub async fn user_id(&self) -> Option<String> {
        match self.context.store().get(KEY_USER_ID).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "user id read failed; treating as absent");
                None
            }
        }
    }

    /// Persist the owner id alongside the token.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backing store cannot be written.
    pub async fn set_user_id(&self, user_id: &str) -> StoreResult<()> {
        self.context.store().set(KEY_USER_ID, user_id).await
    }

    /// Delete the persisted owner id. Idempotent; failures are logged and
    /// swallowed.
    pub async fn remove_user_id(&self) {
        if let Err(e) = self.context.store().remove(KEY_USER_ID).await {
            warn!(error = %e, "user id removal failed");
        }
    }

    /// Clear the whole session and fire the logout hooks.
    ///
    /// Never errors; cleanup is best-effort and logged.
    pub async fn logout(&self) {
        self.remove_token().await;
        self.remove_user_id().await;
        self.context.notify_logout();
        info!("session cleared");
    }

    /// Current state of the session, derived from
    /// [`is_authenticated`](Self::is_authenticated).
    pub async fn state(&self) -> SessionState {
        if self.is_authenticated().await {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    async fn stored_token(&self) -> Option<String> {
        match self.context.store().get(KEY_TOKEN).await {
            Ok(Some(token)) if !token.trim().is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "token read failed; treating as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use store::TokenStore;

    fn manager() -> SessionManager {
        SessionManager::new(ClientContext::in_memory())
    }

    fn token_with_exp(exp: i64) -> String {
        let payload = serde_json::json!({"sub": "user-1", "email": "a@b.test", "exp": exp});
        format!("hdr.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    fn token_without_exp() -> String {
        let payload = serde_json::json!({"sub": "user-1"});
        format!("hdr.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    #[tokio::test]
    async fn no_token_is_unauthenticated() {
        let session = manager();
        assert!(!session.is_authenticated().await);
        assert_eq!(session.state().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn malformed_token_is_removed() {
        let session = manager();
        let store = session.context().store();
        store.set(KEY_TOKEN, "not-a-token").await.expect("set");

        assert!(!session.is_authenticated().await);
        assert!(store.get(KEY_TOKEN).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn expired_token_is_removed() {
        let session = manager();
        let store = session.context().store();
        let expired = token_with_exp(Utc::now().timestamp() - 1);
        store.set(KEY_TOKEN, &expired).await.expect("set");

        assert!(!session.is_authenticated().await);
        assert!(store.get(KEY_TOKEN).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn expiry_boundary_counts_as_expired() {
        let session = manager();
        let store = session.context().store();
        // exp == now at check time: boundary is expired.
        let boundary = token_with_exp(Utc::now().timestamp());
        store.set(KEY_TOKEN, &boundary).await.expect("set");

        assert!(!session.is_authenticated().await);
        assert!(store.get(KEY_TOKEN).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn valid_token_authenticates_and_survives() {
        let session = manager();
        let valid = token_with_exp(Utc::now().timestamp() + 3_600);
        session.set_token(&valid).await.expect("set_token");

        assert!(session.is_authenticated().await);
        assert_eq!(session.token().await.as_deref(), Some(valid.as_str()));
        assert_eq!(session.state().await, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn token_without_exp_never_expires() {
        let session = manager();
        session
            .set_token(&token_without_exp())
            .await
            .expect("set_token");
        assert!(session.is_authenticated().await);
        assert!(!session.is_token_expiring_soon().await);
    }

    #[tokio::test]
    async fn blank_set_token_preserves_previous_value() {
        let session = manager();
        let valid = token_with_exp(Utc::now().timestamp() + 3_600);
        session.set_token(&valid).await.expect("set_token");

        session.set_token("").await.expect("set_token");
        session.set_token("   ").await.expect("set_token");
        assert_eq!(session.token().await.as_deref(), Some(valid.as_str()));
    }

    #[tokio::test]
    async fn set_token_stores_trimmed_value() {
        let session = manager();
        session.set_token("  abc.def.ghi  ").await.expect("set_token");
        assert_eq!(session.token().await.as_deref(), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn set_token_rearms_redirect_latch() {
        let session = manager();
        assert!(session.context().claim_redirect());
        assert!(!session.context().claim_redirect());

        session.set_token("abc.def.ghi").await.expect("set_token");
        assert!(session.context().claim_redirect());
    }

    #[tokio::test]
    async fn remove_token_is_idempotent() {
        let session = manager();
        session.remove_token().await;
        session.set_token("abc.def.ghi").await.expect("set_token");
        session.remove_token().await;
        session.remove_token().await;
        assert!(session.token().await.is_none());
    }

    #[tokio::test]
    async fn user_info_decodes_claims() {
        let session = manager();
        session
            .set_token(&token_with_exp(Utc::now().timestamp() + 3_600))
            .await
            .expect("set_token");

        let claims = session.user_info().await.expect("claims");
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.email.as_deref(), Some("a@b.test"));
    }

    #[tokio::test]
    async fn user_info_is_a_pure_read() {
        let session = manager();
        let expired = token_with_exp(Utc::now().timestamp() - 100);
        session.set_token(&expired).await.expect("set_token");

        // Claims still come back, and the token stays put.
        assert!(session.user_info().await.is_some());
        assert_eq!(session.token().await.as_deref(), Some(expired.as_str()));
    }

    #[tokio::test]
    async fn expiring_soon_window() {
        let session = manager();
        session
            .set_token(&token_with_exp(Utc::now().timestamp() + 100))
            .await
            .expect("set_token");
        assert!(session.is_token_expiring_soon().await);

        session
            .set_token(&token_with_exp(Utc::now().timestamp() + 1_000))
            .await
            .expect("set_token");
        assert!(!session.is_token_expiring_soon().await);
    }

    #[tokio::test]
    async fn user_id_round_trip() {
        let session = manager();
        assert!(session.user_id().await.is_none());

        session.set_user_id("u-123").await.expect("set_user_id");
        assert_eq!(session.user_id().await.as_deref(), Some("u-123"));

        session.remove_user_id().await;
        assert!(session.user_id().await.is_none());
    }

    #[tokio::test]
    async fn logout_clears_everything_and_notifies() {
        let session = manager();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            session.context().on_logout(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        session
            .set_token(&token_with_exp(Utc::now().timestamp() + 3_600))
            .await
            .expect("set_token");
        session.set_user_id("u-123").await.expect("set_user_id");

        session.logout().await;
        assert!(session.token().await.is_none());
        assert!(session.user_id().await.is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn manager_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SessionManager>();
        assert_send_sync::<SessionState>();
    }
}
