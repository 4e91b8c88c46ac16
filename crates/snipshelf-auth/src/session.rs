//! Signed-in sessions and sign-ins waiting for their callback.

use crate::error::{AuthError, AuthResult};
use crate::provider::{generate_state, Provider};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use snipshelf_util::Identifier;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "snipshelf_session";

/// How long a sign-in may sit on the provider's page.
const PENDING_TTL_MINUTES: i64 = 10;

/// Profile data supplied by the provider. Any of it may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user: Option<User>,
    pub provider: Provider,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Truthy sessions pass the gate: a user is present and the session
    /// has not expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.user.is_some() && now < self.expires_at
    }

    /// Seconds until expiry, for the cookie's `Max-Age`.
    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

/// A sign-in that left for the provider and has not come back yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignIn {
    pub provider: Provider,
    pub callback_url: String,
    created_at: DateTime<Utc>,
}

/// In-process session store. Clones share state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    pending: Arc<RwLock<HashMap<String, PendingSignIn>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::days(30))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Start a session. Expired sessions are pruned on the way.
    pub async fn create(&self, provider: Provider, user: User) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Identifier::session(),
            user: Some(user),
            provider,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.is_active(now));
        sessions.insert(session.id.clone(), session.clone());
        debug!(
            session_id = %session.id,
            %provider,
            active = sessions.len(),
            "Session created"
        );
        session
    }

    /// Look up a live session. Expired sessions are dropped on the way.
    pub async fn get(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        let session = self.sessions.read().await.get(id).cloned()?;
        if session.is_active(now) {
            return Some(session);
        }

        self.sessions.write().await.remove(id);
        None
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Remember a sign-in and return the `state` to send to the provider.
    pub async fn begin_sign_in(
        &self,
        provider: Provider,
        callback_url: impl Into<String>,
    ) -> String {
        let state = generate_state();
        let now = Utc::now();
        let mut pending = self.pending.write().await;
        pending.retain(|_, p| now - p.created_at < Duration::minutes(PENDING_TTL_MINUTES));
        pending.insert(
            state.clone(),
            PendingSignIn {
                provider,
                callback_url: callback_url.into(),
                created_at: now,
            },
        );
        state
    }

    /// Claim the sign-in for `state`. Each state can be used once.
    pub async fn complete_sign_in(
        &self,
        state: &str,
        provider: Provider,
    ) -> AuthResult<PendingSignIn> {
        let pending = self
            .pending
            .write()
            .await
            .remove(state)
            .ok_or(AuthError::InvalidState)?;

        let fresh = Utc::now() - pending.created_at < Duration::minutes(PENDING_TTL_MINUTES);
        if pending.provider != provider || !fresh {
            return Err(AuthError::InvalidState);
        }
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ada() -> User {
        User {
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::default();
        let session = store.create(Provider::Github, ada()).await;
        assert!(session.id.starts_with("ses_"));

        assert_eq!(store.get(&session.id).await, Some(session.clone()));
        assert!(store.remove(&session.id).await);
        assert!(store.get(&session.id).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = SessionStore::new(Duration::seconds(-1));
        let session = store.create(Provider::Google, ada()).await;
        assert!(store.get(&session.id).await.is_none());
        assert!(store.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_prunes_abandoned_sessions() {
        let store = SessionStore::new(Duration::seconds(-1));
        store.create(Provider::Google, ada()).await;
        store.create(Provider::Github, ada()).await;

        // Only the session just created is left; the earlier one expired unread.
        assert_eq!(store.sessions.read().await.len(), 1);
    }

    #[test]
    fn test_session_without_user_is_not_active() {
        let session = Session {
            id: "ses_x".to_string(),
            user: None,
            provider: Provider::Google,
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!session.is_active(Utc::now()));
    }

    #[tokio::test]
    async fn test_sign_in_state_is_single_use() {
        let store = SessionStore::default();
        let state = store.begin_sign_in(Provider::Google, "/dashboard/snippets").await;

        let pending = store.complete_sign_in(&state, Provider::Google).await.unwrap();
        assert_eq!(pending.callback_url, "/dashboard/snippets");
        assert!(store.complete_sign_in(&state, Provider::Google).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_in_state_is_bound_to_provider() {
        let store = SessionStore::default();
        let state = store.begin_sign_in(Provider::Google, "/dashboard").await;
        assert!(matches!(
            store.complete_sign_in(&state, Provider::Github).await,
            Err(AuthError::InvalidState)
        ));
    }

    #[test]
    fn test_user_serialization_skips_missing_fields() {
        let json = serde_json::to_value(User {
            name: Some("Ada".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Ada" }));
    }
}
