use crate::CoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// An authenticated session issued by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Session transitions pushed to consumers. A `TokenRefreshFailed` must be
/// treated as an immediate forced sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshFailed,
}

/// Optional profile fields collected at sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Contract over the hosted auth service. The service itself (token issuance,
/// persistence) stays external; this is the consumer side only.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Current session, refreshed transparently if possible. `None` when
    /// signed out or after a failed refresh.
    async fn get_session(&self) -> CoreResult<Option<Session>>;

    async fn sign_in(&self, identity: &str, secret: &str) -> CoreResult<Session>;

    async fn sign_up(
        &self,
        identity: &str,
        secret: &str,
        profile: ProfileFields,
    ) -> CoreResult<Session>;

    async fn sign_out(&self) -> CoreResult<()>;

    /// Stream of session transitions.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
