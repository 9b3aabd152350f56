use async_trait::async_trait;
use chrono::{Duration, Utc};
use hearth_core::session::{AuthEvent, AuthGateway, ProfileFields, Session};
use hearth_core::{CoreError, CoreResult};
use hearth_shared::pii::Masked;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

/// Client for the hosted auth service. Sessions are issued and persisted by
/// the service; this client only holds the current one and reports
/// transitions.
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
    email: String,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            user_id: self.user.id,
            email: self.user.email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + Duration::seconds(self.expires_in),
        }
    }
}

impl AuthClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            events,
        }
    }

    async fn token_request(&self, path: &str, body: serde_json::Value) -> CoreResult<Session> {
        let url = format!("{}/auth/v1/{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransientNetwork(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CoreError::AuthExpiry,
                s if s.is_server_error() => {
                    CoreError::TransientNetwork(format!("{}: {}", s, body))
                }
                _ => CoreError::RemoteRejection(body),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CoreError::RemoteRejection(format!("Malformed token response: {}", e)))?;
        Ok(token.into_session())
    }

    /// Attempt a refresh-token grant. Any failure is a forced sign-out.
    async fn refresh(&self, refresh_token: &str) -> Option<Session> {
        let result = self
            .token_request(
                "token?grant_type=refresh_token",
                json!({ "refresh_token": refresh_token }),
            )
            .await;

        match result {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                None
            }
        }
    }

    async fn force_sign_out(&self) {
        *self.session.write().await = None;
        let _ = self.events.send(AuthEvent::TokenRefreshFailed);
    }
}

#[async_trait]
impl AuthGateway for AuthClient {
    async fn get_session(&self) -> CoreResult<Option<Session>> {
        let current = self.session.read().await.clone();

        let Some(session) = current else {
            return Ok(None);
        };
        if !session.is_expired_at(Utc::now()) {
            return Ok(Some(session));
        }

        match &session.refresh_token {
            Some(refresh_token) => match self.refresh(refresh_token).await {
                Some(renewed) => {
                    *self.session.write().await = Some(renewed.clone());
                    Ok(Some(renewed))
                }
                None => {
                    self.force_sign_out().await;
                    Ok(None)
                }
            },
            None => {
                self.force_sign_out().await;
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, identity: &str, secret: &str) -> CoreResult<Session> {
        let session = self
            .token_request(
                "token?grant_type=password",
                json!({ "email": identity, "password": secret }),
            )
            .await?;

        info!("Signed in as {}", Masked(identity));
        *self.session.write().await = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_up(
        &self,
        identity: &str,
        secret: &str,
        profile: ProfileFields,
    ) -> CoreResult<Session> {
        let session = self
            .token_request(
                "signup",
                json!({ "email": identity, "password": secret, "data": profile }),
            )
            .await?;

        info!("Signed up {}", Masked(identity));
        *self.session.write().await = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_out(&self) -> CoreResult<()> {
        let session = self.session.write().await.take();

        if let Some(session) = session {
            let url = format!("{}/auth/v1/logout", self.base_url);
            // Best effort; the local session is gone either way.
            let _ = self
                .http
                .post(url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&session.access_token)
                .send()
                .await;
        }

        let _ = self.events.send(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
