use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    auth::jwt::JwtService,
    backend::{
        rest::normalize_base,
        session::{ExpiryTimers, SessionBackend, EVENT_BUFFER},
    },
    entities::identity::{Session, SessionEvent},
    errors::AuthError,
};

/// Sign-in against the hosted GoTrue auth service.
pub struct RestSessionBackend {
    client: Client,
    base_url: Url,
    anon_key: Zeroizing<String>,
    tokens: JwtService,
    events: broadcast::Sender<SessionEvent>,
    expiry_timers: ExpiryTimers,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl RestSessionBackend {
    pub fn new(client: Client, base_url: &str, anon_key: &str, tokens: JwtService) -> Result<Self, AuthError> {
        let base_url = normalize_base(base_url).map_err(|e| AuthError::Backend(e.to_string()))?;
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(RestSessionBackend {
            client,
            base_url,
            anon_key: Zeroizing::new(anon_key.to_string()),
            tokens,
            events,
            expiry_timers: ExpiryTimers::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path)
            .map_err(|e| AuthError::Backend(e.to_string()))
    }
}

/// Maps the token endpoint's answer onto a session.
///
/// 400 and 401 both mean the credentials were refused; the service uses
/// either depending on the failure.
fn session_from_response(status: StatusCode, body: &str, tokens: &JwtService) -> Result<Session, AuthError> {
    match status {
        status if status.is_success() => {}
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => return Err(AuthError::WrongCredentials),
        status => {
            tracing::error!(%status, %body, "auth service refused sign-in");
            return Err(AuthError::Backend(format!("auth service returned {}", status)));
        }
    }

    let payload: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Backend(format!("malformed token response: {}", e)))?;
    let claims = tokens.decode(&payload.access_token)?;

    Ok(Session {
        id: claims.session_id,
        access_token: payload.access_token,
        refresh_token: payload.refresh_token,
        expires_at: claims.expires_at(),
        identity: claims.identity(),
    })
}

#[async_trait]
impl SessionBackend for RestSessionBackend {
    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let session = session_from_response(status, &body, &self.tokens)?;

        self.expiry_timers.schedule(&session, self.events.clone());
        let _ = self.events.send(SessionEvent::SignedIn {
            session_id: session.id,
            identity: session.identity.clone(),
        });
        Ok(session)
    }

    #[tracing::instrument(skip(self, session), fields(session_id = %session.id))]
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let mut url = self.endpoint("auth/v1/logout")?;
        url.query_pairs_mut().append_pair("scope", "global");

        let response = self
            .client
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        // an already revoked token still means the user is signed out
        if !response.status().is_success() && response.status() != StatusCode::UNAUTHORIZED {
            return Err(AuthError::Backend(format!(
                "auth service returned {}",
                response.status()
            )));
        }

        self.expiry_timers.cancel_user(&session.identity.user_id);
        let _ = self.events.send(SessionEvent::SignedOut {
            user_id: session.identity.user_id.clone(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::entities::identity::Identity;

    const SECRET: &str = "a-test-secret-that-is-long-enough-123456";

    fn token_body(tokens: &JwtService, session_id: Uuid) -> (String, chrono::DateTime<chrono::Utc>) {
        let identity = Identity {
            user_id: "3f1c2d4e".into(),
            email: "owner@example.com".into(),
        };
        let (access_token, expires_at) = tokens
            .create_access_token(&identity, session_id, Duration::minutes(60))
            .unwrap();
        let body = json!({
            "access_token": access_token,
            "token_type": "bearer",
            "refresh_token": "r-123",
        });
        (body.to_string(), expires_at)
    }

    #[test]
    fn refused_credentials_are_wrong_credentials() {
        let tokens = JwtService::new(SECRET);
        for status in [StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED] {
            let err = session_from_response(status, r#"{"error":"invalid_grant"}"#, &tokens).unwrap_err();
            assert_eq!(err, AuthError::WrongCredentials, "{status}");
        }
    }

    #[test]
    fn other_failures_are_backend_errors() {
        let tokens = JwtService::new(SECRET);
        let err = session_from_response(StatusCode::SERVICE_UNAVAILABLE, "maintenance", &tokens).unwrap_err();
        assert!(matches!(err, AuthError::Backend(msg) if msg.contains("503")));

        let err = session_from_response(StatusCode::OK, "not json", &tokens).unwrap_err();
        assert!(matches!(err, AuthError::Backend(_)));
    }

    #[test]
    fn session_comes_from_the_access_token_claims() {
        let tokens = JwtService::new(SECRET);
        let session_id = Uuid::new_v4();
        let (body, expires_at) = token_body(&tokens, session_id);

        let session = session_from_response(StatusCode::OK, &body, &tokens).unwrap();

        assert_eq!(session.id, session_id);
        assert_eq!(session.expires_at.timestamp(), expires_at.timestamp());
        assert_eq!(session.identity.email, "owner@example.com");
        assert_eq!(session.identity.user_id, "3f1c2d4e");
        assert_eq!(session.refresh_token.as_deref(), Some("r-123"));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let (body, _) = token_body(&JwtService::new("a-different-secret-that-is-long-enough-99"), Uuid::new_v4());

        let err = session_from_response(StatusCode::OK, &body, &JwtService::new(SECRET)).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn endpoints_hang_off_the_project_url() {
        let backend = RestSessionBackend::new(
            Client::new(),
            "https://project.example.co",
            "anon",
            JwtService::new("a-test-secret-that-is-long-enough-123456"),
        )
        .unwrap();

        assert_eq!(
            backend.endpoint("auth/v1/logout").unwrap().as_str(),
            "https://project.example.co/auth/v1/logout"
        );
    }
}
