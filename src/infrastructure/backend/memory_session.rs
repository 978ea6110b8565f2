use async_trait::async_trait;
use chrono::Duration;
use rand_core::{OsRng, TryRngCore};
use tokio::sync::broadcast;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::{
    auth::{
        jwt::JwtService,
        password::{hash_operator_password, verify_operator_password},
    },
    backend::session::{ExpiryTimers, SessionBackend, EVENT_BUFFER},
    entities::identity::{Identity, Session, SessionEvent},
    errors::AuthError,
};

/// Single-operator sign-in service used for local development and tests.
pub struct MemorySessionBackend {
    operator: Identity,
    password_hash: String,
    tokens: JwtService,
    ttl: Duration,
    events: broadcast::Sender<SessionEvent>,
    expiry_timers: ExpiryTimers,
}

impl MemorySessionBackend {
    pub fn new(email: &str, password: &str, tokens: JwtService, ttl: Duration) -> Result<Self, AuthError> {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Ok(MemorySessionBackend {
            operator: Identity {
                user_id: Uuid::new_v4().to_string(),
                email: email.trim().to_lowercase(),
            },
            password_hash: hash_operator_password(password)?,
            tokens,
            ttl,
            events,
            expiry_timers: ExpiryTimers::new(),
        })
    }

    pub fn operator(&self) -> &Identity {
        &self.operator
    }

    fn refresh_token() -> Result<String, AuthError> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        OsRng.try_fill_bytes(&mut bytes[..]).map_err(|e| {
            tracing::error!(error = %e, "OS random source unavailable");
            AuthError::TokenCreation
        })?;
        Ok(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().to_lowercase() != self.operator.email {
            return Err(AuthError::WrongCredentials);
        }
        if !verify_operator_password(password, &self.password_hash)? {
            return Err(AuthError::WrongCredentials);
        }

        let session_id = Uuid::new_v4();
        let (access_token, expires_at) =
            self.tokens
                .create_access_token(&self.operator, session_id, self.ttl)?;

        let session = Session {
            id: session_id,
            access_token,
            refresh_token: Some(Self::refresh_token()?),
            expires_at,
            identity: self.operator.clone(),
        };

        self.expiry_timers.schedule(&session, self.events.clone());
        let _ = self.events.send(SessionEvent::SignedIn {
            session_id,
            identity: self.operator.clone(),
        });

        tracing::info!(%session_id, "operator signed in");
        Ok(session)
    }

    #[tracing::instrument(skip(self, session), fields(session_id = %session.id))]
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        if session.identity.user_id != self.operator.user_id {
            return Err(AuthError::InvalidToken);
        }

        // global scope: every session of the operator goes away
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
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-long-enough-123456";

    fn backend(ttl: Duration) -> MemorySessionBackend {
        MemorySessionBackend::new("Owner@Example.com", "hunter22", JwtService::new(SECRET), ttl).unwrap()
    }

    #[tokio::test]
    async fn signs_in_with_seeded_credentials() {
        let backend = backend(Duration::minutes(5));
        let mut events = backend.subscribe();

        let session = backend.sign_in("owner@example.com", "hunter22").await.unwrap();
        assert_eq!(session.identity.email, "owner@example.com");
        assert!(!session.is_expired());
        assert!(JwtService::new(SECRET).decode(&session.access_token).is_ok());

        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SignedIn { session_id, .. } if session_id == session.id
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let backend = backend(Duration::minutes(5));
        assert_eq!(
            backend.sign_in("owner@example.com", "nope").await.unwrap_err(),
            AuthError::WrongCredentials
        );
        assert_eq!(
            backend.sign_in("someone@example.com", "hunter22").await.unwrap_err(),
            AuthError::WrongCredentials
        );
    }

    #[tokio::test]
    async fn sign_out_is_broadcast() {
        let backend = backend(Duration::minutes(5));
        let session = backend.sign_in("owner@example.com", "hunter22").await.unwrap();
        let mut events = backend.subscribe();

        backend.sign_out(&session).await.unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::SignedOut { user_id: session.identity.user_id.clone() }
        );
    }

    #[tokio::test]
    async fn expiry_is_announced() {
        let backend = backend(Duration::milliseconds(50));
        let mut events = backend.subscribe();
        let session = backend.sign_in("owner@example.com", "hunter22").await.unwrap();

        let _signed_in = events.recv().await.unwrap();
        let expired = tokio::time::timeout(std::time::Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(expired, SessionEvent::Expired { session_id: session.id });
    }

    #[tokio::test]
    async fn expired_sessions_release_their_timers() {
        let backend = backend(Duration::milliseconds(20));
        for _ in 0..5 {
            backend.sign_in("owner@example.com", "hunter22").await.unwrap();
        }

        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        assert_eq!(backend.expiry_timers.pending(), 0);
    }
}
