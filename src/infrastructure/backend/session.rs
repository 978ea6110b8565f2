use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::{sync::broadcast, task::JoinHandle};
use uuid::Uuid;

use crate::{
    entities::identity::{Session, SessionEvent},
    errors::AuthError,
};

pub const EVENT_BUFFER: usize = 64;

/// Hosted sign-in service.
///
/// Events are broadcast to every subscriber; an `AuthContext` filters them
/// down to the session it holds.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Revokes the session globally. Subscribers receive `SignedOut`.
    async fn sign_out(&self, session: &Session) -> Result<(), AuthError>;

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

pub type SharedSessionBackend = Arc<dyn SessionBackend>;

/// Pending `Expired` announcements, one per live session.
///
/// A timer removes itself once it fires; sign-out cancels only the timers of
/// the user signing out.
#[derive(Clone, Default)]
pub struct ExpiryTimers {
    timers: Arc<DashMap<Uuid, ExpiryTimer>>,
}

struct ExpiryTimer {
    user_id: String,
    handle: JoinHandle<()>,
}

impl ExpiryTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces `Expired` for the session once its expiry time is reached.
    pub fn schedule(&self, session: &Session, events: broadcast::Sender<SessionEvent>) {
        // a timer that fired before it was registered cannot remove itself
        self.timers.retain(|_, timer| !timer.handle.is_finished());

        let session_id = session.id;
        let remaining = (session.expires_at - Utc::now())
            .to_std()
            .unwrap_or_default();
        let timers = Arc::clone(&self.timers);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            tracing::debug!(%session_id, "session reached its expiry time");
            // no receivers just means nobody is signed in anymore
            let _ = events.send(SessionEvent::Expired { session_id });
            timers.remove(&session_id);
        });

        self.timers.insert(
            session_id,
            ExpiryTimer {
                user_id: session.identity.user_id.clone(),
                handle,
            },
        );
    }

    /// Cancels every pending expiry of `user_id`.
    pub fn cancel_user(&self, user_id: &str) {
        self.timers.retain(|_, timer| {
            if timer.user_id == user_id {
                timer.handle.abort();
                false
            } else {
                true
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }
}
