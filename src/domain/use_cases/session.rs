use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{
    backend::session::SharedSessionBackend,
    entities::identity::{Identity, Session, SessionEvent},
    errors::AuthError,
};

/// Signed-in state of one browser context.
///
/// Sign-in, sign-out and backend session events are the only writers; any
/// number of readers may observe the identity through [`AuthContext::subscribe`].
pub struct AuthContext {
    id: Uuid,
    backend: SharedSessionBackend,
    session: Arc<RwLock<Option<Session>>>,
    changes: watch::Sender<Option<Identity>>,
    listener: JoinHandle<()>,
}

impl AuthContext {
    /// Creates the context and starts listening for backend session events.
    /// Must be called from within a tokio runtime.
    pub fn mount(id: Uuid, backend: SharedSessionBackend) -> Self {
        let session = Arc::new(RwLock::new(None));
        let (changes, _) = watch::channel(None);
        let listener = tokio::spawn(apply_backend_events(
            id,
            backend.subscribe(),
            session.clone(),
            changes.clone(),
        ));

        AuthContext {
            id,
            backend,
            session,
            changes,
            listener,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current identity; a session past its expiry time counts as none.
    pub fn identity(&self) -> Option<Identity> {
        self.session().map(|s| s.identity)
    }

    /// The live session, used to authorise calls against the row store.
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .as_ref()
            .filter(|s| !s.is_expired())
            .cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.changes.subscribe()
    }

    /// Signs in through the backend. Every failure is reported as
    /// `WrongCredentials`; the underlying cause is only logged.
    #[tracing::instrument(skip(self, password), fields(context = %self.id))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let session = match self.backend.sign_in(email, password).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                return Err(AuthError::WrongCredentials);
            }
        };

        let identity = session.identity.clone();
        *self.session.write() = Some(session);
        self.changes.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Clears the local identity and revokes the backend session. A backend
    /// failure is logged; the local identity is cleared regardless.
    #[tracing::instrument(skip(self), fields(context = %self.id))]
    pub async fn sign_out(&self) {
        let current = self.session.write().take();
        self.changes.send_replace(None);

        if let Some(session) = current {
            if let Err(e) = self.backend.sign_out(&session).await {
                tracing::error!(error = %e, "backend sign-out failed");
            }
        }
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn apply_backend_events(
    context: Uuid,
    mut events: broadcast::Receiver<SessionEvent>,
    session: Arc<RwLock<Option<Session>>>,
    changes: watch::Sender<Option<Identity>>,
) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(%context, skipped, "session events lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let cleared = {
            let mut guard = session.write();
            let affected = match (&event, guard.as_ref()) {
                (SessionEvent::SignedOut { user_id }, Some(current)) => &current.identity.user_id == user_id,
                (SessionEvent::Expired { session_id }, Some(current)) => &current.id == session_id,
                _ => false,
            };
            if affected {
                *guard = None;
            }
            affected
        };

        if cleared {
            tracing::info!(%context, ?event, "session ended by backend");
            changes.send_replace(None);
        }
    }
}

/// Owns one [`AuthContext`] per browser context.
pub struct SessionRegistry {
    backend: SharedSessionBackend,
    contexts: DashMap<Uuid, Arc<AuthContext>>,
}

impl SessionRegistry {
    pub fn new(backend: SharedSessionBackend) -> Self {
        SessionRegistry {
            backend,
            contexts: DashMap::new(),
        }
    }

    /// The context for `id`, mounting it on first use.
    pub fn context(&self, id: Uuid) -> Arc<AuthContext> {
        self.contexts
            .entry(id)
            .or_insert_with(|| Arc::new(AuthContext::mount(id, self.backend.clone())))
            .clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<AuthContext>> {
        self.contexts.get(&id).map(|ctx| Arc::clone(ctx.value()))
    }

    /// Identity of an existing context without mounting a new one.
    pub fn identity(&self, id: Uuid) -> Option<Identity> {
        self.contexts.get(&id).and_then(|ctx| ctx.identity())
    }

    pub fn session(&self, id: Uuid) -> Option<Session> {
        self.contexts.get(&id).and_then(|ctx| ctx.session())
    }

    /// Drops contexts that hold no identity and are not in use, returning
    /// their ids. Dropping a context ends its event subscription.
    pub fn prune(&self) -> Vec<Uuid> {
        let mut removed = Vec::new();
        self.contexts.retain(|id, ctx| {
            let keep = ctx.identity().is_some() || Arc::strong_count(ctx) > 1;
            if !keep {
                removed.push(*id);
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::jwt::JwtService, backend::memory_session::MemorySessionBackend};
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn backend(ttl: Duration) -> SharedSessionBackend {
        Arc::new(
            MemorySessionBackend::new(
                "owner@example.com",
                "hunter22",
                JwtService::new("a-test-secret-that-is-long-enough-123456"),
                ttl,
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn sign_in_notifies_subscribers() {
        let ctx = AuthContext::mount(Uuid::new_v4(), backend(Duration::minutes(5)));
        let mut changes = ctx.subscribe();

        let identity = ctx.sign_in("owner@example.com", "hunter22").await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow().as_ref(), Some(&identity));
        assert_eq!(ctx.identity(), Some(identity));
    }

    #[tokio::test]
    async fn failed_sign_in_is_generic_and_leaves_no_identity() {
        let ctx = AuthContext::mount(Uuid::new_v4(), backend(Duration::minutes(5)));
        let err = ctx.sign_in("owner@example.com", "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::WrongCredentials);
        assert!(ctx.identity().is_none());
    }

    #[tokio::test]
    async fn sign_out_elsewhere_clears_every_context() {
        let registry = SessionRegistry::new(backend(Duration::minutes(5)));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        registry.context(a).sign_in("owner@example.com", "hunter22").await.unwrap();
        registry.context(b).sign_in("owner@example.com", "hunter22").await.unwrap();

        let mut changes = registry.context(b).subscribe();
        registry.context(a).sign_out().await;

        tokio::time::timeout(StdDuration::from_secs(2), changes.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(registry.identity(a).is_none());
        assert!(registry.identity(b).is_none());
    }

    #[tokio::test]
    async fn expiry_clears_the_identity() {
        let ctx = AuthContext::mount(Uuid::new_v4(), backend(Duration::milliseconds(100)));
        let mut changes = ctx.subscribe();
        ctx.sign_in("owner@example.com", "hunter22").await.unwrap();
        changes.changed().await.unwrap();

        tokio::time::timeout(StdDuration::from_secs(2), changes.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(changes.borrow().is_none());
        assert!(ctx.identity().is_none());
    }

    #[tokio::test]
    async fn prune_keeps_signed_in_contexts() {
        let registry = SessionRegistry::new(backend(Duration::minutes(5)));
        let (idle, active) = (Uuid::new_v4(), Uuid::new_v4());
        let _ = registry.context(idle);
        registry.context(active).sign_in("owner@example.com", "hunter22").await.unwrap();

        assert_eq!(registry.prune(), vec![idle]);
        assert_eq!(registry.len(), 1);
        assert!(registry.identity(active).is_some());
    }
}
