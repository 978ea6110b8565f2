use std::future::Future;

use dashmap::DashMap;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::AppError;

type ScopeKey = (Uuid, &'static str);

/// Last-request-wins bookkeeping for page data loads.
///
/// Each (browser context, page) pair carries a generation counter. Starting a
/// new load bumps it, which cancels any older load still waiting on the
/// backend.
#[derive(Default)]
pub struct ViewScopes {
    scopes: DashMap<ScopeKey, watch::Sender<u64>>,
}

/// Permission to run one page load. Dropped tickets simply stop listening.
pub struct ViewTicket {
    generation: u64,
    current: watch::Receiver<u64>,
}

impl ViewScopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, context: Uuid, page: &'static str) -> ViewTicket {
        let scope = self
            .scopes
            .entry((context, page))
            .or_insert_with(|| watch::channel(0).0);

        let generation = *scope.borrow() + 1;
        scope.send_replace(generation);

        ViewTicket {
            generation,
            current: scope.subscribe(),
        }
    }

    /// Cancels every load of a browser context and forgets its scopes.
    pub fn close(&self, context: Uuid) {
        self.scopes.retain(|(owner, _), _| *owner != context);
    }

    /// Forgets scopes with no load in flight.
    pub fn prune_idle(&self) -> usize {
        let before = self.scopes.len();
        self.scopes.retain(|_, scope| scope.receiver_count() > 0);
        before - self.scopes.len()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl ViewTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs `load` unless a newer ticket for the same page (or a scope
    /// teardown) cancels it first.
    pub async fn run<F, T>(mut self, load: F) -> Result<T, AppError>
    where
        F: Future<Output = T>,
    {
        let generation = self.generation;
        tokio::select! {
            biased;
            _ = superseded(&mut self.current, generation) => Err(AppError::Superseded),
            output = load => Ok(output),
        }
    }
}

async fn superseded(current: &mut watch::Receiver<u64>, generation: u64) {
    loop {
        if *current.borrow_and_update() != generation {
            return;
        }
        if current.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn newer_load_cancels_the_older_one() {
        let scopes = ViewScopes::new();
        let ctx = Uuid::new_v4();

        let first = scopes.begin(ctx, "blog");
        let slow = tokio::spawn(first.run(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "stale"
        }));
        tokio::task::yield_now().await;

        let second = scopes.begin(ctx, "blog");
        assert_eq!(second.run(async { "fresh" }).await.unwrap(), "fresh");

        let stale = tokio::time::timeout(Duration::from_secs(1), slow).await.unwrap().unwrap();
        assert!(matches!(stale, Err(AppError::Superseded)));
    }

    #[tokio::test]
    async fn pages_and_contexts_are_independent() {
        let scopes = ViewScopes::new();
        let ctx = Uuid::new_v4();

        let blog = scopes.begin(ctx, "blog");
        let _portfolio = scopes.begin(ctx, "portfolio");
        let _other = scopes.begin(Uuid::new_v4(), "blog");

        assert_eq!(blog.run(async { 1 }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn closing_a_context_cancels_its_loads() {
        let scopes = ViewScopes::new();
        let ctx = Uuid::new_v4();
        let ticket = scopes.begin(ctx, "admin/blog");
        let pending = tokio::spawn(ticket.run(std::future::pending::<()>()));
        tokio::task::yield_now().await;

        scopes.close(ctx);
        let result = tokio::time::timeout(Duration::from_secs(1), pending).await.unwrap().unwrap();
        assert!(matches!(result, Err(AppError::Superseded)));
        assert!(scopes.is_empty());
    }

    #[tokio::test]
    async fn idle_scopes_are_pruned() {
        let scopes = ViewScopes::new();
        let ticket = scopes.begin(Uuid::new_v4(), "home");
        assert_eq!(scopes.prune_idle(), 0);
        drop(ticket);
        assert_eq!(scopes.prune_idle(), 1);
    }
}
