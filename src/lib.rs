use std::sync::Arc;

mod domain;
mod infrastructure;
mod interfaces;
pub mod background_task;
pub mod constants;
pub mod errors;
pub mod graceful_shutdown;
pub mod settings;

pub use domain::{entities, use_cases};
pub use infrastructure::{auth, backend, utils};
pub use interfaces::{handlers, middlewares, repositories, routes};

use auth::jwt::JwtService;
use backend::{
    gotrue::RestSessionBackend,
    memory::MemoryTableStore,
    memory_session::MemorySessionBackend,
    rest::RestTableStore,
    session::SharedSessionBackend,
    store::SharedStore,
};
use repositories::backend_repo::{BackendCategoryRepo, BackendContactRepo, BackendPostRepo, BackendProjectRepo};
use settings::{AppConfig, BackendKind};
use use_cases::{
    blog::BlogHandler, contact::ContactHandler, portfolio::PortfolioHandler, session::SessionRegistry,
    view_scope::ViewScopes,
};

pub type AppBlogHandler = BlogHandler<BackendPostRepo, BackendCategoryRepo>;
pub type AppPortfolioHandler = PortfolioHandler<BackendProjectRepo>;
pub type AppContactHandler = ContactHandler<BackendContactRepo>;

pub struct AppState {
    pub blog_handler: AppBlogHandler,
    pub portfolio_handler: AppPortfolioHandler,
    pub contact_handler: AppContactHandler,
    pub sessions: SessionRegistry,
    pub view_scopes: ViewScopes,
}

impl AppState {
    pub fn new(store: SharedStore, session_backend: SharedSessionBackend) -> Self {
        AppState {
            blog_handler: BlogHandler::new(
                BackendPostRepo::new(store.clone()),
                BackendCategoryRepo::new(store.clone()),
            ),
            portfolio_handler: PortfolioHandler::new(BackendProjectRepo::new(store.clone())),
            contact_handler: ContactHandler::new(BackendContactRepo::new(store)),
            sessions: SessionRegistry::new(session_backend),
            view_scopes: ViewScopes::new(),
        }
    }

    /// Wires the row store and session backend selected by `config.backend`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = JwtService::new(&config.jwt_secret);

        let (store, sessions): (SharedStore, SharedSessionBackend) = match config.backend {
            BackendKind::Rest => {
                let client = reqwest::Client::builder()
                    .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                    .build()?;
                let store = RestTableStore::new(client.clone(), &config.backend_url, &config.backend_anon_key)?;
                let sessions =
                    RestSessionBackend::new(client, &config.backend_url, &config.backend_anon_key, tokens)?;
                (Arc::new(store), Arc::new(sessions))
            }
            BackendKind::Memory => {
                tracing::warn!("using the in-process backend; data is lost on restart");
                let store = MemoryTableStore::new(tokens.clone());
                let sessions = MemorySessionBackend::new(
                    &config.admin_email,
                    &config.admin_password,
                    tokens,
                    chrono::Duration::minutes(config.session_expiration_minutes),
                )?;
                (Arc::new(store), Arc::new(sessions))
            }
        };

        Ok(AppState::new(store, sessions))
    }
}
