#![allow(dead_code)]

use std::{net::TcpListener, sync::Arc, time::Duration};

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use portfolio_site::{
    auth::jwt::JwtService,
    backend::{
        memory::MemoryTableStore,
        memory_session::MemorySessionBackend,
        query::Table,
        store::SharedStore,
    },
    middlewares::browser_context::BrowserContextMiddleware,
    routes::configure_routes,
    AppState,
};
use reqwest::{header::LOCATION, redirect::Policy, Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test_jwt_secret_that_is_long_enough_1234567890";
pub const ADMIN_EMAIL: &str = "owner@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub store: Arc<MemoryTableStore>,
    pub address: String,
    pub client: Client,
}

/// A cookie-keeping client that reports redirects instead of following
/// them, so each test client is one browser context.
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_over(|memory| memory as SharedStore).await
    }

    /// Serves the app over `wrap(memory)`, letting a test put a store in
    /// front of the in-process one.
    pub async fn spawn_over<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<MemoryTableStore>) -> SharedStore,
    {
        let tokens = JwtService::new(TEST_SECRET);
        let store = Arc::new(MemoryTableStore::new(tokens.clone()));
        let sessions = Arc::new(
            MemorySessionBackend::new(
                ADMIN_EMAIL,
                ADMIN_PASSWORD,
                tokens,
                chrono::Duration::minutes(30),
            )
            .expect("Failed to seed operator"),
        );
        let state = Arc::new(AppState::new(wrap(store.clone()), sessions));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state_clone = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(state_clone.clone()))
                .wrap(BrowserContextMiddleware)
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = browser();
        while client.get(&format!("{}/contact", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            state,
            store,
            address,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE")
    }

    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_json("/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn login_as_operator(&self) {
        let response = self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "operator sign-in failed");
    }

    pub async fn create_post(&self, title: &str, slug: &str, published: bool) -> Response {
        self.post_json(
            "/admin/blog/new",
            &json!({
                "title": title,
                "slug": slug,
                "content": format!("<p>{} body</p>", title),
                "published": published,
            }),
        )
        .await
    }

    pub async fn create_project(&self, title: &str) -> Response {
        self.post_json(
            "/admin/portfolio/new",
            &json!({
                "title": title,
                "description": format!("{} description", title),
                "technologies": "Rust, Actix",
                "github_url": "https://github.com/example/project",
            }),
        )
        .await
    }

    /// Seeds a category directly into the store.
    pub fn seed_category(&self, name: &str, slug: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.store.seed(
            Table::Categories,
            vec![json!({ "id": id, "name": name, "slug": slug })],
        );
        id
    }
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body(response: Response) -> Value {
    response.json().await.expect("Response was not JSON")
}
