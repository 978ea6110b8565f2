use std::{env, fmt};

use config::{Config, ConfigError, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;

/// Deployment stage, taken from `APP_ENV`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl AppEnvironment {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnvironment::Development),
            "production" | "prod" => Ok(AppEnvironment::Production),
            "testing" | "test" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Unknown APP_ENV '{}'", raw))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which implementation of the remote row store and session endpoint to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Rest,
    Memory,
}

/// Runtime settings, layered from `config/default`, `config/{APP_ENV}` and
/// `APP_`-prefixed environment variables (later sources win).
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    #[serde(skip, default = "development")]
    pub env: AppEnvironment,

    #[serde(default = "site_name")]
    pub name: String,

    #[serde(default = "listen_host")]
    pub host: String,

    #[serde(default = "listen_port")]
    pub port: u16,

    #[serde(default = "num_cpus::get")]
    pub worker_count: usize,

    /// Comma-separated entries are split by [`AppConfig::cors_origins`].
    #[serde(default = "any_origin")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "rest_backend")]
    pub backend: BackendKind,

    #[serde(default)]
    pub backend_url: String,

    #[serde(default)]
    pub backend_anon_key: String,

    /// Verifies backend access tokens; the memory backend also signs with it.
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "one_hour")]
    pub session_expiration_minutes: i64,

    /// Operator seeded into the memory backend.
    #[serde(default)]
    pub admin_email: String,

    #[serde(default)]
    pub admin_password: String,

    #[serde(default = "half_hour")]
    pub context_prune_minutes: u64,
}

fn development() -> AppEnvironment {
    AppEnvironment::Development
}
fn site_name() -> String {
    "Portfolio-Site".into()
}
fn listen_host() -> String {
    "127.0.0.1".into()
}
fn listen_port() -> u16 {
    8080
}
fn any_origin() -> Vec<String> {
    vec!["*".into()]
}
fn rest_backend() -> BackendKind {
    BackendKind::Rest
}
fn one_hour() -> i64 {
    60
}
fn half_hour() -> u64 {
    30
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();
        let stage = AppEnvironment::from_env()?;

        let mut config: AppConfig = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", stage)).required(false))
            .add_source(Environment::with_prefix("APP").prefix_separator("_").ignore_empty(true))
            .build()?
            .try_deserialize()?;
        config.env = stage;

        if config.backend == BackendKind::Rest {
            config.backend_url = required(config.backend_url, "APP_BACKEND_URL")?;
            config.backend_anon_key = required(config.backend_anon_key, "APP_BACKEND_ANON_KEY")?;
        }
        config.jwt_secret = required(config.jwt_secret, "APP_JWT_SECRET")?;

        config.validate()?;
        Ok(config)
    }

    /// Collects every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        match self.backend {
            BackendKind::Rest => {
                if url::Url::parse(&self.backend_url).is_err() {
                    problems.push("BACKEND_URL must be an absolute URL");
                }
                if self.backend_anon_key.trim().is_empty() {
                    problems.push("BACKEND_ANON_KEY cannot be empty");
                }
            }
            BackendKind::Memory => {
                if self.admin_email.trim().is_empty() || self.admin_password.is_empty() {
                    problems.push("ADMIN_EMAIL and ADMIN_PASSWORD are required for the memory backend");
                }
                if self.is_production() {
                    problems.push("The memory backend is not allowed in production");
                }
            }
        }
        if self.jwt_secret.len() < 32 {
            problems.push("JWT_SECRET must be at least 32 characters");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            problems.push("Wildcard CORS origins are not allowed in production");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(problems.join("; ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Keeps a configured value, falling back to the bare environment variable.
fn required(configured: String, var: &str) -> Result<String, ConfigError> {
    if !configured.trim().is_empty() {
        return Ok(configured);
    }
    env::var(var).map_err(|_| ConfigError::Message(format!("{var} must be set")))
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "[MISSING]" } else { "[REDACTED]" }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("listen", &format_args!("{}:{}", self.host, self.port))
            .field("workers", &self.worker_count)
            .field("cors", &self.cors_origins())
            .field("backend", &self.backend)
            .field("backend_url", &self.backend_url)
            .field("backend_anon_key", &redacted(&self.backend_anon_key))
            .field("jwt_secret", &redacted(&self.jwt_secret))
            .field("session_minutes", &self.session_expiration_minutes)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &redacted(&self.admin_password))
            .field("context_prune_minutes", &self.context_prune_minutes)
            .finish()
    }
}
