use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use portfolio_site::{
    background_task::start_context_prune_task,
    graceful_shutdown::shutdown_signal,
    middlewares::browser_context::BrowserContextMiddleware,
    routes::configure_routes,
    settings::AppConfig,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let production = std::env::var("APP_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("production"));

    if production {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to initialise backend: {}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        "Starting {} v{} on {} ({:?} backend)",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.backend
    );

    let prune_every = std::time::Duration::from_secs(config.context_prune_minutes.max(1) * 60);
    tokio::spawn(start_context_prune_task(app_state.clone(), prune_every));

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(BrowserContextMiddleware)
            .wrap(NormalizePath::trim())
            .wrap(cors(&server_config))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count.max(1))
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
