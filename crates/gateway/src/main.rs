//! MangaForge API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting (auth / authenticated / global budgets)
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod extract;
mod handlers;
mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use mangaforge_common::{
    auth::JwtManager,
    config::AppConfig,
    db::DbPool,
    metrics,
    storage::{ImageStore, LocalImageStore},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub store: Arc<dyn ImageStore>,
    pub jwt: Arc<JwtManager>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    let config = Arc::new(config);

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.observability.log_level));

    if config.observability.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    info!("Starting MangaForge API Gateway v{}", mangaforge_common::VERSION);

    // Initialize metrics
    metrics::register_metrics();

    if config.observability.metrics_port != 0 {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from((
                [0, 0, 0, 0],
                config.observability.metrics_port,
            )))
            .install()?;
        info!(
            port = config.observability.metrics_port,
            "Prometheus exporter listening"
        );
    }

    // Initialize database connection and apply migrations
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    db.migrate().await?;

    // Image storage backend
    let store: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(
        &config.storage.root,
        &config.storage.public_base_url,
    ));
    info!(disk = store.disk_name(), "Image store ready");

    // Token manager
    let jwt = Arc::new(JwtManager::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_secs,
    ));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        store,
        jwt,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Rate limit budgets: brute-force protection on auth endpoints,
    // a per-client budget for authenticated traffic, and a global ceiling
    let rate = &state.config.rate_limit;
    let auth_limiter = middleware::rate_limit::create_rate_limiter(rate.auth_per_minute, rate.burst);
    let authed_limiter =
        middleware::rate_limit::create_rate_limiter(rate.authenticated_per_minute, rate.burst);
    let global_limiter =
        middleware::rate_limit::create_rate_limiter(rate.global_per_minute, rate.burst);
    let limits_enabled = rate.enabled;

    // Public catalog reads
    let public_routes = Router::new()
        .route("/manga", get(handlers::manga::list))
        .route("/manga/popular", get(handlers::manga::popular))
        .route("/manga/latest", get(handlers::manga::latest))
        .route("/manga/search", get(handlers::manga::search))
        .route("/manga/{slug}", get(handlers::manga::show))
        .route("/manga/{slug}/chapters", get(handlers::chapters::index))
        .route(
            "/manga/{slug}/chapters/{number}",
            get(handlers::chapters::show),
        )
        .route("/genres", get(handlers::genres::index))
        .route("/genres/{slug}", get(handlers::genres::show))
        .route("/authors", get(handlers::authors::index))
        .route("/authors/{slug}", get(handlers::authors::show));

    // Auth endpoints get the strictest budget
    let auth_routes = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .layer(axum::middleware::from_fn(move |req, next| {
            middleware::rate_limit::rate_limit_middleware(
                req,
                next,
                auth_limiter.clone(),
                limits_enabled,
            )
        }));

    // Authenticated user endpoints
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route("/me/profile", put(handlers::me::update_profile))
        .route("/me/password", put(handlers::me::update_password))
        .route("/me/follows", get(handlers::follows::list))
        .route("/manga/{slug}/follow", post(handlers::follows::toggle))
        .layer(axum::middleware::from_fn({
            let limiter = authed_limiter.clone();
            move |req, next| {
                middleware::rate_limit::rate_limit_middleware(
                    req,
                    next,
                    limiter.clone(),
                    limits_enabled,
                )
            }
        }));

    // Admin endpoints: catalog writes, chapter uploads, moderation
    let admin_routes = Router::new()
        .route("/manga", post(handlers::manga::store))
        .route("/manga/{slug}", put(handlers::manga::update))
        .route("/manga/{slug}", delete(handlers::manga::destroy))
        .route("/manga/{slug}/chapters", post(handlers::chapters::store))
        .route(
            "/manga/{slug}/chapters/{number}",
            put(handlers::chapters::update),
        )
        .route(
            "/manga/{slug}/chapters/{number}",
            delete(handlers::chapters::destroy),
        )
        .route("/chapters/pending", get(handlers::chapters::pending))
        .route("/chapters/{id}/approve", post(handlers::chapters::approve))
        .route("/chapters/{id}/reject", post(handlers::chapters::reject))
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(axum::middleware::from_fn(move |req, next| {
            middleware::rate_limit::rate_limit_middleware(
                req,
                next,
                authed_limiter.clone(),
                limits_enabled,
            )
        }));

    let api_routes = public_routes
        .merge(auth_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(axum::middleware::from_fn(move |req, next| {
            middleware::rate_limit::rate_limit_middleware(
                req,
                next,
                global_limiter.clone(),
                limits_enabled,
            )
        }));

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
