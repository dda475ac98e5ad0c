//! RawMat Portal
//!
//! The HTTP entry point for both pages of the service.
//! Handles:
//! - Buyer Portal (Public): the lead intake form
//! - Admin Dashboard (Private): credential-gated reporting and export
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use rawmat_common::{auth::SessionManager, config::AppConfig, metrics, store::LeadStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: LeadStore,
    pub sessions: Arc<SessionManager>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    config.validate()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.observability.json_logging {
        fmt.json().init();
    } else {
        fmt.init();
    }

    info!("Starting RawMat Portal v{}", rawmat_common::VERSION);

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let scrape_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(scrape_addr)
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                metrics::LATENCY_BUCKETS,
            )?
            .install()?;
        info!("Prometheus scrape endpoint on {}", scrape_addr);
    }
    metrics::register_metrics();

    let config = Arc::new(config);

    // Create app state
    let state = AppState {
        store: LeadStore::new(&config.store.data_file),
        sessions: Arc::new(SessionManager::new(config.auth.session_ttl_secs)),
        config: config.clone(),
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
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
    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // The public submit route carries the intake rate limiter
    let mut submit_route = Router::new().route("/leads", post(handlers::intake::submit_lead));
    if state.config.rate_limit.enabled {
        let limit = state.config.rate_limit.requests_per_second;
        let limiter = middleware::rate_limit::create_rate_limiter(
            limit,
            state.config.rate_limit.burst,
        );
        submit_route = submit_route.layer(axum::middleware::from_fn(move |request, next| {
            middleware::rate_limit::rate_limit_middleware(request, next, limiter.clone(), limit)
        }));
    }

    Router::new()
        // Buyer Portal (Public)
        .route("/", get(handlers::intake::buyer_portal))
        .merge(submit_route)
        // Admin Dashboard (Private)
        .route("/admin", get(handlers::admin::dashboard))
        .route("/admin/login", post(handlers::admin::login))
        .route("/admin/logout", post(handlers::admin::logout))
        .route("/admin/export.csv", get(handlers::export::download_leads))
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(TraceLayer::new_for_http())
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
