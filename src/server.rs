//! # Server Configuration
//!
//! This module contains the router, middleware stack and serve loop for the
//! Review Collector API.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::catalog::CatalogService;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{TRACE_ID_HEADER, trace_id_middleware};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub catalog: CatalogService,
}

impl AppState {
    /// Build state around an already-migrated database handle
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let catalog = CatalogService::new(db.clone(), config.aggregate_strategy);
        Self {
            config: Arc::new(config),
            db,
            catalog,
        }
    }
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, TRACE_ID_HEADER.clone()])
        .expose_headers([TRACE_ID_HEADER.clone(), axum::http::header::LOCATION])
        .max_age(Duration::from_secs(60 * 60));

    if !config.cors_allowed_origins.is_empty() {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();
        Some(base.allow_origin(origins))
    } else if config.is_development() {
        Some(base.allow_origin(Any))
    } else {
        None
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/api/v1/platforms", get(handlers::list_platforms))
        .route(
            "/api/v1/products",
            axum::routing::post(handlers::products::create_product),
        )
        .route("/api/v1/products/{id}", get(handlers::products::get_product))
        .route(
            "/api/v1/products/{id}/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route("/api/v1/dashboard", get(handlers::dashboard::get_dashboard))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()));

    let app = api
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id_middleware));

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();
    let strategy = config.aggregate_strategy;

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, %profile, aggregate_strategy = %strategy, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::list_platforms,
        crate::handlers::products::create_product,
        crate::handlers::products::get_product,
        crate::handlers::reviews::list_reviews,
        crate::handlers::reviews::create_review,
        crate::handlers::dashboard::get_dashboard,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::Platform,
            crate::error::ApiError,
            crate::ratings::HistogramBar,
            crate::ratings::DashboardStats,
            crate::handlers::types::HealthResponse,
            crate::handlers::types::PlatformOption,
            crate::handlers::types::CreateProductRequest,
            crate::handlers::types::ProductView,
            crate::handlers::types::ProductDetailResponse,
            crate::handlers::types::CreateReviewRequest,
            crate::handlers::types::ReviewView,
            crate::handlers::types::DashboardResponse,
        )
    ),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "platforms", description = "Marketplace filter values"),
        (name = "products", description = "Product entry and detail"),
        (name = "reviews", description = "Product reviews"),
        (name = "dashboard", description = "Catalog overview")
    ),
    info(
        title = "Review Collector API",
        description = "Product catalog with customer reviews and rating aggregates",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
