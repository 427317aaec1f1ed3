//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Review Collector API.

pub mod dashboard;
pub mod products;
pub mod reviews;
pub mod types;

use crate::error::{ApiError, service_unavailable};
use crate::models::{PlatformFilter, ServiceInfo};
use crate::server::AppState;
use axum::{extract::State, response::Json};
use types::{HealthResponse, PlatformOption};

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Database liveness check
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthResponse),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn healthz(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    crate::db::health_check(&state.db).await.map_err(|error| {
        tracing::warn!(%error, "Health check failed");
        service_unavailable("Database unavailable")
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// List the dashboard platform filter options
#[utoipa::path(
    get,
    path = "/api/v1/platforms",
    responses(
        (status = 200, description = "Filter values in display order", body = Vec<PlatformOption>)
    ),
    tag = "platforms"
)]
pub async fn list_platforms() -> Json<Vec<PlatformOption>> {
    Json(
        PlatformFilter::options()
            .into_iter()
            .map(PlatformOption::from)
            .collect(),
    )
}
