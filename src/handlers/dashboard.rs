//! # Dashboard API Handler

use crate::error::ApiError;
use crate::handlers::types::{DashboardQuery, DashboardResponse};
use crate::server::AppState;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Json,
};

/// Products, summary stats and filter options for the dashboard
///
/// `stats` covers the filtered products; `catalog_stats` always covers the whole catalog.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard contents", body = DashboardResponse),
        (status = 400, description = "Unknown platform filter", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter()?;

    let dashboard = state.catalog.dashboard(filter).await?;
    Ok(Json(dashboard.into()))
}
