//! # Products API Handlers
//!
//! Product entry and the product detail screen.

use crate::error::ApiError;
use crate::handlers::types::{CreateProductRequest, ProductDetailResponse, ProductView};
use crate::server::AppState;
use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

/// Add a product to the catalog
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductView, headers(
            ("Location", description = "URL of the product detail resource"),
            ("X-Trace-Id", description = "Trace identifier for request correlation")
        )),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, [(&'static str, String); 1], Json<ProductView>), ApiError> {
    let Json(request) = payload?;
    let new_product = request.validate()?;

    let product = state.catalog.create_product(new_product).await?;
    let location = format!("/api/v1/products/{}", product.id);

    Ok((
        StatusCode::CREATED,
        [("location", location)],
        Json(product.into()),
    ))
}

/// Product detail with reviews and rating distribution
///
/// Depending on the configured aggregate strategy, loading the detail also
/// recomputes and stores the product's average rating and review count.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product detail", body = ProductDetailResponse),
        (status = 400, description = "Malformed product ID", body = ApiError),
        (status = 404, description = "Product not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ProductDetailResponse>, ApiError> {
    let Path(product_id) = id?;
    let detail = state.catalog.product_detail(product_id).await?;
    Ok(Json(detail.into()))
}
