//! # Reviews API Handlers

use crate::error::ApiError;
use crate::handlers::types::{CreateReviewRequest, ReviewView};
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

/// List a product's reviews, newest first
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Reviews of the product", body = Vec<ReviewView>),
        (status = 400, description = "Malformed product ID", body = ApiError),
        (status = 404, description = "Product not found", body = ApiError)
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<ReviewView>>, ApiError> {
    let Path(product_id) = id?;
    let reviews = state.catalog.list_reviews(product_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewView::from).collect()))
}

/// Add a review to a product
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/reviews",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewView),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Product not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewView>), ApiError> {
    let Path(product_id) = id?;
    let Json(request) = payload?;
    let new_review = request.validate()?;

    let review = state.catalog.add_review(product_id, new_review).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}
