//! # API Types
//!
//! Request bodies, their validation, and the response views shared by the
//! product, review and dashboard handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::catalog::{Dashboard, ProductDetail};
use crate::error::{ApiError, validation_error};
use crate::models::{Platform, PlatformFilter, product, review};
use crate::ratings::{self, DashboardStats, HistogramBar, MAX_RATING, MIN_RATING, Rating};
use crate::repositories::{NewProduct, NewReview};

const MAX_NAME_LEN: usize = 255;

/// Collects per-field validation messages into a `details` object.
#[derive(Debug, Default)]
struct FieldErrors(Map<String, Value>);

impl FieldErrors {
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), Value::String(message.into()));
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ApiError> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(validation_error("Validation failed", Value::Object(self.0)))
        }
    }
}

/// Trimmed, non-empty text of bounded length.
fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_len: Option<usize>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, "Must not be empty");
    } else if let Some(max_len) = max_len {
        if trimmed.chars().count() > max_len {
            errors.add(field, format!("Must be at most {} characters", max_len));
        }
    }
    trimmed.to_string()
}

/// Empty or whitespace-only strings count as absent.
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
        .unwrap_or(false)
}

/// Request body for adding a product to the catalog
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateProductRequest {
    /// Product name
    #[serde(default)]
    #[schema(example = "iPhone 15 Pro Max 256GB")]
    pub name: String,
    /// Listing URL on the marketplace
    #[serde(default)]
    #[schema(example = "https://shopee.co.id/iphone-15-pro-max")]
    pub url: String,
    /// Marketplace; defaults to shopee
    #[schema(example = "shopee")]
    pub platform: Option<String>,
    /// Product image URL
    pub image_url: Option<String>,
    /// Display price, free text
    #[schema(example = "Rp 21.999.000")]
    pub price: Option<String>,
}

impl CreateProductRequest {
    /// Validate and normalize into repository input
    pub fn validate(self) -> Result<NewProduct, ApiError> {
        let mut errors = FieldErrors::default();

        let name = required_text(&mut errors, "name", &self.name, Some(MAX_NAME_LEN));

        let url = self.url.trim().to_string();
        if url.is_empty() {
            errors.add("url", "Must not be empty");
        } else if !is_http_url(&url) {
            errors.add("url", "Must be an absolute http(s) URL");
        }

        let platform = match optional_text(self.platform.as_deref()) {
            None => Platform::default(),
            Some(raw) => raw.parse::<Platform>().unwrap_or_else(|err| {
                errors.add("platform", err.to_string());
                Platform::default()
            }),
        };

        let image_url = optional_text(self.image_url.as_deref());
        if image_url.as_deref().is_some_and(|image_url| !is_http_url(image_url)) {
            errors.add("image_url", "Must be an absolute http(s) URL");
        }

        let price = optional_text(self.price.as_deref());

        errors.into_result(|| NewProduct {
            name,
            url,
            platform,
            image_url,
            price,
        })
    }
}

/// Request body for adding a review to a product
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateReviewRequest {
    /// Reviewer display name
    #[serde(default)]
    #[schema(example = "Budi Santoso")]
    pub reviewer_name: String,
    /// Star rating 1..5; defaults to 5
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: Option<i32>,
    /// Review text
    #[serde(default)]
    #[schema(example = "Original product, fast shipping")]
    pub comment: String,
}

impl CreateReviewRequest {
    /// Validate and normalize into repository input
    pub fn validate(self) -> Result<NewReview, ApiError> {
        let mut errors = FieldErrors::default();

        let reviewer_name = required_text(
            &mut errors,
            "reviewer_name",
            &self.reviewer_name,
            Some(MAX_NAME_LEN),
        );
        let comment = required_text(&mut errors, "comment", &self.comment, None);

        let rating = match self.rating {
            None => Rating::default(),
            Some(value) => Rating::try_from(value).unwrap_or_else(|_| {
                errors.add(
                    "rating",
                    format!("Must be between {} and {}", MIN_RATING, MAX_RATING),
                );
                Rating::default()
            }),
        };

        errors.into_result(|| NewReview {
            reviewer_name,
            rating,
            comment,
        })
    }
}

/// Product as shown on the dashboard and detail screens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub platform: String,
    pub image_url: Option<String>,
    pub price: Option<String>,
    /// Mean rating, 0 when there are no reviews
    pub average_rating: f64,
    pub total_reviews: i32,
    /// Average with one decimal place
    #[schema(example = "4.7")]
    pub rating_display: String,
    /// Average rounded to whole stars
    #[schema(example = 5, minimum = 0, maximum = 5)]
    pub stars: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductView {
    fn from(model: product::Model) -> Self {
        Self {
            rating_display: ratings::format_rating(model.average_rating),
            stars: ratings::stars(model.average_rating),
            id: model.id,
            name: model.name,
            url: model.url,
            platform: model.platform,
            image_url: model.image_url,
            price: model.price,
            average_rating: model.average_rating,
            total_reviews: model.total_reviews,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// A single review
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub reviewer_name: String,
    #[schema(minimum = 1, maximum = 5)]
    pub rating: i32,
    pub comment: String,
    pub review_date: DateTime<Utc>,
    pub helpful_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<review::Model> for ReviewView {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            reviewer_name: model.reviewer_name,
            rating: model.rating,
            comment: model.comment,
            review_date: model.review_date.with_timezone(&Utc),
            helpful_count: model.helpful_count,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Product detail screen: product, reviews and rating distribution
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetailResponse {
    pub product: ProductView,
    /// Newest first
    pub reviews: Vec<ReviewView>,
    /// Bars for ratings 5 down to 1
    pub histogram: Vec<HistogramBar>,
}

impl From<ProductDetail> for ProductDetailResponse {
    fn from(detail: ProductDetail) -> Self {
        Self {
            histogram: detail.histogram.bars(),
            product: detail.product.into(),
            reviews: detail.reviews.into_iter().map(ReviewView::from).collect(),
        }
    }
}

/// One entry of the dashboard platform filter
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlatformOption {
    /// Filter value to pass as `?platform=`
    #[schema(example = "shopee")]
    pub value: String,
    #[schema(example = "Shopee")]
    pub label: String,
}

impl From<PlatformFilter> for PlatformOption {
    fn from(filter: PlatformFilter) -> Self {
        let label = match filter {
            PlatformFilter::All => "All Platforms",
            PlatformFilter::Only(platform) => platform.display_name(),
        };
        Self {
            value: filter.as_str().to_string(),
            label: label.to_string(),
        }
    }
}

/// Query parameters for the dashboard
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// `all` (default) or one of shopee, tokopedia, bukalapak, lazada
    pub platform: Option<String>,
}

impl DashboardQuery {
    pub fn filter(&self) -> Result<PlatformFilter, ApiError> {
        match optional_text(self.platform.as_deref()) {
            None => Ok(PlatformFilter::All),
            Some(raw) => raw.parse::<PlatformFilter>().map_err(|err| {
                validation_error(
                    "Invalid platform filter",
                    serde_json::json!({ "platform": err.to_string() }),
                )
            }),
        }
    }
}

/// Dashboard screen
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    /// Filter that was applied
    #[schema(example = "all")]
    pub platform: String,
    /// Products passing the filter, newest first
    pub products: Vec<ProductView>,
    /// Stats over the filtered products
    pub stats: DashboardStats,
    /// Stats over the whole catalog
    pub catalog_stats: DashboardStats,
    /// Available filter values
    pub platforms: Vec<PlatformOption>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            platform: dashboard.filter.as_str().to_string(),
            products: dashboard.products.into_iter().map(ProductView::from).collect(),
            stats: dashboard.stats,
            catalog_stats: dashboard.catalog_stats,
            platforms: PlatformFilter::options()
                .into_iter()
                .map(PlatformOption::from)
                .collect(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}
