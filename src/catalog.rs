//! Catalog Service
//!
//! Orchestrates the product and review repositories behind the three screens:
//! product entry, product detail (with aggregate recompute and histogram) and the
//! dashboard. Also hosts the bulk recompute used by the maintenance CLI.

use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::AggregateStrategy;
use crate::error::RepositoryError;
use crate::models::{PlatformFilter, product, review};
use crate::ratings::{self, DashboardStats, RatingAggregate, RatingHistogram};
use crate::repositories::{NewProduct, NewReview, ProductRepository, ReviewRepository};

/// Everything the product detail screen shows
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub product: product::Model,
    /// Newest first
    pub reviews: Vec<review::Model>,
    pub histogram: RatingHistogram,
}

/// Dashboard listing plus both stat views
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub filter: PlatformFilter,
    /// Products passing the filter, newest first
    pub products: Vec<product::Model>,
    /// Stats over the filtered products
    pub stats: DashboardStats,
    /// Stats over the whole catalog regardless of filter
    pub catalog_stats: DashboardStats,
}

/// Result of recomputing one product's aggregate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecomputeOutcome {
    pub product_id: Uuid,
    pub previous: RatingAggregate,
    pub current: RatingAggregate,
    /// Whether the stored columns differed from the recomputed values
    pub drifted: bool,
    /// Whether the new values were written
    pub persisted: bool,
}

/// Catalog operations over an injected database handle
#[derive(Clone)]
pub struct CatalogService {
    db: DatabaseConnection,
    strategy: AggregateStrategy,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection, strategy: AggregateStrategy) -> Self {
        Self { db, strategy }
    }

    pub fn strategy(&self) -> AggregateStrategy {
        self.strategy
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create a product with an empty aggregate
    #[instrument(skip(self, new_product), fields(platform = %new_product.platform))]
    pub async fn create_product(
        &self,
        new_product: NewProduct,
    ) -> Result<product::Model, RepositoryError> {
        let platform = new_product.platform;
        let product = ProductRepository::new(&self.db).create(new_product).await?;

        counter!("products_created_total", "platform" => platform.as_str()).increment(1);
        info!(product_id = %product.id, "Product created");

        Ok(product)
    }

    /// Load a product with its reviews and histogram.
    ///
    /// When the strategy recomputes on read, the aggregate is recomputed from the
    /// loaded reviews and written back with a fresh `updated_at` on every load,
    /// changed or not. A failed write is logged and the product is returned as
    /// loaded.
    #[instrument(skip(self))]
    pub async fn product_detail(&self, product_id: Uuid) -> Result<ProductDetail, RepositoryError> {
        let mut product = ProductRepository::new(&self.db).get(product_id).await?;
        let reviews = ReviewRepository::new(&self.db)
            .list_for_product(product_id)
            .await?;

        let ratings: Vec<i32> = reviews.iter().map(|review| review.rating).collect();
        let histogram = RatingHistogram::from_ratings(ratings.iter().copied());

        if self.strategy.recomputes_on_read() {
            let aggregate = RatingAggregate::from_ratings(ratings);
            product = match ProductRepository::new(&self.db)
                .update_aggregate(product.clone(), aggregate)
                .await
            {
                Ok(updated) => {
                    counter!("rating_recomputes_total", "trigger" => "read").increment(1);
                    updated
                }
                Err(error) => {
                    warn!(%product_id, %error, "Failed to persist recomputed rating aggregate");
                    product
                }
            };
        }

        Ok(ProductDetail {
            product,
            reviews,
            histogram,
        })
    }

    /// Reviews of an existing product, newest first
    pub async fn list_reviews(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<review::Model>, RepositoryError> {
        ProductRepository::new(&self.db).get(product_id).await?;
        ReviewRepository::new(&self.db)
            .list_for_product(product_id)
            .await
    }

    /// Attach a review to a product.
    ///
    /// With an on-write strategy the insert and the aggregate update share one
    /// transaction.
    #[instrument(skip(self, new_review), fields(rating = new_review.rating.value()))]
    pub async fn add_review(
        &self,
        product_id: Uuid,
        new_review: NewReview,
    ) -> Result<review::Model, RepositoryError> {
        let txn = self.db.begin().await?;

        let product = ProductRepository::new(&txn).get(product_id).await?;
        let review = ReviewRepository::new(&txn)
            .create(product_id, new_review)
            .await?;

        if self.strategy.recomputes_on_write() {
            recompute_with(&txn, product, false).await?;
            counter!("rating_recomputes_total", "trigger" => "write").increment(1);
        }

        txn.commit().await?;

        counter!("reviews_created_total").increment(1);
        info!(%product_id, review_id = %review.id, "Review added");

        Ok(review)
    }

    /// Dashboard listing for a platform filter
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn dashboard(&self, filter: PlatformFilter) -> Result<Dashboard, RepositoryError> {
        let all_products = ProductRepository::new(&self.db).list_all().await?;
        let products = ratings::filter_by_platform(&all_products, filter);

        let catalog_stats = DashboardStats::from_products(&all_products);
        let stats = DashboardStats::from_products(&products);
        debug!(
            visible = products.len(),
            total = all_products.len(),
            "Dashboard assembled"
        );

        Ok(Dashboard {
            filter,
            products,
            stats,
            catalog_stats,
        })
    }

    /// Recompute one product's aggregate; `dry_run` reports without writing
    pub async fn recompute_product(
        &self,
        product_id: Uuid,
        dry_run: bool,
    ) -> Result<RecomputeOutcome, RepositoryError> {
        let product = ProductRepository::new(&self.db).get(product_id).await?;
        let outcome = recompute_with(&self.db, product, dry_run).await?;
        if outcome.persisted {
            counter!("rating_recomputes_total", "trigger" => "maintenance").increment(1);
        }
        Ok(outcome)
    }

    /// Recompute every product, oldest first
    pub async fn recompute_all(
        &self,
        dry_run: bool,
    ) -> Result<Vec<RecomputeOutcome>, RepositoryError> {
        let ids = ProductRepository::new(&self.db).list_ids().await?;
        let mut outcomes = Vec::with_capacity(ids.len());
        for product_id in ids {
            outcomes.push(self.recompute_product(product_id, dry_run).await?);
        }
        Ok(outcomes)
    }
}

/// Recompute from the stored reviews on `db`, writing only when the values drifted.
async fn recompute_with<C: ConnectionTrait>(
    db: &C,
    product: product::Model,
    dry_run: bool,
) -> Result<RecomputeOutcome, RepositoryError> {
    let ratings = ReviewRepository::new(db)
        .ratings_for_product(product.id)
        .await?;
    let current = RatingAggregate::from_ratings(ratings);
    let previous = RatingAggregate {
        average_rating: product.average_rating,
        total_reviews: product.total_reviews,
    };
    let drifted = !current.matches(&product);
    let product_id = product.id;

    let persisted = drifted && !dry_run;
    if persisted {
        ProductRepository::new(db)
            .update_aggregate(product, current)
            .await?;
    }

    Ok(RecomputeOutcome {
        product_id,
        previous,
        current,
        drifted,
        persisted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::{init_pool, run_migrations};
    use crate::models::Platform;
    use crate::ratings::Rating;

    async fn service(strategy: AggregateStrategy) -> CatalogService {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            ..Default::default()
        };
        let db = init_pool(&config).await.expect("sqlite pool");
        run_migrations(&db).await.expect("migrations");
        CatalogService::new(db, strategy)
    }

    fn new_product(platform: Platform) -> NewProduct {
        NewProduct {
            name: "Rice Cooker".to_string(),
            url: format!("https://{}.co.id/rice-cooker", platform),
            platform,
            image_url: None,
            price: None,
        }
    }

    fn new_review(rating: i32) -> NewReview {
        NewReview {
            reviewer_name: "Dewi".to_string(),
            rating: Rating::try_from(rating).unwrap(),
            comment: "Works as described".to_string(),
        }
    }

    #[tokio::test]
    async fn test_on_write_updates_aggregate_with_insert() {
        let catalog = service(AggregateStrategy::OnWrite).await;
        let product = catalog.create_product(new_product(Platform::Shopee)).await.unwrap();

        for rating in [5, 5, 4] {
            catalog.add_review(product.id, new_review(rating)).await.unwrap();
        }

        let stored = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();
        assert_eq!(stored.total_reviews, 3);
        assert!((stored.average_rating - 14.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_on_read_heals_stale_aggregate() {
        let catalog = service(AggregateStrategy::OnRead).await;
        let product = catalog.create_product(new_product(Platform::Lazada)).await.unwrap();

        catalog.add_review(product.id, new_review(2)).await.unwrap();
        let stale = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();
        assert_eq!(stale.total_reviews, 0);

        let detail = catalog.product_detail(product.id).await.unwrap();
        assert_eq!(detail.product.total_reviews, 1);
        assert_eq!(detail.product.average_rating, 2.0);
        assert_eq!(detail.histogram.buckets(), [0, 1, 0, 0, 0]);

        let stored = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();
        assert_eq!(stored.total_reviews, 1);
    }

    #[tokio::test]
    async fn test_every_detail_load_refreshes_updated_at() {
        let catalog = service(AggregateStrategy::OnRead).await;
        let product = catalog.create_product(new_product(Platform::Shopee)).await.unwrap();
        catalog.add_review(product.id, new_review(5)).await.unwrap();
        catalog.add_review(product.id, new_review(4)).await.unwrap();

        let first = catalog.product_detail(product.id).await.unwrap().product;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let second = catalog.product_detail(product.id).await.unwrap().product;

        assert_eq!(first.total_reviews, 2);
        assert_eq!(second.average_rating, first.average_rating);
        assert!(second.updated_at > first.updated_at);

        let stored = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();
        assert_eq!(stored.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn test_on_write_only_leaves_updated_at_alone_on_read() {
        let catalog = service(AggregateStrategy::OnWrite).await;
        let product = catalog.create_product(new_product(Platform::Lazada)).await.unwrap();
        catalog.add_review(product.id, new_review(3)).await.unwrap();
        let before = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let detail = catalog.product_detail(product.id).await.unwrap();

        assert_eq!(detail.product.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_detail_without_reviews_is_zero() {
        let catalog = service(AggregateStrategy::Both).await;
        let product = catalog.create_product(new_product(Platform::Tokopedia)).await.unwrap();

        let detail = catalog.product_detail(product.id).await.unwrap();
        assert!(detail.reviews.is_empty());
        assert_eq!(detail.product.average_rating, 0.0);
        assert_eq!(detail.product.total_reviews, 0);
        assert_eq!(detail.histogram.max_count(), 0);
    }

    #[tokio::test]
    async fn test_review_for_missing_product_is_not_found() {
        let catalog = service(AggregateStrategy::Both).await;

        let result = catalog.add_review(Uuid::new_v4(), new_review(5)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));

        let result = catalog.list_reviews(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dashboard_catalog_stats_ignore_filter() {
        let catalog = service(AggregateStrategy::Both).await;
        let shopee = catalog.create_product(new_product(Platform::Shopee)).await.unwrap();
        let lazada = catalog.create_product(new_product(Platform::Lazada)).await.unwrap();
        catalog.add_review(shopee.id, new_review(4)).await.unwrap();
        catalog.add_review(lazada.id, new_review(2)).await.unwrap();
        catalog.add_review(lazada.id, new_review(2)).await.unwrap();

        let dashboard = catalog
            .dashboard(PlatformFilter::Only(Platform::Shopee))
            .await
            .unwrap();

        assert_eq!(dashboard.products.len(), 1);
        assert_eq!(dashboard.products[0].id, shopee.id);
        assert_eq!(dashboard.stats.total_products, 1);
        assert_eq!(dashboard.stats.total_reviews, 1);
        assert_eq!(dashboard.catalog_stats.total_products, 2);
        assert_eq!(dashboard.catalog_stats.total_reviews, 3);
        assert!((dashboard.catalog_stats.average_rating - 3.0).abs() < 1e-9);

        let all = catalog.dashboard(PlatformFilter::All).await.unwrap();
        assert_eq!(all.stats, all.catalog_stats);
    }

    #[tokio::test]
    async fn test_recompute_dry_run_reports_drift_without_writing() {
        let catalog = service(AggregateStrategy::OnRead).await;
        let product = catalog.create_product(new_product(Platform::Bukalapak)).await.unwrap();
        catalog.add_review(product.id, new_review(3)).await.unwrap();

        let outcome = catalog.recompute_product(product.id, true).await.unwrap();
        assert!(outcome.drifted);
        assert!(!outcome.persisted);
        assert_eq!(outcome.current.total_reviews, 1);
        let stored = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();
        assert_eq!(stored.total_reviews, 0);

        let outcomes = catalog.recompute_all(false).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].persisted);
        let stored = ProductRepository::new(catalog.db()).get(product.id).await.unwrap();
        assert_eq!(stored.total_reviews, 1);
        assert_eq!(stored.average_rating, 3.0);

        let again = catalog.recompute_all(false).await.unwrap();
        assert!(!again[0].drifted);
    }
}
