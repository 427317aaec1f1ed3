//! # Rating Aggregates
//!
//! Pure transforms over already-loaded rows: the per-product rating aggregate,
//! the five-bucket rating histogram, and the dashboard filter and summary stats.
//! Nothing here touches the database.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PlatformFilter, product};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A star rating guaranteed to lie in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(i32);

impl Rating {
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Five stars, the initial selection of the review form.
impl Default for Rating {
    fn default() -> Self {
        Rating(MAX_RATING)
    }
}

impl TryFrom<i32> for Rating {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, value
            ))
        }
    }
}

/// Mean rating and review count for one product.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct RatingAggregate {
    /// Arithmetic mean of all ratings, 0 when there are none
    pub average_rating: f64,
    /// Number of reviews the mean was computed from
    pub total_reviews: i32,
}

impl RatingAggregate {
    /// Computes the aggregate over every rating of a product.
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0i64, 0i64), |(sum, count), rating| {
                (sum + i64::from(rating), count + 1)
            });

        let average_rating = if count > 0 {
            sum as f64 / count as f64
        } else {
            0.0
        };

        Self {
            average_rating,
            total_reviews: i32::try_from(count).unwrap_or(i32::MAX),
        }
    }

    /// Whether the stored product columns already hold this aggregate.
    pub fn matches(&self, product: &product::Model) -> bool {
        product.total_reviews == self.total_reviews
            && (product.average_rating - self.average_rating).abs() < 1e-9
    }
}

/// Average rating rounded to whole stars, as shown next to a product.
pub fn stars(average_rating: f64) -> u8 {
    average_rating.round().clamp(0.0, MAX_RATING as f64) as u8
}

/// Average rating with one decimal place ("4.7").
pub fn format_rating(average_rating: f64) -> String {
    format!("{:.1}", average_rating)
}

/// Count of reviews per star value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingHistogram {
    buckets: [u32; 5],
}

/// One bar of the rating distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistogramBar {
    /// Star value this bar counts
    #[schema(example = 5)]
    pub rating: i32,
    /// Number of reviews with this rating
    #[schema(example = 2)]
    pub count: u32,
    /// Bar width relative to the fullest bucket, 0 to 100
    #[schema(example = 100.0)]
    pub width_percent: f64,
}

impl RatingHistogram {
    /// Buckets ratings 1..=5; values outside that range are not counted.
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let mut buckets = [0u32; 5];
        for rating in ratings {
            if let Ok(rating) = Rating::try_from(rating) {
                buckets[(rating.value() - MIN_RATING) as usize] += 1;
            }
        }
        Self { buckets }
    }

    /// `buckets()[k]` is the number of reviews rated `k + 1`.
    pub fn buckets(&self) -> [u32; 5] {
        self.buckets
    }

    pub fn count(&self, rating: i32) -> u32 {
        Rating::try_from(rating)
            .map(|rating| self.buckets[(rating.value() - MIN_RATING) as usize])
            .unwrap_or(0)
    }

    pub fn max_count(&self) -> u32 {
        self.buckets.iter().copied().max().unwrap_or(0)
    }

    /// Width of a rating's bar as a percentage of the fullest bucket.
    pub fn width_percent(&self, rating: i32) -> f64 {
        let max = self.max_count();
        if max == 0 {
            return 0.0;
        }
        f64::from(self.count(rating)) / f64::from(max) * 100.0
    }

    /// Bars in display order, 5 stars first.
    pub fn bars(&self) -> Vec<HistogramBar> {
        (MIN_RATING..=MAX_RATING)
            .rev()
            .map(|rating| HistogramBar {
                rating,
                count: self.count(rating),
                width_percent: self.width_percent(rating),
            })
            .collect()
    }
}

/// Summary numbers shown above the dashboard product grid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    /// Number of products
    #[schema(example = 12)]
    pub total_products: u64,
    /// Mean of the products' stored average ratings, 0 when there are no products
    #[schema(example = 4.2)]
    pub average_rating: f64,
    /// Sum of the products' stored review counts
    #[schema(example = 87)]
    pub total_reviews: i64,
}

impl DashboardStats {
    /// Stats over the stored (possibly stale) aggregates of the given products.
    pub fn from_products<'a, I>(products: I) -> Self
    where
        I: IntoIterator<Item = &'a product::Model>,
    {
        let (count, rating_sum, review_sum) = products.into_iter().fold(
            (0u64, 0.0f64, 0i64),
            |(count, rating_sum, review_sum), product| {
                (
                    count + 1,
                    rating_sum + product.average_rating,
                    review_sum + i64::from(product.total_reviews),
                )
            },
        );

        let average_rating = if count > 0 {
            rating_sum / count as f64
        } else {
            0.0
        };

        Self {
            total_products: count,
            average_rating,
            total_reviews: review_sum,
        }
    }
}

/// Products passing the filter, order preserved.
pub fn filter_by_platform(
    products: &[product::Model],
    filter: PlatformFilter,
) -> Vec<product::Model> {
    products
        .iter()
        .filter(|product| filter.matches(&product.platform))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use chrono::Utc;
    use uuid::Uuid;

    fn product(platform: Platform, average_rating: f64, total_reviews: i32) -> product::Model {
        let now = Utc::now().into();
        product::Model {
            id: Uuid::new_v4(),
            name: format!("{} listing", platform.display_name()),
            url: format!("https://{}.co.id/item", platform),
            platform: platform.to_string(),
            image_url: None,
            price: None,
            average_rating,
            total_reviews,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_aggregate_of_five_five_four() {
        let aggregate = RatingAggregate::from_ratings([5, 5, 4]);

        assert!((aggregate.average_rating - 14.0 / 3.0).abs() < 1e-12);
        assert_eq!(aggregate.total_reviews, 3);
        assert_eq!(format_rating(aggregate.average_rating), "4.7");
        assert_eq!(stars(aggregate.average_rating), 5);
    }

    #[test]
    fn test_aggregate_of_no_reviews_is_zero() {
        let aggregate = RatingAggregate::from_ratings(Vec::<i32>::new());

        assert_eq!(aggregate.average_rating, 0.0);
        assert!(!aggregate.average_rating.is_nan());
        assert_eq!(aggregate.total_reviews, 0);
        assert_eq!(stars(aggregate.average_rating), 0);
    }

    #[test]
    fn test_aggregate_matches_mean_for_assorted_sets() {
        let sets: [&[i32]; 4] = [&[1], &[1, 2, 3, 4, 5], &[2, 2, 3], &[5; 40]];
        for ratings in sets {
            let aggregate = RatingAggregate::from_ratings(ratings.iter().copied());
            let expected = ratings.iter().sum::<i32>() as f64 / ratings.len() as f64;
            assert!((aggregate.average_rating - expected).abs() < 1e-12);
            assert_eq!(aggregate.total_reviews as usize, ratings.len());
        }
    }

    #[test]
    fn test_aggregate_matches_stored_columns() {
        let stored = product(Platform::Shopee, 4.5, 2);
        assert!(RatingAggregate::from_ratings([4, 5]).matches(&stored));
        assert!(!RatingAggregate::from_ratings([4, 5, 1]).matches(&stored));
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(6).is_err());
        assert_eq!(Rating::try_from(3).unwrap().value(), 3);
    }

    #[test]
    fn test_histogram_buckets_count_each_rating() {
        let histogram = RatingHistogram::from_ratings([5, 5, 4, 1, 5, 3]);

        assert_eq!(histogram.buckets(), [1, 0, 1, 1, 3]);
        assert_eq!(histogram.max_count(), 3);
    }

    #[test]
    fn test_histogram_widths_are_relative_to_fullest_bucket() {
        let histogram = RatingHistogram::from_ratings([5, 5, 4, 5]);

        assert_eq!(histogram.width_percent(5), 100.0);
        assert!((histogram.width_percent(4) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(histogram.width_percent(2), 0.0);

        let bars = histogram.bars();
        let order: Vec<i32> = bars.iter().map(|bar| bar.rating).collect();
        assert_eq!(order, vec![5, 4, 3, 2, 1]);
        assert_eq!(bars[0].count, 3);
        assert_eq!(bars[0].width_percent, 100.0);
    }

    #[test]
    fn test_empty_histogram_has_zero_widths() {
        let histogram = RatingHistogram::from_ratings(Vec::<i32>::new());

        assert_eq!(histogram.max_count(), 0);
        assert!(histogram.bars().iter().all(|bar| bar.width_percent == 0.0));
    }

    #[test]
    fn test_histogram_ignores_out_of_range_values() {
        let histogram = RatingHistogram::from_ratings([0, 6, 3]);
        assert_eq!(histogram.buckets(), [0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_filter_all_returns_everything_in_order() {
        let products = vec![
            product(Platform::Shopee, 4.0, 1),
            product(Platform::Lazada, 3.0, 2),
            product(Platform::Shopee, 5.0, 1),
        ];

        let filtered = filter_by_platform(&products, PlatformFilter::All);
        assert_eq!(filtered, products);
    }

    #[test]
    fn test_filter_single_platform_returns_exact_subset() {
        let products = vec![
            product(Platform::Shopee, 4.0, 1),
            product(Platform::Lazada, 3.0, 2),
            product(Platform::Shopee, 5.0, 1),
            product(Platform::Tokopedia, 2.0, 4),
        ];

        let filtered = filter_by_platform(&products, PlatformFilter::Only(Platform::Shopee));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|p| p.platform == "shopee"));
        assert_eq!(filtered[0].id, products[0].id);
        assert_eq!(filtered[1].id, products[2].id);

        let none = filter_by_platform(&products, PlatformFilter::Only(Platform::Bukalapak));
        assert!(none.is_empty());
    }

    #[test]
    fn test_dashboard_stats() {
        let products = vec![
            product(Platform::Shopee, 4.0, 3),
            product(Platform::Lazada, 3.0, 2),
            product(Platform::Tokopedia, 0.0, 0),
        ];

        let stats = DashboardStats::from_products(&products);
        assert_eq!(stats.total_products, 3);
        assert!((stats.average_rating - 7.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.total_reviews, 5);

        let empty = DashboardStats::from_products(&[]);
        assert_eq!(empty, DashboardStats::default());
    }
}
