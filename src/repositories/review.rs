//! # Review Repository

use crate::error::RepositoryError;
use crate::models::review::{
    ActiveModel as ReviewActiveModel, Column, Entity as Review, Model as ReviewModel,
};
use crate::ratings::Rating;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Validated data for a new review row
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub reviewer_name: String,
    pub rating: Rating,
    pub comment: String,
}

/// Repository for Review database operations
pub struct ReviewRepository<'a, C = DatabaseConnection> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ReviewRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Insert a review dated now with no helpful votes
    pub async fn create(
        &self,
        product_id: Uuid,
        new_review: NewReview,
    ) -> Result<ReviewModel, RepositoryError> {
        let now = Utc::now();

        let review = ReviewActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            reviewer_name: Set(new_review.reviewer_name),
            rating: Set(new_review.rating.value()),
            comment: Set(new_review.comment),
            review_date: Set(now.into()),
            helpful_count: Set(0),
            created_at: Set(now.into()),
        };

        review
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Reviews of one product, newest first
    pub async fn list_for_product(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<ReviewModel>, RepositoryError> {
        Review::find()
            .filter(Column::ProductId.eq(product_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Just the rating column of a product's reviews
    pub async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<i32>, RepositoryError> {
        Review::find()
            .select_only()
            .column(Column::Rating)
            .filter(Column::ProductId.eq(product_id))
            .into_tuple::<i32>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
